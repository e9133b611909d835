pub mod application;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod form;
pub mod format;
pub mod products;
pub mod schedule;
pub mod types;

// re-export key types
pub use application::{ApplicationDocument, ApplicationStatus, LoanApplication};
pub use config::{CalculatorConfig, DisplayConfig};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use form::CalculatorForm;
pub use format::{format_amount, QuoteSummary, QuoteView, ScheduleTable};
pub use products::{LoanProduct, ProductCatalog, ProductStatus};
pub use schedule::{compute_schedule, DatedInstallment, LoanAmortizer, PaymentCalendar};
pub use types::{AmortizationRow, FinalInstallment, LoanQuoteRequest, LoanQuoteResult};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_results_are_shareable_across_threads() {
        assert_send_sync::<LoanAmortizer>();
        assert_send_sync::<LoanQuoteRequest>();
        assert_send_sync::<LoanQuoteResult>();

        let amortizer = std::sync::Arc::new(LoanAmortizer::default());
        let handles: Vec<_> = (1..=4u32)
            .map(|i| {
                let amortizer = amortizer.clone();
                std::thread::spawn(move || {
                    let request = LoanQuoteRequest::new(Money::from_major(1_000_000), Decimal::from(i), 12 * i).unwrap();
                    amortizer.compute_schedule(&request).unwrap().schedule.len()
                })
            })
            .collect();

        let lengths: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(lengths, vec![12, 24, 36, 48]);
    }
}
