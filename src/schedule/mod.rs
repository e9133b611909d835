pub mod amortization;
pub mod calendar;

pub use amortization::{compute_schedule, installment_amount, LoanAmortizer};
pub use calendar::{DatedInstallment, PaymentCalendar};
