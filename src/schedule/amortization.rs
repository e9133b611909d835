use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, instrument, warn};

use crate::config::CalculatorConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::{AmortizationRow, FinalInstallment, LoanQuoteRequest, LoanQuoteResult};

/// fixed-installment amortizer for loans with a flat monthly rate on the
/// declining balance
#[derive(Debug, Clone, Default)]
pub struct LoanAmortizer {
    config: CalculatorConfig,
}

impl LoanAmortizer {
    pub fn new(config: CalculatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// compute the monthly installment and the full schedule
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            principal = %request.principal(),
            rate = %request.monthly_rate_percent(),
            tenure = request.tenure_months(),
        )
    )]
    pub fn compute_schedule(&self, request: &LoanQuoteRequest) -> Result<LoanQuoteResult> {
        match self.quote(request) {
            Ok(result) => {
                debug!(
                    monthly_payment = %result.monthly_payment,
                    total_interest = %result.total_interest,
                    "computed amortization schedule"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "rejected loan quote request");
                Err(e)
            }
        }
    }

    fn quote(&self, request: &LoanQuoteRequest) -> Result<LoanQuoteResult> {
        self.validate(request)?;

        let principal = request.principal();
        let rate = request.monthly_rate();
        let months = request.tenure_months();

        let payment = installment_amount(principal, rate, months)?;

        match self.config.final_installment {
            FinalInstallment::Clamp => clamped_schedule(principal, rate, months, payment),
            FinalInstallment::Reconcile => {
                let rounded = Money::from_decimal(payment.as_decimal().round_dp_with_strategy(
                    self.config.installment_rounding_dp,
                    RoundingStrategy::AwayFromZero,
                ));
                reconciled_schedule(principal, rate, months, rounded)
            }
        }
    }

    fn validate(&self, request: &LoanQuoteRequest) -> Result<()> {
        request.validate()?;
        if let Some(max) = self.config.max_tenure_months {
            if request.tenure_months() > max {
                return Err(LoanError::invalid_input(
                    "tenure_months",
                    format!("{} exceeds the maximum of {} months", request.tenure_months(), max),
                ));
            }
        }
        Ok(())
    }
}

/// compute a schedule with the default cooperative configuration
pub fn compute_schedule(request: &LoanQuoteRequest) -> Result<LoanQuoteResult> {
    LoanAmortizer::default().compute_schedule(request)
}

/// constant installment that retires `principal` over `months` at `rate`
pub fn installment_amount(principal: Money, rate: Rate, months: u32) -> Result<Money> {
    if months == 0 {
        return Err(LoanError::invalid_input("tenure_months", "must be at least one month"));
    }

    let r = rate.as_decimal();
    if r.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)
    let compound = compounding_factor(r, months)?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|x| x.checked_mul(compound))
        .and_then(|x| x.checked_div(denominator))
        .map(Money::from_decimal)
        .ok_or_else(out_of_range)
}

/// (1 + r)^n by repeated multiplication
fn compounding_factor(r: Decimal, months: u32) -> Result<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..months {
        compound = compound.checked_mul(base).ok_or_else(out_of_range)?;
    }
    Ok(compound)
}

fn out_of_range() -> LoanError {
    LoanError::invalid_input(
        "monthly_rate_percent",
        "rate and tenure produce a compounding factor outside the supported range",
    )
}

fn totals_out_of_range() -> LoanError {
    LoanError::invalid_input(
        "principal",
        "schedule totals exceed the supported decimal range",
    )
}

// rows are still pushed one by one past this
const PREALLOCATED_ROWS: u32 = 1_200;

fn clamped_schedule(principal: Money, rate: Rate, months: u32, payment: Money) -> Result<LoanQuoteResult> {
    let mut schedule = Vec::with_capacity(months.min(PREALLOCATED_ROWS) as usize);
    let mut balance = principal;
    let mut cumulative_interest = Money::ZERO;
    let mut cumulative_principal = Money::ZERO;

    for month in 1..=months {
        let opening_balance = balance;
        let interest_portion = balance.checked_apply_rate(rate).ok_or_else(totals_out_of_range)?;
        let principal_portion = payment - interest_portion;

        cumulative_interest = cumulative_interest
            .checked_add(interest_portion)
            .ok_or_else(totals_out_of_range)?;
        cumulative_principal = cumulative_principal
            .checked_add(principal_portion)
            .ok_or_else(totals_out_of_range)?;

        balance = (balance - principal_portion).max(Money::ZERO);
        // absorb decimal drift in the last month
        if month == months {
            balance = Money::ZERO;
        }

        schedule.push(AmortizationRow {
            month,
            opening_balance,
            payment_amount: payment,
            principal_portion,
            interest_portion,
            remaining_balance: balance,
            cumulative_interest,
            cumulative_principal,
        });
    }

    let total_payment = payment
        .checked_mul(Decimal::from(months))
        .ok_or_else(totals_out_of_range)?;

    Ok(LoanQuoteResult {
        monthly_payment: payment,
        total_interest: cumulative_interest,
        total_payment,
        schedule,
    })
}

fn reconciled_schedule(principal: Money, rate: Rate, months: u32, payment: Money) -> Result<LoanQuoteResult> {
    let mut schedule = Vec::with_capacity(months.min(PREALLOCATED_ROWS) as usize);
    let mut balance = principal;
    let mut cumulative_interest = Money::ZERO;
    let mut cumulative_principal = Money::ZERO;
    let mut total_payment = Money::ZERO;

    for month in 1..=months {
        let opening_balance = balance;
        let interest_portion = balance.checked_apply_rate(rate).ok_or_else(totals_out_of_range)?;

        // rounding the installment up can retire the balance early
        let scheduled_principal = payment - interest_portion;
        let (principal_portion, payment_amount) = if month == months || scheduled_principal > balance {
            let settlement = balance
                .checked_add(interest_portion)
                .ok_or_else(totals_out_of_range)?;
            (balance, settlement)
        } else {
            (scheduled_principal, payment)
        };

        cumulative_interest = cumulative_interest
            .checked_add(interest_portion)
            .ok_or_else(totals_out_of_range)?;
        cumulative_principal = cumulative_principal
            .checked_add(principal_portion)
            .ok_or_else(totals_out_of_range)?;
        total_payment = total_payment
            .checked_add(payment_amount)
            .ok_or_else(totals_out_of_range)?;
        balance -= principal_portion;

        schedule.push(AmortizationRow {
            month,
            opening_balance,
            payment_amount,
            principal_portion,
            interest_portion,
            remaining_balance: balance,
            cumulative_interest,
            cumulative_principal,
        });
    }

    Ok(LoanQuoteResult {
        monthly_payment: payment,
        total_interest: cumulative_interest,
        total_payment,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn request(principal: i64, rate: Decimal, months: u32) -> LoanQuoteRequest {
        LoanQuoteRequest::new(Money::from_major(principal), rate, months).unwrap()
    }

    fn close(a: Money, b: Money, tolerance: Decimal) -> bool {
        (a - b).abs().as_decimal() <= tolerance
    }

    #[test]
    fn test_cooperative_example_schedule() {
        let result = compute_schedule(&request(12_000_000, dec!(1.0), 12)).unwrap();

        assert_eq!(result.monthly_payment.round_dp(2), Money::from_decimal(dec!(1066185.46)));
        assert_eq!(result.schedule.len(), 12);
        assert_eq!(result.schedule[0].interest_portion, Money::from_major(120_000));
        assert_eq!(result.schedule[0].opening_balance, Money::from_major(12_000_000));
        assert_eq!(result.schedule[11].remaining_balance, Money::ZERO);

        // residual before the final clamp is negligible
        let retired = result.schedule[11].cumulative_principal;
        assert!(close(retired, Money::from_major(12_000_000), dec!(0.000001)));

        assert_eq!(result.total_payment, result.monthly_payment * dec!(12));
        assert_eq!(result.total_interest.round_dp(2), Money::from_decimal(dec!(794225.57)));
    }

    #[test]
    fn test_zero_rate_schedule() {
        let result = compute_schedule(&request(1_200_000, Decimal::ZERO, 12)).unwrap();

        assert_eq!(result.monthly_payment, Money::from_major(100_000));
        assert_eq!(result.total_interest, Money::ZERO);
        assert_eq!(result.total_payment, Money::from_major(1_200_000));
        for row in &result.schedule {
            assert_eq!(row.interest_portion, Money::ZERO);
            assert_eq!(row.principal_portion, result.monthly_payment);
        }
        assert_eq!(result.schedule[5].remaining_balance, Money::from_major(600_000));
        assert_eq!(result.schedule[11].remaining_balance, Money::ZERO);
    }

    #[test]
    fn test_zero_rate_uneven_split() {
        let result = compute_schedule(&request(1_000, Decimal::ZERO, 3)).unwrap();
        assert!(close(result.total_payment, Money::from_major(1_000), dec!(0.000001)));
        assert_eq!(result.schedule[2].remaining_balance, Money::ZERO);
    }

    #[test]
    fn test_single_month_loan() {
        let result = compute_schedule(&request(1_000_000, dec!(2), 1)).unwrap();
        assert_eq!(result.monthly_payment, Money::from_major(1_020_000));
        assert_eq!(result.schedule[0].principal_portion, Money::from_major(1_000_000));
        assert_eq!(result.schedule[0].interest_portion, Money::from_major(20_000));
    }

    #[test]
    fn test_interest_declines_each_month() {
        let result = compute_schedule(&request(5_000_000, dec!(0.8), 24)).unwrap();
        for pair in result.schedule.windows(2) {
            assert!(pair[1].interest_portion < pair[0].interest_portion);
            assert!(pair[1].principal_portion > pair[0].principal_portion);
        }
    }

    #[test]
    fn test_rejects_invalid_requests() {
        let amortizer = LoanAmortizer::default();

        let bad: Vec<LoanQuoteRequest> = vec![
            serde_json::from_str(r#"{"principal":"0","monthly_rate_percent":"1","tenure_months":12}"#).unwrap(),
            serde_json::from_str(r#"{"principal":"1000","monthly_rate_percent":"1","tenure_months":0}"#).unwrap(),
            serde_json::from_str(r#"{"principal":"1000","monthly_rate_percent":"-1","tenure_months":12}"#).unwrap(),
        ];
        for req in &bad {
            let err = amortizer.compute_schedule(req).unwrap_err();
            assert!(err.is_invalid_input());
        }
    }

    #[test]
    fn test_long_tenure_accepted_by_default() {
        let result = compute_schedule(&request(1_000_000, dec!(0.5), 601)).unwrap();
        assert_eq!(result.schedule.len(), 601);
        assert_eq!(result.schedule[600].remaining_balance, Money::ZERO);
    }

    #[test]
    fn test_tenure_above_configured_maximum() {
        let config = CalculatorConfig {
            max_tenure_months: Some(600),
            ..CalculatorConfig::cooperative()
        };
        let amortizer = LoanAmortizer::new(config).unwrap();

        assert!(amortizer.compute_schedule(&request(1_000, dec!(1), 600)).is_ok());
        let err = amortizer.compute_schedule(&request(1_000, dec!(1), 601)).unwrap_err();
        assert!(matches!(err, LoanError::InvalidInput { field: "tenure_months", .. }));
    }

    #[test]
    fn test_totals_overflow_is_invalid_input() {
        // the installment fits in a Decimal, twelve of them do not
        let req = LoanQuoteRequest::from_f64(7.9e28, 1.0, 12.0).unwrap();
        let err = compute_schedule(&req).unwrap_err();
        assert!(err.is_invalid_input());

        let amortizer = LoanAmortizer::new(CalculatorConfig::reconciled()).unwrap();
        let err = amortizer.compute_schedule(&req).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_compounding_overflow_is_invalid_input() {
        let err = compute_schedule(&request(1_000, dec!(100), 120)).unwrap_err();
        assert!(matches!(err, LoanError::InvalidInput { field: "monthly_rate_percent", .. }));
    }

    #[test]
    fn test_reconciled_schedule() {
        let amortizer = LoanAmortizer::new(CalculatorConfig::reconciled()).unwrap();
        let result = amortizer.compute_schedule(&request(12_000_000, dec!(1.0), 12)).unwrap();

        assert_eq!(result.monthly_payment, Money::from_major(1_066_186));
        for row in &result.schedule[..11] {
            assert_eq!(row.payment_amount, Money::from_major(1_066_186));
        }

        let last = &result.schedule[11];
        assert!(last.payment_amount < Money::from_major(1_066_186));
        assert_eq!(last.remaining_balance, Money::ZERO);
        assert_eq!(last.principal_portion, last.opening_balance);

        let paid: Money = result.schedule.iter().map(|r| r.payment_amount).sum();
        assert_eq!(result.total_payment, paid);
        assert!(close(
            result.total_payment - result.total_interest,
            Money::from_major(12_000_000),
            dec!(0.000001)
        ));
    }

    #[test]
    fn test_reconciled_small_loan_retires_early() {
        let amortizer = LoanAmortizer::new(CalculatorConfig::reconciled()).unwrap();
        let result = amortizer.compute_schedule(&request(10, dec!(1), 36)).unwrap();

        // installment rounds up to 1, which clears the balance before month 36
        assert_eq!(result.monthly_payment, Money::from_major(1));
        assert_eq!(result.schedule.len(), 36);
        let last = &result.schedule[35];
        assert_eq!(last.remaining_balance, Money::ZERO);
        assert_eq!(last.payment_amount, Money::ZERO);
        for pair in result.schedule.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
    }

    #[test]
    fn test_row_lookup() {
        let result = compute_schedule(&request(6_000_000, dec!(0.5), 12)).unwrap();
        assert_eq!(result.row(1).map(|r| r.month), Some(1));
        assert_eq!(result.row(12).map(|r| r.month), Some(12));
        assert!(result.row(0).is_none());
        assert!(result.row(13).is_none());
        assert_eq!(result.balance_after(0), Some(Money::from_major(6_000_000)));
        assert_eq!(result.balance_after(12), Some(Money::ZERO));
        assert_eq!(result.principal(), Money::from_major(6_000_000));
        assert_eq!(result.tenure_months(), 12);
    }

    fn valid_request() -> impl Strategy<Value = LoanQuoteRequest> {
        (1_000i64..=1_000_000_000, 0u32..=500, 1u32..=360).prop_map(|(p, bps, n)| {
            LoanQuoteRequest::new(Money::from_major(p), Decimal::new(bps as i64, 2), n).unwrap()
        })
    }

    proptest! {
        #[test]
        fn schedule_has_one_row_per_month(req in valid_request()) {
            let result = compute_schedule(&req).unwrap();
            prop_assert_eq!(result.schedule.len(), req.tenure_months() as usize);
            for (i, row) in result.schedule.iter().enumerate() {
                prop_assert_eq!(row.month, i as u32 + 1);
            }
        }

        #[test]
        fn portions_add_up_to_payment(req in valid_request()) {
            let result = compute_schedule(&req).unwrap();
            let tolerance = result.monthly_payment.as_decimal() * dec!(0.000001);
            for row in &result.schedule {
                let sum = row.principal_portion + row.interest_portion;
                prop_assert!((sum - result.monthly_payment).abs().as_decimal() <= tolerance);
                prop_assert_eq!(row.payment_amount, result.monthly_payment);
            }
        }

        #[test]
        fn balance_never_increases_and_ends_at_zero(req in valid_request()) {
            let result = compute_schedule(&req).unwrap();
            let mut previous = req.principal();
            for row in &result.schedule {
                prop_assert!(row.remaining_balance <= previous);
                prop_assert!(!row.remaining_balance.is_negative());
                previous = row.remaining_balance;
            }
            prop_assert_eq!(previous, Money::ZERO);

            // the unclamped residual is within tolerance of zero
            let retired = result.schedule[result.schedule.len() - 1].cumulative_principal;
            let tolerance = req.principal().as_decimal() * dec!(0.000001);
            prop_assert!((retired - req.principal()).abs().as_decimal() <= tolerance);
        }

        #[test]
        fn totals_match_schedule(req in valid_request()) {
            let result = compute_schedule(&req).unwrap();
            let interest: Money = result.schedule.iter().map(|r| r.interest_portion).sum();
            prop_assert_eq!(result.total_interest, interest);
            prop_assert_eq!(
                result.total_payment,
                result.monthly_payment * Decimal::from(req.tenure_months())
            );
        }
    }
}
