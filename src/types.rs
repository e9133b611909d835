use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// a single calculator request: principal, monthly rate and tenure
///
/// built through [`LoanQuoteRequest::new`] or [`LoanQuoteRequest::from_f64`],
/// both of which validate. deserialized requests are validated again by the
/// amortizer before any computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuoteRequest {
    principal: Money,
    monthly_rate_percent: Decimal,
    tenure_months: u32,
}

impl LoanQuoteRequest {
    pub fn new(principal: Money, monthly_rate_percent: Decimal, tenure_months: u32) -> Result<Self> {
        let request = Self {
            principal,
            monthly_rate_percent,
            tenure_months,
        };
        request.validate()?;
        Ok(request)
    }

    /// build from raw floats as produced by a number parser
    ///
    /// rejects NaN, infinities and fractional tenures on top of the usual checks
    pub fn from_f64(principal: f64, monthly_rate_percent: f64, tenure_months: f64) -> Result<Self> {
        if !principal.is_finite() {
            return Err(LoanError::invalid_input("principal", "must be a finite number"));
        }
        let principal = Money::from_f64(principal)
            .ok_or_else(|| LoanError::invalid_input("principal", "out of range"))?;

        if !monthly_rate_percent.is_finite() {
            return Err(LoanError::invalid_input("monthly_rate_percent", "must be a finite number"));
        }
        let rate = Decimal::from_f64(monthly_rate_percent)
            .ok_or_else(|| LoanError::invalid_input("monthly_rate_percent", "out of range"))?;

        if !tenure_months.is_finite() || tenure_months.fract() != 0.0 {
            return Err(LoanError::invalid_input("tenure_months", "must be a whole number of months"));
        }
        if tenure_months < 1.0 {
            return Err(LoanError::invalid_input("tenure_months", "must be at least one month"));
        }
        if tenure_months > u32::MAX as f64 {
            return Err(LoanError::invalid_input("tenure_months", "too large"));
        }

        Self::new(principal, rate, tenure_months as u32)
    }

    /// check the request invariants
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LoanError::invalid_input(
                "principal",
                format!("must be greater than zero, got {}", self.principal),
            ));
        }
        if self.tenure_months == 0 {
            return Err(LoanError::invalid_input("tenure_months", "must be at least one month"));
        }
        if self.monthly_rate_percent < Decimal::ZERO {
            return Err(LoanError::invalid_input(
                "monthly_rate_percent",
                format!("must not be negative, got {}", self.monthly_rate_percent),
            ));
        }
        Ok(())
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn monthly_rate_percent(&self) -> Decimal {
        self.monthly_rate_percent
    }

    /// fractional monthly rate (percent / 100)
    pub fn monthly_rate(&self) -> Rate {
        Rate::from_percent(self.monthly_rate_percent)
    }

    pub fn tenure_months(&self) -> u32 {
        self.tenure_months
    }
}

/// one month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based month number
    pub month: u32,
    pub opening_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// balance after this payment, never negative
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// result of a single calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuoteResult {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub schedule: Vec<AmortizationRow>,
}

impl LoanQuoteResult {
    /// row for a 1-based month
    pub fn row(&self, month: u32) -> Option<&AmortizationRow> {
        month
            .checked_sub(1)
            .and_then(|idx| self.schedule.get(idx as usize))
    }

    /// balance remaining after the given month, the full principal for month 0
    pub fn balance_after(&self, month: u32) -> Option<Money> {
        if month == 0 {
            return Some(self.principal());
        }
        self.row(month).map(|r| r.remaining_balance)
    }

    /// principal the schedule was built from
    pub fn principal(&self) -> Money {
        self.schedule
            .first()
            .map(|r| r.opening_balance)
            .unwrap_or(Money::ZERO)
    }

    pub fn tenure_months(&self) -> u32 {
        self.schedule.len() as u32
    }
}

/// how the last installment treats residual balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FinalInstallment {
    /// constant payment in every row, final balance clamped to zero
    #[default]
    Clamp,
    /// installment rounded to currency units, last row absorbs the residual
    Reconcile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_request_validation() {
        assert!(LoanQuoteRequest::new(Money::from_major(1_000), dec!(0.8), 12).is_ok());
        assert!(LoanQuoteRequest::new(Money::from_major(1_000), Decimal::ZERO, 1).is_ok());

        let zero_principal = LoanQuoteRequest::new(Money::ZERO, dec!(0.8), 12).unwrap_err();
        assert!(zero_principal.is_invalid_input());

        let negative = LoanQuoteRequest::new(Money::from_major(-5), dec!(0.8), 12).unwrap_err();
        assert!(negative.is_invalid_input());

        let zero_tenure = LoanQuoteRequest::new(Money::from_major(1_000), dec!(0.8), 0).unwrap_err();
        assert!(zero_tenure.is_invalid_input());

        let negative_rate = LoanQuoteRequest::new(Money::from_major(1_000), dec!(-1), 12).unwrap_err();
        assert!(negative_rate.is_invalid_input());
    }

    #[test]
    fn test_request_from_f64() {
        let request = LoanQuoteRequest::from_f64(5_000_000.0, 0.8, 12.0).unwrap();
        assert_eq!(request.principal(), Money::from_major(5_000_000));
        assert_eq!(request.monthly_rate().as_decimal(), dec!(0.008));
        assert_eq!(request.tenure_months(), 12);

        for (p, r, n) in [
            (f64::NAN, 0.8, 12.0),
            (f64::INFINITY, 0.8, 12.0),
            (0.0, 0.8, 12.0),
            (1000.0, f64::NAN, 12.0),
            (1000.0, f64::INFINITY, 12.0),
            (1000.0, -1.0, 12.0),
            (1000.0, 0.8, 12.5),
            (1000.0, 0.8, 0.0),
            (1000.0, 0.8, -3.0),
            (1000.0, 0.8, f64::NAN),
        ] {
            let err = LoanQuoteRequest::from_f64(p, r, n).unwrap_err();
            assert!(err.is_invalid_input(), "expected invalid input for ({p}, {r}, {n})");
        }
    }

    #[test]
    fn test_from_f64_reasons() {
        let reason = |err: LoanError| match err {
            LoanError::InvalidInput { field, reason } => (field, reason),
            other => panic!("unexpected error {other:?}"),
        };

        let (field, why) = reason(LoanQuoteRequest::from_f64(f64::NAN, 0.8, 12.0).unwrap_err());
        assert_eq!((field, why.as_str()), ("principal", "must be a finite number"));

        let (field, why) = reason(LoanQuoteRequest::from_f64(1e30, 0.8, 12.0).unwrap_err());
        assert_eq!((field, why.as_str()), ("principal", "out of range"));

        let (field, why) = reason(LoanQuoteRequest::from_f64(1000.0, 0.8, 0.0).unwrap_err());
        assert_eq!((field, why.as_str()), ("tenure_months", "must be at least one month"));

        let (field, why) = reason(LoanQuoteRequest::from_f64(1000.0, 0.8, 1e12).unwrap_err());
        assert_eq!((field, why.as_str()), ("tenure_months", "too large"));
    }

    #[test]
    fn test_deserialized_request_is_revalidated() {
        let json = r#"{"principal":"0","monthly_rate_percent":"1","tenure_months":12}"#;
        let request: LoanQuoteRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }
}
