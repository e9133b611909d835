use chrono::{DateTime, Months, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::LoanQuoteResult;

/// installment with its due date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedInstallment {
    pub month: u32,
    pub due_date: DateTime<Utc>,
    pub payment_amount: Money,
    pub remaining_balance: Money,
}

/// monthly due dates anchored on a start date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentCalendar {
    start_date: DateTime<Utc>,
}

impl PaymentCalendar {
    pub fn monthly(start_date: DateTime<Utc>) -> Self {
        Self { start_date }
    }

    /// calendar starting at the provider's current time
    pub fn starting_now(time_provider: &SafeTimeProvider) -> Self {
        Self::monthly(time_provider.now())
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// due date of a 1-based month; days past the end of a shorter month
    /// fall on its last day
    pub fn due_date(&self, month: u32) -> Option<DateTime<Utc>> {
        self.start_date.checked_add_months(Months::new(month))
    }

    /// attach due dates to every row of a schedule
    pub fn dated_schedule(&self, result: &LoanQuoteResult) -> Result<Vec<DatedInstallment>> {
        result
            .schedule
            .iter()
            .map(|row| {
                let due_date = self.due_date(row.month).ok_or_else(|| LoanError::InvalidInput {
                    field: "tenure_months",
                    reason: format!("due date of month {} is out of range", row.month),
                })?;
                Ok(DatedInstallment {
                    month: row.month,
                    due_date,
                    payment_amount: row.payment_amount,
                    remaining_balance: row.remaining_balance,
                })
            })
            .collect()
    }

    /// first installment due on or after `now`
    pub fn next_due(&self, result: &LoanQuoteResult, now: DateTime<Utc>) -> Result<Option<DatedInstallment>> {
        Ok(self
            .dated_schedule(result)?
            .into_iter()
            .find(|installment| installment.due_date >= now))
    }
}
