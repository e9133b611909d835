use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::CalculatorConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::LoanQuoteRequest;

/// raw text fields of the loan calculator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculatorForm {
    amount: String,
    tenure: String,
    interest_rate: String,
}

impl CalculatorForm {
    /// empty amount, tenure and rate pre-filled from the config
    pub fn with_defaults(config: &CalculatorConfig) -> Self {
        Self {
            amount: String::new(),
            tenure: config.default_tenure_months.to_string(),
            interest_rate: config.default_monthly_rate_percent.normalize().to_string(),
        }
    }

    /// amount field keeps digits only
    pub fn set_amount(&mut self, text: &str) {
        self.amount = text.chars().filter(|c| c.is_ascii_digit()).collect();
    }

    pub fn set_tenure(&mut self, text: &str) {
        self.tenure = text.to_string();
    }

    pub fn set_interest_rate(&mut self, text: &str) {
        self.interest_rate = text.to_string();
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn tenure(&self) -> &str {
        &self.tenure
    }

    pub fn interest_rate(&self) -> &str {
        &self.interest_rate
    }

    /// false while any field is blank
    pub fn is_submittable(&self) -> bool {
        [&self.amount, &self.tenure, &self.interest_rate]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// parse the fields into a validated request
    pub fn to_request(&self) -> Result<LoanQuoteRequest> {
        let amount = Money::from_str(self.amount.trim()).map_err(|_| LoanError::Parse {
            field: "amount",
            value: self.amount.clone(),
        })?;

        let tenure = self.tenure.trim().parse::<u32>().map_err(|_| LoanError::Parse {
            field: "tenure",
            value: self.tenure.clone(),
        })?;

        // accept a decimal comma as typed on id-ID keyboards
        let rate_text = self.interest_rate.trim().replace(',', ".");
        let rate = Decimal::from_str(&rate_text).map_err(|_| LoanError::Parse {
            field: "interest_rate",
            value: self.interest_rate.clone(),
        })?;

        LoanQuoteRequest::new(amount, rate, tenure)
    }
}
