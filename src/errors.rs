use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid input for {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    #[error("unknown loan product: {id}")]
    UnknownProduct {
        id: String,
    },

    #[error("loan product not active: {id}")]
    ProductInactive {
        id: String,
    },

    #[error("amount {amount} outside product limits: minimum {min}, maximum {max}")]
    AmountOutsideLimits {
        amount: Money,
        min: Money,
        max: Money,
    },

    #[error("tenure of {months} months outside product limits: minimum {min}, maximum {max}")]
    TenureOutsideLimits {
        months: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("cannot parse {field}: {value:?}")]
    Parse {
        field: &'static str,
        value: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LoanError {
    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// true for validation failures of the calculator core
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LoanError::InvalidInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
