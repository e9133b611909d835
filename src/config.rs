use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};
use crate::types::FinalInstallment;

/// calculator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub default_tenure_months: u32,
    pub default_monthly_rate_percent: Decimal,
    /// upper bound on accepted tenures, `None` for no bound
    pub max_tenure_months: Option<u32>,
    pub final_installment: FinalInstallment,
    /// decimal places of the installment under `FinalInstallment::Reconcile`
    pub installment_rounding_dp: u32,
    pub display: DisplayConfig,
}

/// presentation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub currency_prefix: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
    pub decimal_places: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self::cooperative()
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::rupiah()
    }
}

impl CalculatorConfig {
    /// settings used by the cooperative loan calculator
    pub fn cooperative() -> Self {
        Self {
            default_tenure_months: 12,
            default_monthly_rate_percent: dec!(0.8),
            max_tenure_months: None,
            final_installment: FinalInstallment::Clamp,
            installment_rounding_dp: 0,
            display: DisplayConfig::rupiah(),
        }
    }

    /// cooperative settings with installments rounded to whole rupiah and
    /// the residual settled in the last month
    pub fn reconciled() -> Self {
        Self {
            final_installment: FinalInstallment::Reconcile,
            ..Self::cooperative()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tenure_months == Some(0) {
            return Err(LoanError::InvalidConfiguration {
                message: "max_tenure_months must be at least 1".to_string(),
            });
        }
        let max_tenure = self.max_tenure_months.unwrap_or(u32::MAX);
        if self.default_tenure_months == 0 || self.default_tenure_months > max_tenure {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "default_tenure_months {} must be between 1 and {}",
                    self.default_tenure_months, max_tenure
                ),
            });
        }
        if self.default_monthly_rate_percent < Decimal::ZERO {
            return Err(LoanError::InvalidConfiguration {
                message: "default_monthly_rate_percent must not be negative".to_string(),
            });
        }
        // Decimal supports at most 28 fractional digits
        if self.installment_rounding_dp > 28 || self.display.decimal_places > 28 {
            return Err(LoanError::InvalidConfiguration {
                message: "rounding precision must be at most 28 decimal places".to_string(),
            });
        }
        if self.display.thousands_separator == self.display.decimal_separator {
            return Err(LoanError::InvalidConfiguration {
                message: "thousands and decimal separators must differ".to_string(),
            });
        }
        Ok(())
    }
}

impl DisplayConfig {
    /// indonesian rupiah: "Rp 1.066.185"
    pub fn rupiah() -> Self {
        Self {
            currency_prefix: "Rp".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            decimal_places: 0,
        }
    }
}
