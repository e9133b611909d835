use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::schedule::LoanAmortizer;
use crate::types::{LoanQuoteRequest, LoanQuoteResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

/// a loan product offered by the cooperative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub min_amount: Money,
    pub max_amount: Money,
    pub monthly_rate_percent: Decimal,
    pub min_tenure_months: u32,
    pub max_tenure_months: u32,
    /// documents an applicant has to provide
    pub requirements: Vec<String>,
    pub status: ProductStatus,
}

impl LoanProduct {
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// check an amount and tenure against this product
    pub fn check_limits(&self, amount: Money, tenure_months: u32) -> Result<()> {
        if !self.is_active() {
            return Err(LoanError::ProductInactive { id: self.id.clone() });
        }
        if amount < self.min_amount || amount > self.max_amount {
            return Err(LoanError::AmountOutsideLimits {
                amount,
                min: self.min_amount,
                max: self.max_amount,
            });
        }
        if tenure_months < self.min_tenure_months || tenure_months > self.max_tenure_months {
            return Err(LoanError::TenureOutsideLimits {
                months: tenure_months,
                min: self.min_tenure_months,
                max: self.max_tenure_months,
            });
        }
        Ok(())
    }

    /// request at this product's rate
    pub fn request(&self, amount: Money, tenure_months: u32) -> Result<LoanQuoteRequest> {
        self.check_limits(amount, tenure_months)?;
        LoanQuoteRequest::new(amount, self.monthly_rate_percent, tenure_months)
    }

    /// quote a loan under this product
    pub fn quote(&self, amount: Money, tenure_months: u32, amortizer: &LoanAmortizer) -> Result<LoanQuoteResult> {
        let request = self.request(amount, tenure_months)?;
        debug!(product = %self.id, "quoting against loan product");
        amortizer.compute_schedule(&request)
    }
}

/// set of loan products
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalog {
    products: Vec<LoanProduct>,
}

impl ProductCatalog {
    pub fn new(products: Vec<LoanProduct>) -> Result<Self> {
        let catalog = Self { products };
        catalog.validate()?;
        Ok(catalog)
    }

    /// the cooperative's standard products
    pub fn cooperative() -> Self {
        let standard_documents = ["KTP", "Kartu Keluarga", "Slip Gaji/Bukti Penghasilan"];
        let with_extra = |extra: &str| {
            standard_documents
                .iter()
                .map(|s| s.to_string())
                .chain(std::iter::once(extra.to_string()))
                .collect::<Vec<_>>()
        };

        Self {
            products: vec![
                LoanProduct {
                    id: "1".to_string(),
                    name: "Modal Usaha".to_string(),
                    description: "Pinjaman untuk modal usaha UMKM".to_string(),
                    min_amount: Money::from_major(5_000_000),
                    max_amount: Money::from_major(50_000_000),
                    monthly_rate_percent: dec!(0.8),
                    min_tenure_months: 6,
                    max_tenure_months: 24,
                    requirements: with_extra("Proposal Usaha"),
                    status: ProductStatus::Active,
                },
                LoanProduct {
                    id: "2".to_string(),
                    name: "Pendidikan".to_string(),
                    description: "Pinjaman untuk biaya pendidikan".to_string(),
                    min_amount: Money::from_major(2_000_000),
                    max_amount: Money::from_major(20_000_000),
                    monthly_rate_percent: dec!(0.5),
                    min_tenure_months: 12,
                    max_tenure_months: 36,
                    requirements: with_extra("Surat Keterangan Sekolah/Kampus"),
                    status: ProductStatus::Active,
                },
            ],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, id: &str) -> Result<&LoanProduct> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| LoanError::UnknownProduct { id: id.to_string() })
    }

    pub fn active(&self) -> impl Iterator<Item = &LoanProduct> {
        self.products.iter().filter(|p| p.is_active())
    }

    pub fn products(&self) -> &[LoanProduct] {
        &self.products
    }

    fn validate(&self) -> Result<()> {
        for (i, product) in self.products.iter().enumerate() {
            if self.products[..i].iter().any(|p| p.id == product.id) {
                return Err(LoanError::InvalidConfiguration {
                    message: format!("duplicate product id {}", product.id),
                });
            }
            if !product.min_amount.is_positive() || product.min_amount > product.max_amount {
                return Err(LoanError::InvalidConfiguration {
                    message: format!("product {} has an invalid amount range", product.id),
                });
            }
            if product.min_tenure_months == 0 || product.min_tenure_months > product.max_tenure_months {
                return Err(LoanError::InvalidConfiguration {
                    message: format!("product {} has an invalid tenure range", product.id),
                });
            }
            if product.monthly_rate_percent < Decimal::ZERO {
                return Err(LoanError::InvalidConfiguration {
                    message: format!("product {} has a negative rate", product.id),
                });
            }
        }
        Ok(())
    }
}
