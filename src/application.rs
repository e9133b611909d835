use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::Result;
use crate::products::LoanProduct;
use crate::schedule::LoanAmortizer;

pub type ApplicationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDocument {
    pub doc_type: String,
    pub url: String,
}

/// loan application submitted against a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub user_id: String,
    pub product_id: String,
    pub amount: Money,
    pub tenure_months: u32,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    pub approval_date: Option<DateTime<Utc>>,
    pub documents: Vec<ApplicationDocument>,
}

impl LoanApplication {
    /// quote the loan under `product` and open a pending application
    pub fn draft(
        user_id: &str,
        product: &LoanProduct,
        amount: Money,
        tenure_months: u32,
        amortizer: &LoanAmortizer,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        let quote = product.quote(amount, tenure_months, amortizer)?;

        let application = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            product_id: product.id.clone(),
            amount,
            tenure_months,
            monthly_payment: quote.monthly_payment,
            total_interest: quote.total_interest,
            total_payment: quote.total_payment,
            status: ApplicationStatus::Pending,
            application_date: time_provider.now(),
            approval_date: None,
            documents: Vec::new(),
        };

        info!(
            application_id = %application.id,
            product = %application.product_id,
            amount = %application.amount,
            tenure = application.tenure_months,
            "drafted loan application"
        );

        Ok(application)
    }

    pub fn attach_document(&mut self, doc_type: &str, url: &str) {
        self.documents.push(ApplicationDocument {
            doc_type: doc_type.to_string(),
            url: url.to_string(),
        });
    }

    /// product requirements with no attached document of that type
    pub fn missing_requirements<'a>(&self, product: &'a LoanProduct) -> Vec<&'a str> {
        product
            .requirements
            .iter()
            .filter(|req| !self.documents.iter().any(|d| d.doc_type.eq_ignore_ascii_case(req.as_str())))
            .map(|req| req.as_str())
            .collect()
    }

    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
