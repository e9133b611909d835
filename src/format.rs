//! presentation helpers: currency strings, summary, schedule table and json view
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DisplayConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{AmortizationRow, LoanQuoteRequest, LoanQuoteResult};

/// format an amount, e.g. "Rp 1.066.185"
pub fn format_amount(amount: Money, display: &DisplayConfig) -> String {
    let rounded = amount.round_dp(display.decimal_places).as_decimal();
    let negative = rounded < Decimal::ZERO;
    let digits = format!("{:.*}", display.decimal_places as usize, rounded.abs());

    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::new();
    if !display.currency_prefix.is_empty() {
        out.push_str(&display.currency_prefix);
        out.push(' ');
    }
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(whole, display.thousands_separator));
    if let Some(fraction) = fraction {
        out.push(display.decimal_separator);
        out.push_str(fraction);
    }
    out
}

fn group_thousands(whole: &str, separator: char) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// headline figures of a quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteSummary {
    pub monthly_payment: String,
    pub total_interest: String,
    pub total_payment: String,
}

impl QuoteSummary {
    pub fn new(result: &LoanQuoteResult, display: &DisplayConfig) -> Self {
        Self {
            monthly_payment: format_amount(result.monthly_payment, display),
            total_interest: format_amount(result.total_interest, display),
            total_payment: format_amount(result.total_payment, display),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleTableRow {
    pub month: u32,
    pub principal: String,
    pub interest: String,
    pub remaining: String,
}

/// schedule rendered as month / principal / interest / remaining
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleTable {
    pub rows: Vec<ScheduleTableRow>,
}

impl ScheduleTable {
    pub fn new(result: &LoanQuoteResult, display: &DisplayConfig) -> Self {
        let rows = result
            .schedule
            .iter()
            .map(|row| ScheduleTableRow {
                month: row.month,
                principal: format_amount(row.principal_portion, display),
                interest: format_amount(row.interest_portion, display),
                remaining: format_amount(row.remaining_balance, display),
            })
            .collect();
        Self { rows }
    }

    /// plain-text table with right-aligned columns
    pub fn render(&self) -> String {
        let headers = ["Month", "Principal", "Interest", "Remaining"];
        let cells: Vec<[String; 4]> = self
            .rows
            .iter()
            .map(|r| [r.month.to_string(), r.principal.clone(), r.interest.clone(), r.remaining.clone()])
            .collect();

        let mut widths = headers.map(|h| h.chars().count());
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |values: [&str; 4]| {
            values
                .iter()
                .zip(widths.iter())
                .map(|(v, w)| format!("{:>width$}", v, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
        };

        let mut out = line(headers);
        for row in &cells {
            out.push('\n');
            out.push_str(&line([&row[0], &row[1], &row[2], &row[3]]));
        }
        out
    }
}

/// serializable view of a calculation, request and result together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteView {
    pub amount: Money,
    pub tenure_months: u32,
    pub monthly_rate_percent: Decimal,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub schedule: Vec<AmortizationRow>,
}

impl QuoteView {
    pub fn from_quote(request: &LoanQuoteRequest, result: &LoanQuoteResult) -> Self {
        Self {
            amount: request.principal(),
            tenure_months: request.tenure_months(),
            monthly_rate_percent: request.monthly_rate_percent(),
            monthly_payment: result.monthly_payment,
            total_interest: result.total_interest,
            total_payment: result.total_payment,
            schedule: result.schedule.clone(),
        }
    }

    /// copy with every amount rounded to `dp` decimal places
    pub fn rounded(&self, dp: u32) -> Self {
        let r = |m: Money| m.round_dp(dp);
        Self {
            amount: r(self.amount),
            tenure_months: self.tenure_months,
            monthly_rate_percent: self.monthly_rate_percent,
            monthly_payment: r(self.monthly_payment),
            total_interest: r(self.total_interest),
            total_payment: r(self.total_payment),
            schedule: self
                .schedule
                .iter()
                .map(|row| AmortizationRow {
                    month: row.month,
                    opening_balance: r(row.opening_balance),
                    payment_amount: r(row.payment_amount),
                    principal_portion: r(row.principal_portion),
                    interest_portion: r(row.interest_portion),
                    remaining_balance: r(row.remaining_balance),
                    cumulative_interest: r(row.cumulative_interest),
                    cumulative_principal: r(row.cumulative_principal),
                })
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
