use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

pub type InvoiceId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub invoice_date: String,
    /// Free-form, e.g. "paid", "due", "overdue".
    pub status: String,
    pub sum: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    pub id: InvoiceId,
    #[serde(flatten)]
    pub summary: InvoiceSummary,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}
