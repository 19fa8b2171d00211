use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: i64,
    pub device_company_name: String,
    pub transaction_date: String,
    /// Signed; refunds come back negative.
    pub transaction_cost: Decimal,
}
