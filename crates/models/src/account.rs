use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::invoice::InvoiceSummary;
use crate::transaction::Transaction;

/// Answer of the identity probe used by the session gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// The primary read behind most pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_num: String,
    pub points: i64,
    pub credit_limit: Decimal,
    pub credit_used: Decimal,
    /// Available credit when the backend precomputes it.
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub card: Option<Card>,
    /// Decoded for completeness; invoice listings read `get_invoices` instead.
    #[serde(default, rename = "invoiceDTOs")]
    pub invoice_dtos: Option<Vec<InvoiceSummary>>,
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
}

impl AccountSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// `balance` when present, otherwise `limit - used` floored at zero.
    pub fn available_credit(&self) -> Decimal {
        self.balance
            .unwrap_or_else(|| (self.credit_limit - self.credit_used).max(Decimal::ZERO))
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(balance: Option<i64>, limit: i64, used: i64) -> AccountSummary {
        AccountSummary {
            first_name: "Astrid".into(),
            last_name: "Lind".into(),
            email: "astrid@example.se".into(),
            phone_num: "070-1234567".into(),
            points: 1200,
            credit_limit: Decimal::from(limit),
            credit_used: Decimal::from(used),
            balance: balance.map(Decimal::from),
            card: None,
            invoice_dtos: None,
            transactions: None,
        }
    }

    #[test]
    fn available_credit_prefers_balance() {
        assert_eq!(summary(Some(42), 10_000, 2_000).available_credit(), Decimal::from(42));
        assert_eq!(summary(None, 10_000, 2_000).available_credit(), Decimal::from(8_000));
        assert_eq!(summary(None, 1_000, 2_000).available_credit(), Decimal::ZERO);
    }

    #[test]
    fn decodes_wire_shape() {
        let json = r#"{
            "firstName": "Astrid", "lastName": "Lind", "email": "astrid@example.se",
            "phoneNum": "070-1234567", "points": 1200, "creditLimit": 10000, "creditUsed": 2500.5,
            "card": {"active": true, "cardNum": "1234 5678 9012 3456", "expiryDate": "2027-05-31"},
            "invoiceDTOs": [{"invoiceDate": "2024-01-10", "status": "paid", "sum": 500}],
            "transactions": []
        }"#;
        let s: AccountSummary = serde_json::from_str(json).unwrap();
        assert_eq!(s.full_name(), "Astrid Lind");
        assert_eq!(s.invoice_dtos.as_ref().map(Vec::len), Some(1));
        assert!(s.card.is_some());
        assert!(s.transactions().is_empty());
    }

    #[test]
    fn missing_required_field_fails() {
        let json = r#"{"firstName": "Astrid", "lastName": "Lind"}"#;
        assert!(serde_json::from_str::<AccountSummary>(json).is_err());
    }

    #[test]
    fn identity_ignores_unknown_fields() {
        let id: Identity = serde_json::from_str(r#"{"email":"a@b.se","roles":["user"]}"#).unwrap();
        assert_eq!(id.email.as_deref(), Some("a@b.se"));
    }
}
