use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub active: bool,
    /// Full number as sent by the backend; only ever displayed masked.
    pub card_num: String,
    pub expiry_date: String,
    /// Absent when the card is embedded in the account summary.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_card_defaults_transactions() {
        let card: Card = serde_json::from_str(
            r#"{"active":true,"cardNum":"1234 5678 9012 3456","expiryDate":"2027-05-31"}"#,
        )
        .unwrap();
        assert!(card.active);
        assert!(card.transactions.is_empty());
    }

    #[test]
    fn missing_card_number_is_an_error() {
        let res = serde_json::from_str::<Card>(r#"{"active":true,"expiryDate":"2027-05-31"}"#);
        assert!(res.is_err());
    }
}
