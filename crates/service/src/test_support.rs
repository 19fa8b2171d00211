#![cfg(test)]
//! Fixtures shared by the unit tests of this crate.

use std::str::FromStr;
use std::sync::Arc;

use models::{AccountSummary, Card, InvoiceDetail, InvoiceSummary, Transaction};
use rust_decimal::Decimal;

use crate::api::MockPortalApi;
use crate::cache::QueryCache;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("decimal literal")
}

pub fn tx(id: i64, merchant: &str, date: &str, cost: &str) -> Transaction {
    Transaction {
        transaction_id: id,
        device_company_name: merchant.into(),
        transaction_date: date.into(),
        transaction_cost: dec(cost),
    }
}

pub fn invoice(date: &str, status: &str, sum: &str) -> InvoiceSummary {
    InvoiceSummary { invoice_date: date.into(), status: status.into(), sum: dec(sum) }
}

pub fn invoice_detail(id: i64) -> InvoiceDetail {
    InvoiceDetail {
        id,
        summary: invoice("2024-03-01", "due", "300"),
        transactions: vec![tx(11, "ICA Maxi", "2024-02-11", "120"), tx(12, "SJ", "2024-02-20", "180")],
    }
}

pub fn card() -> Card {
    Card {
        active: true,
        card_num: "1234 5678 9012 3456".into(),
        expiry_date: "2027-05-31".into(),
        transactions: vec![tx(1, "Spotify", "2024-02-01", "119")],
    }
}

pub fn summary(first_name: &str) -> AccountSummary {
    AccountSummary {
        first_name: first_name.into(),
        last_name: "Lind".into(),
        email: "astrid@example.se".into(),
        phone_num: "070-1234567".into(),
        points: 1200,
        credit_limit: dec("10000"),
        credit_used: dec("2500"),
        balance: None,
        card: None,
        invoice_dtos: None,
        transactions: Some(vec![
            tx(1, "ICA Maxi", "2024-02-11", "120"),
            tx(2, "Spotify", "2024-03-01", "119"),
            tx(3, "SJ", "2024-01-20", "450"),
        ]),
    }
}

pub fn mock_cache() -> (Arc<MockPortalApi>, QueryCache) {
    let mock = Arc::new(MockPortalApi::default());
    let cache = QueryCache::new(mock.clone());
    (mock, cache)
}
