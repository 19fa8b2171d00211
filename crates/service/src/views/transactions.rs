use models::Transaction;
use rust_decimal::Decimal;
use serde::Serialize;

use super::format::{date_numeric, sek_precise, MISSING};
use super::{sort_newest_first, PageState};
use crate::cache::{QueryCache, QueryKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub merchant: String,
    pub date: String,
    pub amount: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.transaction_id,
            merchant: t.device_company_name.clone(),
            date: date_numeric(&t.transaction_date),
            amount: sek_precise(t.transaction_cost),
        }
    }
}

/// Rows newest first.
pub(crate) fn rows(transactions: &[Transaction]) -> Vec<TransactionRow> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sort_newest_first(&mut sorted, |t| t.transaction_date.as_str());
    sorted.into_iter().map(TransactionRow::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListView {
    pub count: usize,
    pub total: String,
    pub latest_date: String,
    pub rows: Vec<TransactionRow>,
}

impl TransactionListView {
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sort_newest_first(&mut sorted, |t| t.transaction_date.as_str());
        let total: Decimal = sorted.iter().map(|t| t.transaction_cost).sum();
        Self {
            count: sorted.len(),
            total: sek_precise(total),
            latest_date: sorted
                .first()
                .map(|t| date_numeric(&t.transaction_date))
                .unwrap_or_else(|| MISSING.into()),
            rows: sorted.into_iter().map(TransactionRow::from).collect(),
        }
    }

    pub async fn load(cache: &QueryCache) -> PageState<Self> {
        let snap = cache.revalidate(QueryKey::AccountSummary).await;
        PageState::from_snapshot(&snap, None, |d| d.account_summary().map(|s| Self::build(s.transactions())))
    }
}
