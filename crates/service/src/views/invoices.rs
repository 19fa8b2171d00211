use models::{InvoiceId, InvoiceSummary};
use rust_decimal::Decimal;
use serde::Serialize;

use super::format::{date_long, sek, sek_precise, MISSING};
use super::transactions::{rows, TransactionRow};
use super::{sort_newest_first, PageState};
use crate::cache::{QueryCache, QueryKey};

pub const MSG_INVOICE_NOT_FOUND: &str = "Ingen faktura hittades.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    pub date: String,
    pub status: String,
    pub sum: String,
}

impl From<&InvoiceSummary> for InvoiceRow {
    fn from(inv: &InvoiceSummary) -> Self {
        Self { date: date_long(&inv.invoice_date), status: inv.status.clone(), sum: sek(inv.sum) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceListView {
    pub count: usize,
    pub total: String,
    pub latest_date: String,
    pub rows: Vec<InvoiceRow>,
}

impl InvoiceListView {
    pub fn build(invoices: &[InvoiceSummary]) -> Self {
        let sorted = newest_first(invoices);
        let total: Decimal = sorted.iter().map(|i| i.sum).sum();
        Self {
            count: sorted.len(),
            total: sek(total),
            latest_date: sorted
                .first()
                .map(|i| date_long(&i.invoice_date))
                .unwrap_or_else(|| MISSING.into()),
            rows: sorted.into_iter().map(InvoiceRow::from).collect(),
        }
    }

    pub async fn load(cache: &QueryCache) -> PageState<Self> {
        let snap = cache.revalidate(QueryKey::Invoices).await;
        PageState::from_snapshot(&snap, None, |d| d.invoices().map(Self::build))
    }
}

pub(crate) fn newest_first(invoices: &[InvoiceSummary]) -> Vec<&InvoiceSummary> {
    let mut sorted: Vec<&InvoiceSummary> = invoices.iter().collect();
    sort_newest_first(&mut sorted, |i| i.invoice_date.as_str());
    sorted
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDetailView {
    pub id: InvoiceId,
    pub date: String,
    pub status: String,
    pub sum: String,
    pub transactions: Vec<TransactionRow>,
}

impl InvoiceDetailView {
    pub async fn load(cache: &QueryCache, id: InvoiceId) -> PageState<Self> {
        let snap = cache.revalidate(QueryKey::Invoice(id)).await;
        PageState::from_snapshot(&snap, Some(MSG_INVOICE_NOT_FOUND), |d| {
            d.invoice().map(|inv| Self {
                id: inv.id,
                date: date_long(&inv.summary.invoice_date),
                status: inv.summary.status.clone(),
                sum: sek_precise(inv.summary.sum),
                transactions: rows(&inv.transactions),
            })
        })
    }
}
