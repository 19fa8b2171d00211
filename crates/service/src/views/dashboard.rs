use models::AccountSummary;
use serde::Serialize;

use super::format::sek;
use super::invoices::{newest_first, InvoiceRow};
use super::transactions::{rows, TransactionRow};
use super::PageState;
use crate::cache::{QueryCache, QueryKey, QuerySnapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub welcome: String,
    pub display_name: String,
    pub credit_used: String,
    pub credit_limit: String,
    pub available_credit: String,
    pub points: i64,
    /// From the invoice listing; `None` while it is unavailable.
    pub latest_invoice: Option<InvoiceRow>,
    pub transactions: Vec<TransactionRow>,
}

impl DashboardView {
    pub fn build(summary: &AccountSummary, invoices: &QuerySnapshot) -> Self {
        let first = summary.first_name.trim();
        let welcome = if first.is_empty() { "Welcome!".to_string() } else { format!("Welcome, {first}!") };
        let latest_invoice = invoices
            .data
            .as_deref()
            .and_then(|d| d.invoices())
            .and_then(|list| newest_first(list).first().map(|inv| InvoiceRow::from(*inv)));
        Self {
            welcome,
            display_name: display_name(summary),
            credit_used: sek(summary.credit_used),
            credit_limit: sek(summary.credit_limit),
            available_credit: sek(summary.available_credit()),
            points: summary.points,
            latest_invoice,
            transactions: rows(summary.transactions()),
        }
    }

    /// Summary and invoices are requested concurrently; only the summary is
    /// required for the page to render.
    pub async fn load(cache: &QueryCache) -> PageState<Self> {
        let (summary, invoices) =
            tokio::join!(cache.revalidate(QueryKey::AccountSummary), cache.revalidate(QueryKey::Invoices));
        PageState::from_snapshot(&summary, None, |d| d.account_summary().map(|s| Self::build(s, &invoices)))
    }
}

fn display_name(summary: &AccountSummary) -> String {
    let full = summary.full_name();
    if !full.is_empty() {
        full
    } else if !summary.email.trim().is_empty() {
        summary.email.clone()
    } else {
        "Welcome".into()
    }
}
