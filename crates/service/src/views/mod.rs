//! Page models for the protected section, built from cache snapshots.
//!
//! A view renders whatever data the snapshot holds, so a failed refetch
//! still shows the last good value.

pub mod format;
pub mod dashboard;
pub mod invoices;
pub mod card;
pub mod transactions;
pub mod account;

use std::cmp::Reverse;

use serde::Serialize;

use crate::cache::{QueryData, QuerySnapshot, QueryStatus};
use crate::errors::{ErrorKind, GENERIC_FAILURE};

pub use account::{AccountView, RewardsView};
pub use card::CardView;
pub use dashboard::DashboardView;
pub use invoices::{InvoiceDetailView, InvoiceListView, InvoiceRow};
pub use transactions::{TransactionListView, TransactionRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageState<T> {
    Loading,
    Ready(T),
    Empty { message: String },
    Failed { message: String },
}

impl<T> PageState<T> {
    /// `empty` is the message shown when the backend says the item does not
    /// exist; without one, NotFound is a failure like any other.
    pub fn from_snapshot(
        snap: &QuerySnapshot,
        empty: Option<&str>,
        build: impl FnOnce(&QueryData) -> Option<T>,
    ) -> Self {
        if let Some(data) = snap.data.as_deref() {
            return match build(data) {
                Some(view) => PageState::Ready(view),
                None => PageState::Failed { message: GENERIC_FAILURE.into() },
            };
        }
        match (&snap.status, &snap.error) {
            (QueryStatus::Error, Some(err)) => match (err.kind(), empty) {
                (ErrorKind::NotFound, Some(message)) => PageState::Empty { message: message.into() },
                _ => PageState::Failed { message: err.user_message() },
            },
            (QueryStatus::Error, None) => PageState::Failed { message: GENERIC_FAILURE.into() },
            _ => PageState::Loading,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PageState::Ready(v) => Some(v),
            _ => None,
        }
    }
}

/// Newest first; entries without a parseable date go last.
pub(crate) fn sort_newest_first<T>(items: &mut [T], date: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| Reverse(models::dates::parse_iso(date(item))));
}
