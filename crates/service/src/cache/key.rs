use std::fmt;

use models::{AccountSummary, Card, Identity, InvoiceDetail, InvoiceId, InvoiceSummary};
use serde::Serialize;

use crate::api::PortalApi;
use crate::errors::ApiError;

/// Identity of a logical read plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "operation", content = "id", rename_all = "snake_case")]
pub enum QueryKey {
    SessionIdentity,
    AccountSummary,
    Card,
    Invoices,
    Invoice(InvoiceId),
}

impl QueryKey {
    pub fn operation(&self) -> &'static str {
        match self {
            QueryKey::SessionIdentity => "session_identity",
            QueryKey::AccountSummary => "account_summary",
            QueryKey::Card => "card",
            QueryKey::Invoices => "invoices",
            QueryKey::Invoice(_) => "invoice",
        }
    }

    pub(crate) async fn run(&self, api: &dyn PortalApi) -> Result<QueryData, ApiError> {
        Ok(match self {
            QueryKey::SessionIdentity => QueryData::Identity(api.session_identity().await?),
            QueryKey::AccountSummary => QueryData::AccountSummary(Box::new(api.account_summary().await?)),
            QueryKey::Card => QueryData::Card(api.card().await?),
            QueryKey::Invoices => QueryData::Invoices(api.invoices().await?),
            QueryKey::Invoice(id) => QueryData::Invoice(api.invoice(*id).await?),
        })
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Invoice(id) => write!(f, "invoice/{id}"),
            other => f.write_str(other.operation()),
        }
    }
}

/// Decoded answer stored under a [`QueryKey`]; the variant always matches the key.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Identity(Identity),
    AccountSummary(Box<AccountSummary>),
    Card(Card),
    Invoices(Vec<InvoiceSummary>),
    Invoice(InvoiceDetail),
}

impl QueryData {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            QueryData::Identity(v) => Some(v),
            _ => None,
        }
    }

    pub fn account_summary(&self) -> Option<&AccountSummary> {
        match self {
            QueryData::AccountSummary(v) => Some(v),
            _ => None,
        }
    }

    pub fn card(&self) -> Option<&Card> {
        match self {
            QueryData::Card(v) => Some(v),
            _ => None,
        }
    }

    pub fn invoices(&self) -> Option<&[InvoiceSummary]> {
        match self {
            QueryData::Invoices(v) => Some(v),
            _ => None,
        }
    }

    pub fn invoice(&self) -> Option<&InvoiceDetail> {
        match self {
            QueryData::Invoice(v) => Some(v),
            _ => None,
        }
    }
}
