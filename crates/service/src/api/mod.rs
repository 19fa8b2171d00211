//! Backend access: one trait method per logical operation.
//!
//! [`http::HttpPortalApi`] talks to the real backend; [`mock::MockPortalApi`]
//! scripts answers for tests and benches.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use models::{
    AccountSummary, Card, ChangePasswordRequest, Identity, InvoiceDetail, InvoiceId, InvoiceSummary, LoginRequest,
    ServerMessage,
};

use crate::errors::ApiError;

pub use http::HttpPortalApi;
pub use mock::MockPortalApi;

pub mod paths {
    pub const LOGIN: &str = "/api/auth/login";
    pub const LOGOUT: &str = "/api/auth/logout";
    pub const ME: &str = "/api/auth/me";
    pub const ACCOUNT_SUMMARY: &str = "/api/account/get_account_d";
    pub const CARD: &str = "/api/account/card/me";
    pub const INVOICES: &str = "/api/account/get_invoices";
    pub const INVOICE_PREFIX: &str = "/api/account/get_invoice/";
    pub const CHANGE_PASSWORD: &str = "/api/account/change_password";

    pub fn invoice(id: super::InvoiceId) -> String {
        format!("{INVOICE_PREFIX}{id}")
    }
}

/// Every call except `login` needs a live session cookie. Nothing here retries.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<ServerMessage, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn session_identity(&self) -> Result<Identity, ApiError>;
    async fn account_summary(&self) -> Result<AccountSummary, ApiError>;
    async fn card(&self) -> Result<Card, ApiError>;
    async fn invoices(&self) -> Result<Vec<InvoiceSummary>, ApiError>;
    async fn invoice(&self, id: InvoiceId) -> Result<InvoiceDetail, ApiError>;
    async fn change_password(&self, req: &ChangePasswordRequest) -> Result<ServerMessage, ApiError>;

    /// Cookies the backend has issued to this client, formatted as a
    /// `Cookie` header. `None` when the client does not keep a jar.
    fn session_cookie_header(&self) -> Option<String> {
        None
    }
}
