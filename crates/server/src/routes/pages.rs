use axum::extract::Path;
use axum::{Extension, Json};
use common::types::MessageBody;
use models::{Identity, InvoiceId};
use serde::Deserialize;
use service::{MutationKind, MutationState};
use service::views::{
    AccountView, CardView, DashboardView, InvoiceDetailView, InvoiceListView, PageState, RewardsView,
    TransactionListView,
};

use crate::errors::PortalError;
use crate::gate::CurrentSession;

type Page<T> = Json<PageState<T>>;

pub async fn dashboard(Extension(CurrentSession(s)): Extension<CurrentSession>) -> Page<DashboardView> {
    Json(DashboardView::load(s.cache()).await)
}

pub async fn invoices(Extension(CurrentSession(s)): Extension<CurrentSession>) -> Page<InvoiceListView> {
    Json(InvoiceListView::load(s.cache()).await)
}

pub async fn invoice(
    Extension(CurrentSession(s)): Extension<CurrentSession>,
    Path(id): Path<InvoiceId>,
) -> Page<InvoiceDetailView> {
    Json(InvoiceDetailView::load(s.cache(), id).await)
}

pub async fn card(Extension(CurrentSession(s)): Extension<CurrentSession>) -> Page<CardView> {
    Json(CardView::load(s.cache()).await)
}

pub async fn transactions(Extension(CurrentSession(s)): Extension<CurrentSession>) -> Page<TransactionListView> {
    Json(TransactionListView::load(s.cache()).await)
}

pub async fn rewards(Extension(CurrentSession(s)): Extension<CurrentSession>) -> Page<RewardsView> {
    Json(RewardsView::load(s.cache()).await)
}

pub async fn account(Extension(CurrentSession(s)): Extension<CurrentSession>) -> Page<AccountView> {
    Json(AccountView::load(s.cache()).await)
}

/// Latest outcome of a mutation on this session, for "Changing..." style
/// feedback while a request is still running.
pub async fn mutation_status(
    Extension(CurrentSession(s)): Extension<CurrentSession>,
    Path(kind): Path<MutationKind>,
) -> Json<MutationState> {
    Json(s.mutation_state(kind))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// The form's email wins; the signed-in identity fills it in otherwise.
pub async fn change_password(
    Extension(CurrentSession(s)): Extension<CurrentSession>,
    Extension(identity): Extension<Identity>,
    Json(form): Json<PasswordForm>,
) -> Result<Json<MessageBody>, PortalError> {
    let email = form
        .email
        .filter(|e| !e.trim().is_empty())
        .or(identity.email)
        .unwrap_or_default();
    let message = s.change_password(&email, &form.old_password, &form.new_password).await?;
    Ok(Json(MessageBody { message }))
}
