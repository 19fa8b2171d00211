//! Scripted in-memory backend for tests, doc examples and benches.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use models::{
    AccountSummary, Card, ChangePasswordRequest, Identity, InvoiceDetail, InvoiceId, InvoiceSummary, LoginRequest,
    ServerMessage,
};

use super::PortalApi;
use crate::errors::ApiError;

struct ScriptInner<T> {
    queue: VecDeque<(Duration, Result<T, ApiError>)>,
    fallback: Option<Result<T, ApiError>>,
}

/// Answers for one operation: queued one-shot answers first, then the
/// fallback set with [`Script::set`].
pub struct Script<T> {
    inner: Mutex<ScriptInner<T>>,
    calls: AtomicUsize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(ScriptInner { queue: VecDeque::new(), fallback: None }),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T: Clone> Script<T> {
    pub fn set(&self, answer: Result<T, ApiError>) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).fallback = Some(answer);
    }

    pub fn push(&self, answer: Result<T, ApiError>) {
        self.push_delayed(Duration::ZERO, answer);
    }

    /// Queue an answer that arrives only after `delay`.
    pub fn push_delayed(&self, delay: Duration, answer: Result<T, ApiError>) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .queue
            .push_back((delay, answer));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer(&self, op: &str) -> Result<T, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, answer) = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            match inner.queue.pop_front() {
                Some(next) => next,
                None => {
                    let fallback = inner.fallback.clone().unwrap_or_else(|| {
                        Err(ApiError::Server { status: 501, message: Some(format!("{op} not scripted")) })
                    });
                    (Duration::ZERO, fallback)
                }
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        answer
    }
}

/// In-memory [`PortalApi`]; every operation has its own [`Script`].
#[derive(Default)]
pub struct MockPortalApi {
    pub login: Script<ServerMessage>,
    pub logout: Script<()>,
    pub session_identity: Script<Identity>,
    pub account_summary: Script<AccountSummary>,
    pub card: Script<Card>,
    pub invoices: Script<Vec<InvoiceSummary>>,
    pub invoice: Script<InvoiceDetail>,
    pub change_password: Script<ServerMessage>,
    requested_invoices: Mutex<Vec<InvoiceId>>,
}

impl MockPortalApi {
    /// Total calls across every operation.
    pub fn total_calls(&self) -> usize {
        self.login.calls()
            + self.logout.calls()
            + self.session_identity.calls()
            + self.account_summary.calls()
            + self.card.calls()
            + self.invoices.calls()
            + self.invoice.calls()
            + self.change_password.calls()
    }

    pub fn requested_invoices(&self) -> Vec<InvoiceId> {
        self.requested_invoices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl PortalApi for MockPortalApi {
    async fn login(&self, _req: &LoginRequest) -> Result<ServerMessage, ApiError> {
        self.login.answer("login").await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logout.answer("logout").await
    }

    async fn session_identity(&self) -> Result<Identity, ApiError> {
        self.session_identity.answer("session_identity").await
    }

    async fn account_summary(&self) -> Result<AccountSummary, ApiError> {
        self.account_summary.answer("account_summary").await
    }

    async fn card(&self) -> Result<Card, ApiError> {
        self.card.answer("card").await
    }

    async fn invoices(&self) -> Result<Vec<InvoiceSummary>, ApiError> {
        self.invoices.answer("invoices").await
    }

    async fn invoice(&self, id: InvoiceId) -> Result<InvoiceDetail, ApiError> {
        self.requested_invoices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
        self.invoice.answer("invoice").await
    }

    async fn change_password(&self, _req: &ChangePasswordRequest) -> Result<ServerMessage, ApiError> {
        self.change_password.answer("change_password").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queue_then_fallback() {
        let mock = MockPortalApi::default();
        mock.logout.push(Err(ApiError::Timeout));
        mock.logout.set(Ok(()));
        assert_eq!(mock.logout().await, Err(ApiError::Timeout));
        assert_eq!(mock.logout().await, Ok(()));
        assert_eq!(mock.logout().await, Ok(()));
        assert_eq!(mock.logout.calls(), 3);
    }

    #[tokio::test]
    async fn unscripted_operation_fails_loudly() {
        let mock = MockPortalApi::default();
        let err = mock.card().await.unwrap_err();
        assert_eq!(err, ApiError::Server { status: 501, message: Some("card not scripted".into()) });
        assert_eq!(mock.total_calls(), 1);
    }
}
