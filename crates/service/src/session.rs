//! One visitor's view of the backend: an API client, its query cache and the
//! mutations that change the session.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use models::{ChangePasswordRequest, Identity, LoginRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::PortalApi;
use crate::cache::{QueryCache, QueryKey};
use crate::errors::ApiError;

pub const HOME_PATH: &str = "/app";
pub const LOGIN_PATH: &str = "/";
pub const MSG_PASSWORD_CHANGED: &str = "Password changed successfully";

/// Where the page should go once a mutation settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "navigation", content = "path", rename_all = "snake_case")]
pub enum Navigation {
    Stay,
    To(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Login,
    Logout,
    ChangePassword,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::Login => "login",
            MutationKind::Logout => "logout",
            MutationKind::ChangePassword => "change_password",
        })
    }
}

/// Latest outcome of one mutation kind, for "Signing in..." style feedback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success(String),
    Error(String),
}

pub struct PortalSession {
    cache: QueryCache,
    mutations: DashMap<MutationKind, MutationState>,
}

impl fmt::Debug for PortalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalSession").field("cache", &self.cache).finish_non_exhaustive()
    }
}

impl PortalSession {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self { cache: QueryCache::new(api), mutations: DashMap::new() }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn api(&self) -> &Arc<dyn PortalApi> {
        self.cache.api()
    }

    pub fn mutation_state(&self, kind: MutationKind) -> MutationState {
        self.mutations.get(&kind).map(|s| s.value().clone()).unwrap_or_default()
    }

    /// Direct identity probe, never served from the cache.
    pub async fn check_identity(&self) -> Result<Identity, ApiError> {
        self.api().session_identity().await
    }

    /// Sign in. Navigates only once the backend confirmed the credentials.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Navigation, ApiError> {
        let req = LoginRequest::new(email.trim(), password);
        let result = self
            .run_mutation(MutationKind::Login, async {
                req.validate()?;
                self.api().login(&req).await
            })
            .await;
        match result {
            Ok(_) => {
                // A different account may have been signed in before.
                self.cache.clear();
                info!("login succeeded");
                Ok(Navigation::To(HOME_PATH.into()))
            }
            Err(e) => Err(e),
        }
    }

    /// Sign out. Session-scoped cache entries are dropped before returning,
    /// whatever the backend answered.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Navigation, ApiError> {
        let result = self
            .run_mutation(MutationKind::Logout, async { self.api().logout().await })
            .await;
        self.cache.clear();
        match result {
            Ok(()) => Ok(Navigation::To(LOGIN_PATH.into())),
            // The backend already forgot the session; locally we are done too.
            Err(e) if e.is_unauthenticated() => Ok(Navigation::To(LOGIN_PATH.into())),
            Err(e) => {
                warn!(error = %e, "logout request failed; local session cleared anyway");
                Err(e)
            }
        }
    }

    /// Change the password. Validation failures never reach the network.
    #[instrument(skip_all)]
    pub async fn change_password(&self, email: &str, old_password: &str, new_password: &str) -> Result<String, ApiError> {
        let req = ChangePasswordRequest::new(email.trim(), old_password, new_password);
        let reply = self
            .run_mutation(MutationKind::ChangePassword, async {
                req.validate()?;
                self.api().change_password(&req).await
            })
            .await?;
        // Reads of the account are refetched on their next use.
        for key in [QueryKey::SessionIdentity, QueryKey::AccountSummary] {
            self.cache.invalidate(&key);
        }
        let message = reply.0.unwrap_or_else(|| MSG_PASSWORD_CHANGED.into());
        self.mutations.insert(MutationKind::ChangePassword, MutationState::Success(message.clone()));
        Ok(message)
    }

    async fn run_mutation<T, F>(&self, kind: MutationKind, fut: F) -> Result<T, ApiError>
    where
        F: std::future::Future<Output = Result<T, ApiError>>,
    {
        self.mutations.insert(kind, MutationState::Pending);
        let result = fut.await;
        let state = match &result {
            Ok(_) => MutationState::Success(String::new()),
            Err(e) => {
                warn!(mutation = %kind, error = %e, "mutation failed");
                MutationState::Error(e.user_message())
            }
        };
        self.mutations.insert(kind, state);
        result
    }
}
