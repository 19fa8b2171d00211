//! Session gate in front of the protected section.
//!
//! Every page request under the protected prefix asks the backend whether
//! the visitor's cookie is still accepted before anything renders. The
//! answer is never cached.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use models::Identity;
use service::observability::GATE_REDIRECTS_TOTAL;
use service::{ApiError, PortalSession};
use tracing::{debug, info};

use crate::errors::PortalError;
use crate::state::{AppState, SessionRegistry};

/// The visitor's session, available to handlers behind the gate.
#[derive(Clone)]
pub struct CurrentSession(pub Arc<PortalSession>);

#[derive(Debug)]
pub enum GateDecision {
    Proceed { session: Arc<PortalSession>, identity: Identity },
    RedirectToLogin,
    /// The identity check itself failed; neither content nor a redirect.
    Unavailable(ApiError),
}

pub struct SessionGate<'a> {
    sessions: &'a SessionRegistry,
}

impl<'a> SessionGate<'a> {
    pub fn new(sessions: &'a SessionRegistry) -> Self {
        Self { sessions }
    }

    pub async fn check(&self, cookie_header: Option<&str>) -> GateDecision {
        let Some(cookies) = cookie_header.filter(|c| !c.trim().is_empty()) else {
            debug!("no cookie header");
            return GateDecision::RedirectToLogin;
        };
        let session = match self.sessions.for_cookies(cookies).await {
            Ok(s) => s,
            Err(e) => return GateDecision::Unavailable(e),
        };
        match session.check_identity().await {
            Ok(identity) => GateDecision::Proceed { session, identity },
            Err(e) if e.is_unauthenticated() => {
                info!(error = %e, "session rejected by backend");
                self.sessions.forget(cookies).await;
                GateDecision::RedirectToLogin
            }
            Err(e) => GateDecision::Unavailable(e),
        }
    }
}

pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let cookies = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match SessionGate::new(&state.sessions).check(cookies.as_deref()).await {
        GateDecision::Proceed { session, identity } => {
            req.extensions_mut().insert(CurrentSession(session));
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        GateDecision::RedirectToLogin => {
            GATE_REDIRECTS_TOTAL.inc();
            debug!(path = %req.uri().path(), to = %state.gate.login_path, "redirecting to login");
            Redirect::to(&state.gate.login_path).into_response()
        }
        GateDecision::Unavailable(e) => {
            // Always 502 with the generic message, whatever went wrong upstream.
            PortalError(ApiError::Transport(e.to_string())).into_response()
        }
    }
}
