use std::sync::Arc;

use configs::{ApiConfig, AppConfig, GateConfig};
use moka::future::Cache;
use service::api::http::split_cookie_header;
use service::{ApiError, HttpPortalApi, PortalSession};
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub gate: GateConfig,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        Self { gate: cfg.gate.clone(), sessions: SessionRegistry::new(cfg) }
    }
}

/// Portal sessions keyed by the visitor's backend cookies.
///
/// Each session owns its own client and query cache, so two browsers never
/// share cached account data.
#[derive(Clone)]
pub struct SessionRegistry {
    api: ApiConfig,
    sessions: Cache<String, Arc<PortalSession>>,
}

impl SessionRegistry {
    pub fn new(cfg: &AppConfig) -> Self {
        let sessions = Cache::builder()
            .max_capacity(cfg.sessions.max_sessions)
            .time_to_idle(cfg.sessions.idle_timeout())
            .build();
        Self { api: cfg.api.clone(), sessions }
    }

    /// Session for a `Cookie` header, created on first sight.
    pub async fn for_cookies(&self, cookie_header: &str) -> Result<Arc<PortalSession>, ApiError> {
        let key = session_key(cookie_header);
        let api = self.api.clone();
        let header = cookie_header.to_string();
        self.sessions
            .try_get_with(key, async move {
                let client = HttpPortalApi::with_forwarded_cookies(&api, &header)?;
                debug!("portal session created");
                Ok::<_, ApiError>(Arc::new(PortalSession::new(Arc::new(client))))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Session with an empty jar, for a visitor about to sign in.
    pub fn fresh(&self) -> Result<Arc<PortalSession>, ApiError> {
        let client = HttpPortalApi::new(&self.api)?;
        Ok(Arc::new(PortalSession::new(Arc::new(client))))
    }

    pub async fn register(&self, cookie_header: &str, session: Arc<PortalSession>) {
        self.sessions.insert(session_key(cookie_header), session).await;
    }

    pub async fn forget(&self, cookie_header: &str) {
        self.sessions.invalidate(&session_key(cookie_header)).await;
    }

    pub async fn contains(&self, cookie_header: &str) -> bool {
        self.sessions.get(&session_key(cookie_header)).await.is_some()
    }
}

/// Cookie pairs in a stable order, so the same cookies always find the same
/// session whatever order the browser sends them in.
pub fn session_key(cookie_header: &str) -> String {
    let mut pairs: Vec<&str> = split_cookie_header(cookie_header).collect();
    pairs.sort_unstable();
    pairs.join("; ")
}
