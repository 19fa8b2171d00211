use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Router plus state for a validated config; no sockets involved.
pub fn build_app(cfg: &AppConfig) -> Router {
    routes::build_router(AppState::new(cfg), build_cors())
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Public entry: serve the portal until the listener fails.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    if let Some(admin) = cfg.admin_addr.as_deref() {
        common::admin_http::spawn_admin_server(admin, service::observability::encode_metrics);
    }

    let app = build_app(&cfg);
    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, backend = %cfg.api.base_url, "portal listening");
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}
