use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::types::RedirectBody;
use serde::Deserialize;
use service::api::http::split_cookie_header;
use service::Navigation;
use tracing::{info, warn};

use crate::errors::PortalError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn redirect_to(nav: Navigation, fallback: &str) -> Json<RedirectBody> {
    let redirect = match nav {
        Navigation::To(path) => path,
        Navigation::Stay => fallback.to_string(),
    };
    Json(RedirectBody { redirect })
}

/// Relay the backend's session cookies so the browser presents them on its
/// next page request.
fn relay_cookies(mut jar: CookieJar, cookie_header: &str) -> CookieJar {
    for pair in split_cookie_header(cookie_header) {
        if let Some((name, value)) = pair.split_once('=') {
            let mut cookie = Cookie::new(name.trim().to_string(), value.trim().to_string());
            cookie.set_path("/");
            cookie.set_http_only(true);
            cookie.set_same_site(SameSite::Lax);
            jar = jar.add(cookie);
        }
    }
    jar
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> Result<(CookieJar, Json<RedirectBody>), PortalError> {
    let session = state.sessions.fresh()?;
    let nav = session.login(&form.email, &form.password).await?;

    let jar = match session.api().session_cookie_header() {
        Some(cookies) => {
            state.sessions.register(&cookies, session.clone()).await;
            info!(event = "login", "portal session registered");
            relay_cookies(jar, &cookies)
        }
        None => {
            warn!(event = "login", "backend accepted login without issuing a cookie");
            jar
        }
    };
    Ok((jar, redirect_to(nav, &state.gate.protected_prefix)))
}

/// Always ends the local session and drops the browser's cookies; a backend
/// failure is still reported.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Response {
    let cookies = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()).unwrap_or("");

    let result = if cookies.trim().is_empty() {
        Ok(Navigation::To(state.gate.login_path.clone()))
    } else {
        match state.sessions.for_cookies(cookies).await {
            Ok(session) => session.logout().await,
            Err(e) => Err(e),
        }
    };
    if !cookies.is_empty() {
        state.sessions.forget(cookies).await;
    }

    let mut cleared = jar.clone();
    for cookie in jar.iter() {
        let mut gone = Cookie::from(cookie.name().to_string());
        gone.set_path("/");
        cleared = cleared.remove(gone);
    }

    match result {
        Ok(nav) => {
            info!(event = "logout", "portal session ended");
            (cleared, redirect_to(nav, &state.gate.login_path)).into_response()
        }
        Err(e) => (cleared, PortalError(e)).into_response(),
    }
}
