use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use configs::ApiConfig;
use models::{
    AccountSummary, Card, ChangePasswordRequest, Identity, InvoiceDetail, InvoiceId, InvoiceSummary, LoginRequest,
    ServerMessage,
};

use super::{paths, PortalApi};
use crate::errors::ApiError;
use crate::observability::{API_REQUESTS_TOTAL, API_REQUEST_DURATION};

struct HttpInner {
    http: Client,
    base_url: String,
    origin: Url,
    cookie_url: Url,
    jar: Arc<Jar>,
}

/// reqwest-backed client holding its own cookie jar, so one instance is one
/// browser session as far as the backend can tell.
#[derive(Clone)]
pub struct HttpPortalApi {
    inner: Arc<HttpInner>,
}

impl std::fmt::Debug for HttpPortalApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPortalApi")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpPortalApi {
    /// Client with an empty jar, as a visitor that has not signed in yet.
    pub fn new(cfg: &ApiConfig) -> Result<Self, ApiError> {
        Self::build(cfg, None)
    }

    /// Client seeded from an incoming `Cookie` header, for server-side calls
    /// made on behalf of a browser.
    pub fn with_forwarded_cookies(cfg: &ApiConfig, cookie_header: &str) -> Result<Self, ApiError> {
        Self::build(cfg, Some(cookie_header))
    }

    fn build(cfg: &ApiConfig, cookie_header: Option<&str>) -> Result<Self, ApiError> {
        let base_url = cfg.base_url.trim_end_matches('/').to_string();
        let origin = Url::parse(&format!("{base_url}/"))
            .map_err(|e| ApiError::Transport(format!("invalid api base url {base_url}: {e}")))?;
        let cookie_url = Url::parse(&format!("{base_url}/api/"))
            .map_err(|e| ApiError::Transport(format!("invalid api base url {base_url}: {e}")))?;

        let jar = Arc::new(Jar::default());
        if let Some(header) = cookie_header {
            for pair in split_cookie_header(header) {
                jar.add_cookie_str(pair, &origin);
            }
        }

        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(cfg.request_timeout())
            .connect_timeout(cfg.connect_timeout())
            .build()?;

        Ok(Self { inner: Arc::new(HttpInner { http, base_url, origin, cookie_url, jar }) })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Send one request and hand back the body of a 2xx answer.
    #[instrument(level = "debug", skip_all, fields(operation = op))]
    async fn execute(&self, op: &'static str, req: RequestBuilder) -> Result<String, ApiError> {
        let request = req.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started = Instant::now();
        let sent = self.inner.http.execute(request).await;
        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => {
                let err = ApiError::from(e);
                let outcome = if err == ApiError::Timeout { "timeout" } else { "transport" };
                API_REQUESTS_TOTAL.with_label_values(&[op, outcome]).inc();
                warn!(operation = op, %method, %path, error = %err, "backend request failed");
                return Err(err);
            }
        };
        let status = resp.status();
        let body = resp.text().await?;
        let elapsed = started.elapsed();
        API_REQUEST_DURATION.with_label_values(&[op]).observe(elapsed.as_secs_f64());
        debug!(
            operation = op,
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "backend request finished"
        );

        if status.is_success() {
            API_REQUESTS_TOTAL.with_label_values(&[op, "ok"]).inc();
            return Ok(body);
        }
        let outcome = if status.is_client_error() { "client_error" } else { "server_error" };
        API_REQUESTS_TOTAL.with_label_values(&[op, outcome]).inc();
        Err(ApiError::from_status(status.as_u16(), error_message(&body)))
    }

    async fn get_json<T: DeserializeOwned>(&self, op: &'static str, path: &str) -> Result<T, ApiError> {
        let body = self.execute(op, self.inner.http.get(self.url(path))).await?;
        decode_payload(op, &body)
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn login(&self, req: &LoginRequest) -> Result<ServerMessage, ApiError> {
        let body = self
            .execute("login", self.inner.http.post(self.url(paths::LOGIN)).json(req))
            .await?;
        Ok(ServerMessage::from_body(&body))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.execute("logout", self.inner.http.post(self.url(paths::LOGOUT)))
            .await
            .map(|_| ())
    }

    async fn session_identity(&self) -> Result<Identity, ApiError> {
        let body = self.execute("session_identity", self.inner.http.get(self.url(paths::ME))).await?;
        // Some backends answer 200 with an empty body for a valid session.
        if body.trim().is_empty() {
            return Ok(Identity::default());
        }
        decode_payload("session_identity", &body)
    }

    async fn account_summary(&self) -> Result<AccountSummary, ApiError> {
        self.get_json("account_summary", paths::ACCOUNT_SUMMARY).await
    }

    async fn card(&self) -> Result<Card, ApiError> {
        self.get_json("card", paths::CARD).await
    }

    async fn invoices(&self) -> Result<Vec<InvoiceSummary>, ApiError> {
        self.get_json("invoices", paths::INVOICES).await
    }

    async fn invoice(&self, id: InvoiceId) -> Result<InvoiceDetail, ApiError> {
        self.get_json("invoice", &paths::invoice(id)).await
    }

    async fn change_password(&self, req: &ChangePasswordRequest) -> Result<ServerMessage, ApiError> {
        let body = self
            .execute("change_password", self.inner.http.post(self.url(paths::CHANGE_PASSWORD)).json(req))
            .await?;
        Ok(ServerMessage::from_body(&body))
    }

    fn session_cookie_header(&self) -> Option<String> {
        self.inner
            .jar
            .cookies(&self.inner.cookie_url)
            .or_else(|| self.inner.jar.cookies(&self.inner.origin))
            .and_then(|v| v.to_str().ok().map(str::to_owned))
            .filter(|s| !s.is_empty())
    }
}

/// `a=1; b=2` -> `["a=1", "b=2"]`
pub fn split_cookie_header(header: &str) -> impl Iterator<Item = &str> {
    header.split(';').map(str::trim).filter(|p| p.contains('='))
}

/// Decode a 2xx body into the declared shape, unwrapping a `{ "data": ... }`
/// envelope first.
pub fn decode_payload<T: DeserializeOwned>(op: &str, body: &str) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(format!("{op}: body is not JSON: {e}")))?;
    serde_json::from_value(unwrap_envelope(value)).map_err(|e| ApiError::Decode(format!("{op}: {e}")))
}

fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_) | Value::Array(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Server-provided message of an error body; HTML error pages are ignored.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        return None;
    }
    ServerMessage::from_body(body)
        .0
        .map(|m| m.chars().take(300).collect())
}
