//! Fake account backend and helpers for driving the portal router.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const GOOD: &str = "SESSION=good";
pub const FORBIDDEN: &str = "SESSION=forbidden";
pub const BROKEN: &str = "SESSION=broken";
pub const EXPIRED: &str = "SESSION=expired";

#[derive(Default)]
pub struct Backend {
    me_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    invoice_calls: AtomicUsize,
    new_invoice: AtomicBool,
}

impl Backend {
    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn invoice_calls(&self) -> usize {
        self.invoice_calls.load(Ordering::SeqCst)
    }

    /// From now on the invoice listing carries a third, newest invoice.
    pub fn issue_invoice(&self) {
        self.new_invoice.store(true, Ordering::SeqCst);
    }
}

fn session(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .map(str::trim)
        .find(|p| p.starts_with("SESSION="))
        .map(str::to_owned)
}

fn guarded(headers: &HeaderMap, body: Value) -> Response {
    match session(headers).as_deref() {
        Some(GOOD) => Json(body).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"message": "Not authenticated"}))).into_response(),
    }
}

async fn me(State(b): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    b.me_calls.fetch_add(1, Ordering::SeqCst);
    match session(&headers).as_deref() {
        Some(GOOD) => Json(json!({"email": "astrid@example.se", "firstName": "Astrid"})).into_response(),
        Some(FORBIDDEN) => StatusCode::FORBIDDEN.into_response(),
        Some(BROKEN) => (StatusCode::INTERNAL_SERVER_ERROR, "stack trace with secrets").into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        (StatusCode::OK, [(header::SET_COOKIE, format!("{GOOD}; Path=/; HttpOnly"))], "ok").into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"}))).into_response()
    }
}

async fn logout(State(b): State<Arc<Backend>>) -> StatusCode {
    b.logout_calls.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn summary(headers: HeaderMap) -> Response {
    guarded(
        &headers,
        json!({
            "firstName": "Astrid", "lastName": "Lind", "email": "astrid@example.se",
            "phoneNum": "070-1234567", "points": 1200, "creditLimit": 10000, "creditUsed": 2500,
            "transactions": []
        }),
    )
}

async fn card(headers: HeaderMap) -> Response {
    guarded(&headers, json!({"active": false, "cardNum": "1234 5678 9012 3456", "expiryDate": "2027-05-31"}))
}

async fn invoices(State(b): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    b.invoice_calls.fetch_add(1, Ordering::SeqCst);
    let mut list = vec![
        json!({"invoiceDate": "2024-01-10", "status": "paid", "sum": 500}),
        json!({"invoiceDate": "2024-03-01", "status": "due", "sum": 300}),
    ];
    if b.new_invoice.load(Ordering::SeqCst) {
        list.push(json!({"invoiceDate": "2024-04-01", "status": "due", "sum": 250}));
    }
    guarded(&headers, Value::Array(list))
}

async fn invoice(Path(id): Path<i64>, headers: HeaderMap) -> Response {
    if id != 7 {
        return StatusCode::NOT_FOUND.into_response();
    }
    guarded(&headers, json!({"id": 7, "invoiceDate": "2024-03-01", "status": "due", "sum": 300}))
}

async fn change_password(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if body["email"] != "astrid@example.se" {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "Unknown account"}))).into_response();
    }
    guarded(&headers, json!({"message": "Password updated"}))
}

pub async fn spawn_backend() -> anyhow::Result<(String, Arc<Backend>)> {
    let state = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/account/get_account_d", get(summary))
        .route("/api/account/card/me", get(card))
        .route("/api/account/get_invoices", get(invoices))
        .route("/api/account/get_invoice/:id", get(invoice))
        .route("/api/account/change_password", post(change_password))
        .with_state(Arc::clone(&state));
    let base = serve(app).await?;
    Ok((base, state))
}

pub async fn serve(app: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

pub async fn portal() -> anyhow::Result<(Router, Arc<Backend>)> {
    let (base, backend) = spawn_backend().await?;
    let mut cfg = configs::AppConfig::default();
    cfg.api.base_url = base;
    cfg.api.request_timeout_secs = 5;
    Ok((server::build_app(&cfg), backend))
}

pub fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body.to_string())).expect("request")
}

pub async fn json_body(resp: Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
