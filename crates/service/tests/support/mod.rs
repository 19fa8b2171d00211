//! In-process stand-in for the account backend.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const SESSION_COOKIE: &str = "SESSION=abc123";
pub const PASSWORD: &str = "secret";

#[derive(Default)]
pub struct Hits {
    pub summary: AtomicUsize,
    pub me: AtomicUsize,
}

impl Hits {
    pub fn summary(&self) -> usize {
        self.summary.load(Ordering::SeqCst)
    }
}

fn signed_in(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|c| c.split(';').any(|p| p.trim() == SESSION_COOKIE))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Not authenticated"}))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == PASSWORD {
        (
            StatusCode::OK,
            [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))],
            "Login successful",
        )
            .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"}))).into_response()
    }
}

async fn me(State(hits): State<Arc<Hits>>, headers: HeaderMap) -> Response {
    hits.me.fetch_add(1, Ordering::SeqCst);
    if !signed_in(&headers) {
        return unauthorized();
    }
    Json(json!({"id": 1, "email": "astrid@example.se", "firstName": "Astrid", "lastName": "Lind"})).into_response()
}

async fn summary(State(hits): State<Arc<Hits>>, headers: HeaderMap) -> Response {
    hits.summary.fetch_add(1, Ordering::SeqCst);
    if !signed_in(&headers) {
        return unauthorized();
    }
    Json(json!({"data": {
        "firstName": "Astrid", "lastName": "Lind", "email": "astrid@example.se",
        "phoneNum": "070-1234567", "points": 1200, "creditLimit": 10000, "creditUsed": 2500,
        "invoiceDTOs": [{"invoiceDate": "2024-01-10", "status": "paid", "sum": 500}],
        "transactions": [
            {"transactionId": 1, "deviceCompanyName": "ICA Maxi", "transactionDate": "2024-02-11", "transactionCost": 120}
        ]
    }}))
    .into_response()
}

async fn card(headers: HeaderMap) -> Response {
    if !signed_in(&headers) {
        return unauthorized();
    }
    Json(json!({"active": true, "cardNum": "1234 5678 9012 3456", "expiryDate": "2027-05-31", "transactions": []}))
        .into_response()
}

async fn invoices(headers: HeaderMap) -> Response {
    if !signed_in(&headers) {
        return unauthorized();
    }
    Json(json!([
        {"invoiceDate": "2024-01-10", "status": "paid", "sum": 500},
        {"invoiceDate": "2024-03-01", "status": "due", "sum": 300}
    ]))
    .into_response()
}

async fn invoice(Path(id): Path<i64>, headers: HeaderMap) -> Response {
    if !signed_in(&headers) {
        return unauthorized();
    }
    if id != 7 {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Invoice not found"}))).into_response();
    }
    Json(json!({
        "id": 7, "invoiceDate": "2024-03-01", "status": "due", "sum": 300,
        "transactions": [
            {"transactionId": 11, "deviceCompanyName": "SJ", "transactionDate": "2024-02-20", "transactionCost": 180}
        ]
    }))
    .into_response()
}

async fn change_password(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !signed_in(&headers) {
        return unauthorized();
    }
    if body["oldPassword"] != PASSWORD {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "Old password is incorrect"}))).into_response();
    }
    Json(json!({"message": "Password updated"})).into_response()
}

async fn logout() -> Response {
    (StatusCode::OK, [(header::SET_COOKIE, "SESSION=; Path=/; Max-Age=0")]).into_response()
}

pub fn backend(hits: Arc<Hits>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/account/get_account_d", get(summary))
        .route("/api/account/card/me", get(card))
        .route("/api/account/get_invoices", get(invoices))
        .route("/api/account/get_invoice/:id", get(invoice))
        .route("/api/account/change_password", post(change_password))
        .with_state(hits)
}

/// Serve `app` on an ephemeral port and return its base URL.
pub async fn serve(app: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

pub async fn spawn_backend() -> anyhow::Result<(String, Arc<Hits>)> {
    let hits = Arc::new(Hits::default());
    let base = serve(backend(Arc::clone(&hits))).await?;
    Ok((base, hits))
}

pub fn api_config(base_url: &str) -> configs::ApiConfig {
    configs::ApiConfig { base_url: base_url.into(), request_timeout_secs: 5, connect_timeout_secs: 2 }
}
