#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use tripway_api::{app, AppState, AuthConfig};
use tripway_core::notify::{EmailMessage, EmailSender, SmsMessage, SmsSender};
use tripway_core::{CoreError, CoreResult};
use tripway_store::app_config::BusinessRules;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub emails: Mutex<Vec<EmailMessage>>,
    pub sms: Mutex<Vec<SmsMessage>>,
}

#[async_trait]
impl EmailSender for RecordingNotifier {
    async fn send_email(&self, message: &EmailMessage) -> CoreResult<()> {
        self.emails.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[async_trait]
impl SmsSender for RecordingNotifier {
    async fn send_sms(&self, message: &SmsMessage) -> CoreResult<()> {
        self.sms.lock().unwrap().push(message.clone());
        Ok(())
    }
}

impl RecordingNotifier {
    /// Six digit code from the latest SMS.
    pub fn last_code(&self) -> Option<String> {
        let sms = self.sms.lock().unwrap();
        let body = &sms.last()?.body;
        body.split(|c: char| !c.is_ascii_digit())
            .find(|word| word.len() == 6)
            .map(String::from)
    }

    pub fn email_count(&self) -> usize {
        self.emails.lock().unwrap().len()
    }
}

/// Provider that is always down.
pub struct FailingNotifier;

#[async_trait]
impl EmailSender for FailingNotifier {
    async fn send_email(&self, _message: &EmailMessage) -> CoreResult<()> {
        Err(CoreError::Upstream("SendGrid returned 503".to_string()))
    }
}

#[async_trait]
impl SmsSender for FailingNotifier {
    async fn send_sms(&self, _message: &SmsMessage) -> CoreResult<()> {
        Err(CoreError::Upstream("Twilio returned 503".to_string()))
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret: JWT_SECRET.to_string(),
        expiration: 3600,
    }
}

pub fn test_app() -> (Router, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::in_memory(
        auth_config(),
        BusinessRules::default(),
        notifier.clone(),
        notifier.clone(),
    );
    (app(state), notifier)
}

pub fn failing_app() -> Router {
    let notifier = Arc::new(FailingNotifier);
    let state = AppState::in_memory(
        auth_config(),
        BusinessRules::default(),
        notifier.clone(),
        notifier,
    );
    app(state)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Sends `body` verbatim as JSON and decodes the reply, which must itself be JSON.
pub async fn send_raw(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"), "content type was {:?}", content_type);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body), None).await
}

/// Registers a user and returns `(user_id, token)`.
pub async fn register(app: &Router, name: &str, email: &str) -> (u64, String) {
    let (status, body) = post(
        app,
        "/api/register",
        json!({
            "name": name,
            "email": email,
            "phone": "+919876543210",
            "password": "s3cret-pass",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    (
        body["user"]["id"].as_u64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

/// Creates a package priced 1200, discounted to 1000, and returns its id.
pub async fn create_package(app: &Router) -> u64 {
    let (status, body) = post(
        app,
        "/api/packages",
        json!({
            "title": "Kerala Backwaters",
            "description": "Houseboats and tea gardens",
            "duration_days": 5,
            "price": 1200.0,
            "discounted_price": 1000.0,
            "rating": 4.6,
            "inclusions": ["Breakfast", "Airport transfer"],
            "exclusions": ["Flights"],
            "itinerary": [
                { "day_number": 1, "title": "Arrive in Kochi" },
                { "day_number": 2, "title": "Alleppey houseboat" }
            ],
            "faqs": [{ "question": "Is it family friendly?", "answer": "Yes" }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "package create failed: {}", body);
    body["id"].as_u64().unwrap()
}

pub fn package_booking(user_id: u64, package_id: u64, total_price: f64) -> Value {
    json!({
        "user_id": user_id,
        "booking_type": "package",
        "package_id": package_id,
        "travel_date": "2026-12-01",
        "return_date": "2026-12-06",
        "adults": 2,
        "children": 1,
        "total_price": total_price,
    })
}

/// Spawned work (best-effort emails) gets a moment to land.
pub async fn wait_for<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
