//! Shared fixtures for roster-server integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bigdecimal::BigDecimal;
use roster_common::Employee;
use roster_server::{
    api,
    config::{Config, StoreBackend},
    features::FeatureState,
    store::InMemoryEmployeeStore,
};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "roster-test-boundary";

pub const HEADER: &str = "id,login,name,salary\n";

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryEmployeeStore,
    pub state: FeatureState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_store(InMemoryEmployeeStore::new(), config)
    }

    pub fn with_store(store: InMemoryEmployeeStore, config: Config) -> Self {
        let state = FeatureState::new(Arc::new(store.clone()));
        let router = api::create_router(state.clone(), &config);
        Self {
            router,
            store,
            state,
        }
    }

    /// Send `request` and decode the JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.store = StoreBackend::Memory;
    config
}

pub fn decimal(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

pub fn employee(id: &str, login: &str, name: &str, salary: &str) -> Employee {
    Employee::new(id, login, name, decimal(salary))
}

/// `multipart/form-data` body with a single `file` part
pub fn multipart_body(file_name: Option<&str>, content_type: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match file_name {
        Some(name) => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n")
                .as_bytes(),
        ),
        None => body.extend_from_slice(b"Content-Disposition: form-data; name=\"file\"\r\n"),
    }
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(file_name: &str, content_type: &str, content: &str) -> Request<Body> {
    upload_request_raw(
        multipart_body(Some(file_name), Some(content_type), content.as_bytes()),
    )
}

pub fn upload_request_raw(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/employees/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
