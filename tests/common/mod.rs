#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use foodchain_api::{build_router, config::AppConfig, AppState};

/// Helper harness for driving the router against a fresh, seeded store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// Status, headers and decoded JSON body (`Value::Null` when empty or not JSON).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Construct a new test application with default configuration.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(cfg: AppConfig) -> Self {
        let state = AppState::new(cfg);
        state.seed().await.expect("failed to seed lookup tables");
        let router = build_router(state.clone());
        Self { router, state }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// POSTs `body` and returns the assigned id, failing the test on any
    /// status other than 201.
    pub async fn create(&self, collection: &str, body: Value) -> i64 {
        let response = self.post(collection, body).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create {} failed: {}",
            collection,
            response.body
        );
        response.body["Id"].as_i64().expect("created row carries an Id")
    }

    /// Number of rows in a collection (lists are uncapped in tests).
    pub async fn count(&self, collection: &str) -> usize {
        let response = self.get(collection).await;
        assert_eq!(response.status, StatusCode::OK);
        response.body.as_array().map(Vec::len).unwrap_or_default()
    }

    /// `Id`s of a list response, in order.
    pub async fn ids(&self, uri: &str) -> Vec<i64> {
        let response = self.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "GET {}: {}", uri, response.body);
        response
            .body
            .as_array()
            .expect("list response is an array")
            .iter()
            .filter_map(|row| row["Id"].as_i64())
            .collect()
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::new("127.0.0.1".to_string(), 18_080, "test".to_string())
}

pub fn location(city: &str, open_since: &str) -> Value {
    json!({
        "CountryCode": "US",
        "StateCode": "OR",
        "Country": "United States",
        "State": "Oregon",
        "City": city,
        "Street": "200 Burnside St",
        "OpenSince": open_since,
        "MenuId": 1,
        "ScheduleId": 1
    })
}

pub fn employee(first: &str, last: &str, location_id: i64, hours: i64, started_on: &str) -> Value {
    json!({
        "FirstName": first,
        "LastName": last,
        "WeeklyHours": hours,
        "StartedOn": started_on,
        "LocationId": location_id,
        "PositionId": 3
    })
}

pub fn dish(name: &str) -> Value {
    json!({ "Name": name })
}

pub fn category(name: &str) -> Value {
    json!({ "Name": name })
}

pub fn supplier(name: &str, city: &str) -> Value {
    json!({
        "Name": name,
        "CountryCode": "US",
        "StateCode": "WA",
        "Country": "United States",
        "State": "Washington",
        "City": city,
        "Street": "5 Harbor Way"
    })
}
