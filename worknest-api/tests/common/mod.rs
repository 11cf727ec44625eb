//! Common test utilities for API tests
//!
//! Builds the full router over an in-memory store with three accounts
//! (one admin, two users) and a token for each.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::Service as _;
use worknest_api::app::{build_router, AppState};
use worknest_api::config::Config;
use worknest_shared::auth::jwt::{create_token, Claims, TokenType};
use worknest_shared::models::user::{User, UserRole};
use worknest_shared::services::Services;
use worknest_shared::store::memory::MemoryStore;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "password123";

/// Test context containing the app and its seeded accounts
pub struct TestContext {
    pub app: Router,
    pub services: Services,
    pub admin: User,
    pub user: User,
    pub other: User,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let vars: HashMap<&str, &str> = [
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", JWT_SECRET),
            ("SEED_ENABLED", "false"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))?;

        let services = Services::new(Arc::new(MemoryStore::new()));
        let users = &services.users;

        let admin = users
            .register_user("Admin", "admin@example.com", PASSWORD, UserRole::Admin)
            .await?;
        let user = users
            .register_user("Naina", "naina@example.com", PASSWORD, UserRole::User)
            .await?;
        let other = users
            .register_user("Vinayak", "vinay@example.com", PASSWORD, UserRole::User)
            .await?;

        let app = build_router(AppState::new(services.clone(), config, None));

        Ok(Self {
            app,
            services,
            admin,
            user,
            other,
        })
    }

    /// Signs an access token for `user`
    pub fn token(&self, user: &User) -> String {
        let claims = Claims::new(user.id, user.role, TokenType::Access);
        create_token(&claims, JWT_SECRET).unwrap()
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// An empty body parses as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        as_user: Option<&User>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let token = as_user.map(|user| self.token(user));
        self.send_with_token(method, uri, token.as_deref(), body).await
    }

    /// Like [`TestContext::send`], with an explicit bearer token
    pub async fn send_with_token(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .call(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Creates a task through the API as `as_user` and returns its id
    pub async fn create_task(&self, as_user: &User, body: Value) -> String {
        let (status, json) = self.send("POST", "/api/tasks", Some(as_user), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", json);
        json["id"].as_str().unwrap().to_string()
    }
}

/// A day relative to today, formatted for JSON bodies
pub fn day(offset: i64) -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(offset)).to_string()
}
