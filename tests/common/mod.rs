#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use habit_api_rust::app::{app, AppState};
use habit_api_rust::auth::{generate_jwt, Claims};
use habit_api_rust::config::AppConfig;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    secret: String,
    client: Client,
}

/// A caller with its own bearer token.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Starts the router on an unused port inside the current test runtime,
/// backed by a fresh in-memory store.
pub async fn spawn_server() -> Result<TestServer> {
    let config = AppConfig::development();
    let secret = config.security.jwt_secret.clone();

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    let router = app(AppState::in_memory(config));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        secret,
        client: Client::new(),
    })
}

impl TestServer {
    pub fn user(&self, username: &str) -> Result<TestUser> {
        let id = Uuid::new_v4();
        let token = generate_jwt(&Claims::new(id, username, 1)?, &self.secret)?;
        Ok(TestUser { id, token })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends an authenticated request and returns the status and decoded body
    /// (`Value::Null` for empty bodies).
    pub async fn call(&self, user: &TestUser, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, self.url(path)).bearer_auth(&user.token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let body = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, body))
    }

    pub async fn get(&self, user: &TestUser, path: &str) -> Result<(StatusCode, Value)> {
        self.call(user, Method::GET, path, None).await
    }

    pub async fn post(&self, user: &TestUser, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(user, Method::POST, path, Some(body)).await
    }

    /// Creates a habit and returns its id, failing the test on anything but 201.
    pub async fn create_habit(&self, user: &TestUser, name: &str, habit_type: &str) -> Result<i64> {
        let (status, body) = self
            .post(user, "/habits", serde_json::json!({ "name": name, "type": habit_type }))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "create habit failed: {}", body);
        body["data"]["id"].as_i64().context("habit id missing")
    }
}

pub fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|h| h["name"].as_str().map(String::from)).collect())
        .unwrap_or_default()
}
