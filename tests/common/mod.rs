#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use piper::config::AppConfig;
use piper::database::Database;
use piper::AppState;

pub const ADMIN_EMAIL: &str = "a@acme.com";
pub const ADMIN_PASSWORD: &str = "Abc12345!";
pub const USER_PASSWORD: &str = "Passw0rd!";

/// An in-process server on its own port with a private in-memory database.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let db = Database::connect_in_memory().await?;
        let app = piper::app(AppState::new(db, AppConfig::development()));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        })
    }

    /// Send a request under `/api` and return the status and JSON body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self
            .client
            .request(method, format!("{}/api{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, token, None).await
    }

    /// Bootstrap the instance as Acme and return the super-admin's token and id.
    pub async fn init(&self) -> Result<(String, String)> {
        let (status, body) = self
            .post(
                "/setup/init",
                None,
                json!({ "orgName": "Acme", "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "init failed: {status} {body}");

        let token = body["data"]["token"].as_str().context("missing token")?.to_string();
        let user_id = body["data"]["userId"].as_str().context("missing userId")?.to_string();
        Ok((token, user_id))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .post("/auth/login", None, json!({ "email": email, "password": password }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {status} {body}");
        Ok(body["data"]["token"].as_str().context("missing token")?.to_string())
    }

    /// Create an account through create-admin and return its id.
    pub async fn create_user(&self, token: &str, email: &str, role: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/setup/create-admin",
                Some(token),
                json!({ "email": email, "password": USER_PASSWORD, "role": role }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create user failed: {status} {body}");
        Ok(body["data"]["userId"].as_str().context("missing userId")?.to_string())
    }

    pub async fn create_team(&self, token: &str, name: &str) -> Result<String> {
        let (status, body) = self.post("/team", Some(token), json!({ "name": name })).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create team failed: {status} {body}");
        Ok(body["data"]["id"].as_str().context("missing team id")?.to_string())
    }
}
