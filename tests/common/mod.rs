#![allow(dead_code)]

pub mod stores;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use lupus_api_rust::auth::Secrets;
use lupus_api_rust::config::AppConfig;
use lupus_api_rust::{app, AppState};

pub const WRITE_TOKEN: &str = "test-write-token";
pub const SHOW_ARCHIVED: &str = "test-show-archived";

pub fn secrets() -> Secrets {
    Secrets {
        write_token: Some(WRITE_TOKEN.to_string()),
        show_archived: Some(SHOW_ARCHIVED.to_string()),
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve the real router on a free port, backed by empty in-memory tables
    pub async fn start() -> Result<Self> {
        Self::start_with(AppState::in_memory(secrets())).await
    }

    /// Serve the real router over caller-supplied stores
    pub async fn start_with(state: AppState) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig::from_lookup(|_| None);
        let router = app(state, &config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).header("Token", WRITE_TOKEN)
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path)).header("Token", WRITE_TOKEN)
    }

    /// POST a JSON body with the write token and return the single created record
    pub async fn create(&self, path: &str, body: Value) -> Result<Value> {
        let res = self.post(path).json(&body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "create failed: {}", res.status());
        let mut records = res.json::<Vec<Value>>().await?;
        anyhow::ensure!(records.len() == 1, "expected one record, got {:?}", records);
        Ok(records.remove(0))
    }

    pub async fn list(&self, path: &str) -> Result<Vec<Value>> {
        let res = self.get(path).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "list failed: {}", res.status());
        Ok(res.json::<Vec<Value>>().await?)
    }
}
