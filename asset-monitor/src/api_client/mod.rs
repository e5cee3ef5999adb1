//! HTTP client for the monitor API.

pub mod types;

use anyhow::{Context, Result};

use crate::types::Alert;
use types::MonitorStatus;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7786";

pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v0{}", self.base_url, path)
    }

    pub async fn get_status(&self) -> Result<MonitorStatus> {
        self.http
            .get(self.url("/monitor"))
            .send()
            .await
            .context("failed to reach monitor API")?
            .error_for_status()?
            .json()
            .await
            .context("invalid monitor status response")
    }

    pub async fn get_alerts(&self, limit: usize) -> Result<Vec<Alert>> {
        self.http
            .get(self.url("/alerts"))
            .query(&[("limit", limit)])
            .send()
            .await
            .context("failed to reach monitor API")?
            .error_for_status()?
            .json()
            .await
            .context("invalid alerts response")
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
