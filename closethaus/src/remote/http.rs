//! HTTP transport to the styling proxy

use super::{ClassifyRequest, ClassifyResponse, GenerateRequest, GenerateResponse, StylistApi};
use crate::config::{CLASSIFY_PATH, GENERATE_PATH};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub struct HttpStylistApi {
    client: Client,
    base_url: String,
}

impl HttpStylistApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ClosetHaus/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::info!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            tracing::warn!("{} returned {}: {}", url, status, message);
            return Err(AppError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

/// Prefer a JSON `error` field, then the raw body, then the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("HTTP error! status: {}", status.as_u16()),
    }
}

#[async_trait]
impl StylistApi for HttpStylistApi {
    async fn classify(&self, request: &ClassifyRequest) -> Result<ClassifyResponse> {
        self.post_json(CLASSIFY_PATH, request).await
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.post_json(GENERATE_PATH, request).await
    }
}
