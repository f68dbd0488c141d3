use std::sync::RwLock;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::errors::{extract_error_message, ApiError};
use crate::core::config::Settings;

/// Thin HTTP wrapper: base URL, bearer header, JSON in/out, error decoding.
/// Everything above this speaks typed payloads.
pub(crate) struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.api().base_url,
            Duration::from_secs(settings.api().timeout_seconds),
            Duration::from_secs(settings.api().connect_timeout_seconds),
        )
    }

    pub(crate) fn new(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub(crate) fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock") = token;
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.http.get(self.url(path))).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.http.put(self.url(path)).json(body)).await
    }

    pub(crate) async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.http.patch(self.url(path)).json(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.http.delete(self.url(path))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn bearer(&self) -> Option<String> {
        self.token.read().expect("token lock").clone()
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let builder = match self.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&raw)
                .map(|payload| extract_error_message(&payload))
                .unwrap_or_else(|_| {
                    if raw.trim().is_empty() { status.to_string() } else { raw.clone() }
                });
            return Err(ApiError::from_status(status, message));
        }

        // Ack endpoints may answer with an empty body.
        if raw.trim().is_empty() {
            return serde_json::from_value(Value::Null)
                .map_err(|err| ApiError::Decode(err.to_string()));
        }

        serde_json::from_str(&raw).map_err(|err| ApiError::Decode(format!("{err}: {raw}")))
    }
}
