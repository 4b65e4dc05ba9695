//! HTTP API for the table service.
//!
//! DESIGN
//! ======
//! [`TablesApi`] is the seam the page model talks through. [`HttpApi`] is
//! the `reqwest` implementation; tests substitute a scripted double.
//! Response decoding lives in [`decode_response`] so it can be tested
//! without a server.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError::Status`] carrying the server's
//! `error` message when the body has one, otherwise the raw body.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::config::ClientConfig;
use super::types::{AddTableRequest, DrawResponse, EntriesResponse, ErrorResponse, MessageResponse, TableEntry, TablesResponse};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Operations the page issues against the table service.
#[async_trait::async_trait]
pub trait TablesApi: Send + Sync {
    /// `GET /tables`, in server order.
    async fn tables(&self) -> Result<Vec<String>, ApiError>;

    /// `GET /draw/{table}`; the opaque `result` value.
    async fn draw(&self, table: &str) -> Result<Value, ApiError>;

    /// `GET /formatted_draw/{table}`; the opaque `result` value.
    async fn formatted_draw(&self, table: &str) -> Result<Value, ApiError>;

    /// `GET /table_entries/{table}`.
    async fn table_entries(&self, table: &str) -> Result<Vec<TableEntry>, ApiError>;

    /// `POST /addTable` with `{ "table": table }`; the server's message.
    async fn add_table(&self, table: Value) -> Result<String, ApiError>;

    /// `GET /healthz`.
    async fn health(&self) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpApi {
    http: reqwest::Client,
    base: Url,
}

impl HttpApi {
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client
    /// fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = endpoint(&self.base, segments)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    decode_response(status, &text)
}

#[async_trait::async_trait]
impl TablesApi for HttpApi {
    async fn tables(&self) -> Result<Vec<String>, ApiError> {
        let body: TablesResponse = self.get(&["tables"]).await?;
        Ok(body.tables)
    }

    async fn draw(&self, table: &str) -> Result<Value, ApiError> {
        let body: DrawResponse = self.get(&["draw", table]).await?;
        Ok(body.result)
    }

    async fn formatted_draw(&self, table: &str) -> Result<Value, ApiError> {
        let body: DrawResponse = self.get(&["formatted_draw", table]).await?;
        Ok(body.result)
    }

    async fn table_entries(&self, table: &str) -> Result<Vec<TableEntry>, ApiError> {
        let body: EntriesResponse = self.get(&["table_entries", table]).await?;
        Ok(body.entries)
    }

    async fn add_table(&self, table: Value) -> Result<String, ApiError> {
        let url = endpoint(&self.base, &["addTable"])?;
        let response = self
            .http
            .post(url)
            .json(&AddTableRequest { table })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let body: MessageResponse = read_response(response).await?;
        Ok(body.message)
    }

    async fn health(&self) -> Result<(), ApiError> {
        let url = endpoint(&self.base, &["healthz"])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status { status: status.as_u16(), message: "health check failed".to_owned() })
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Append path segments to `base`, percent-encoding each one so table
/// names with spaces or slashes stay a single segment.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn decode_response<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorResponse>(text).map_or_else(|_| text.to_owned(), |body| body.error);
        return Err(ApiError::Status { status, message });
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
