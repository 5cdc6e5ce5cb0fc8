use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::transport::{ApiResponse, ApiTransport};

/// Production transport backed by [`reqwest`].
///
/// Paths passed to the verbs are joined onto `base_url`; a session token, if
/// configured, rides along as a bearer header on every request.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::network(err.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn prepare(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<ApiResponse> {
        let response = self.prepare(request).send().await.map_err(request_failure)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(request_failure)?;
        let body = parse_body(&text);
        if (200..300).contains(&status) {
            Ok(ApiResponse { status, body })
        } else {
            Err(ApiError::Http { status, body })
        }
    }
}

fn request_failure(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::timeout(err.to_string())
    } else {
        ApiError::network(err.to_string())
    }
}

/// Empty bodies (204s, bare acks) become null; non-JSON text is kept whole
/// as a string body.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(self.client.get(self.url(path))).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.execute(self.client.post(self.url(path)).json(&body))
            .await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.execute(self.client.patch(self.url(path)).json(&body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute(self.client.delete(self.url(path))).await
    }
}
