use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Raw outcome of one HTTP exchange: the status plus the parsed JSON body.
///
/// Empty bodies arrive as [`Value::Null`]; non-JSON text bodies arrive as a
/// single [`Value::String`] so bare-string server errors flatten to one
/// message downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Minimal HTTP surface the console depends on.
///
/// Implementations resolve with [`ApiResponse`] only for 2xx statuses; any
/// other status becomes [`crate::ApiError::Http`] carrying the body.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse>;

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse>;

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse>;

    async fn delete(&self, path: &str) -> Result<ApiResponse>;
}
