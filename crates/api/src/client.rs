use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::normalize::{normalize, semantic_error, NormalizedError};
use crate::transport::{ApiResponse, ApiTransport};

/// HTTP verb for [`Client::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Safe-call wrapper over a transport.
///
/// Every failure mode comes back as `Err(NormalizedError)`: network faults,
/// non-2xx statuses, and application errors embedded in 2xx bodies. Callers
/// never see a transport error and never need a second inspection pass.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn ApiTransport>,
}

impl Client {
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Issue one request and apply the full normalization policy.
    ///
    /// `fallback` becomes the user-facing message when neither the body nor
    /// the status yields one.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        fallback: &str,
    ) -> std::result::Result<ApiResponse, NormalizedError> {
        let payload = body.unwrap_or(Value::Null);
        let result = match method {
            Method::Get => self.transport.get(path).await,
            Method::Post => self.transport.post(path, payload).await,
            Method::Patch => self.transport.patch(path, payload).await,
            Method::Delete => self.transport.delete(path).await,
        };
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                let normalized = normalize(&err, fallback);
                log::warn!("{method} {path} failed: {}", normalized.message);
                return Err(normalized);
            }
        };
        // A 2xx body can still carry an application error; that verdict
        // outranks the status.
        if let Some(embedded) = semantic_error(&response.body) {
            log::warn!(
                "{method} {path} returned {} with embedded error: {embedded}",
                response.status
            );
            return Err(NormalizedError::semantic(
                response.status,
                embedded,
                response.body,
            ));
        }
        Ok(response)
    }

    /// [`Client::send`] plus typed decoding of the response body.
    pub async fn send_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        fallback: &str,
    ) -> std::result::Result<T, NormalizedError> {
        let response = self.send(method, path, body, fallback).await?;
        serde_json::from_value(response.body).map_err(|err| {
            log::error!("{method} {path}: response decode failed: {err}");
            NormalizedError::local(fallback)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, Result};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<ApiResponse>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<ApiResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn next(&self) -> Result<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::ok(Value::Null)))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ApiTransport for ScriptedTransport {
        async fn get(&self, _path: &str) -> Result<ApiResponse> {
            self.next()
        }

        async fn post(&self, _path: &str, _body: Value) -> Result<ApiResponse> {
            self.next()
        }

        async fn patch(&self, _path: &str, _body: Value) -> Result<ApiResponse> {
            self.next()
        }

        async fn delete(&self, _path: &str) -> Result<ApiResponse> {
            self.next()
        }
    }

    #[tokio::test]
    async fn success_passes_the_body_through() {
        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::ok(json!({ "id": 1 })))]);
        let client = Client::new(transport.clone());

        let response = client
            .send(Method::Get, "admin/users/1", None, "failed")
            .await
            .unwrap();

        assert_eq!(response.body, json!({ "id": 1 }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn http_failure_comes_back_normalized() {
        let transport = ScriptedTransport::new(vec![Err(ApiError::Http {
            status: 403,
            body: json!({ "detail": "Admins only." }),
        })]);
        let client = Client::new(transport);

        let err = client
            .send(Method::Delete, "admin/users/1", None, "failed")
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(403));
        assert_eq!(err.message, "Admins only.");
        assert!(!err.network_error);
    }

    #[tokio::test]
    async fn embedded_error_in_a_2xx_body_is_a_failure() {
        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::ok(json!({
            "error": "Challenge is archived.",
            "code": "archived"
        })))]);
        let client = Client::new(transport);

        let err = client
            .send(Method::Post, "admin/reports/submissions", None, "failed")
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(200));
        assert_eq!(err.message, "Challenge is archived.");
        assert_eq!(err.code.as_deref(), Some("archived"));
    }

    #[tokio::test]
    async fn typed_decode_failure_falls_back_to_the_caller_message() {
        #[derive(serde::Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }

        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::ok(json!({ "id": 7 })))]);
        let client = Client::new(transport);

        let err = client
            .send_as::<Named>(Method::Get, "admin/users/7", None, "Could not load the user.")
            .await
            .unwrap_err();

        assert_eq!(err.message, "Could not load the user.");
        assert_eq!(err.status, None);
    }
}
