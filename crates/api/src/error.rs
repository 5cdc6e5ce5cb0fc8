use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Transport-level failure, before any normalization is applied.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("Network failure: {message}")]
    Network { message: String, timed_out: bool },

    /// The server answered with a non-2xx status. The parsed body rides
    /// along so the normalizer can flatten it.
    #[error("HTTP {status}")]
    Http {
        status: u16,
        body: serde_json::Value,
    },
}

impl ApiError {
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
            timed_out: true,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network { .. } => None,
        }
    }
}
