mod client;
mod error;
mod http;
mod normalize;
mod transport;

pub use client::{Client, Method};
pub use error::{ApiError, Result};
pub use http::HttpTransport;
pub use normalize::{flatten_messages, normalize, semantic_error, NormalizedError};
pub use transport::{ApiResponse, ApiTransport};
