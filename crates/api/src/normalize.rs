use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::ApiError;

/// Body keys whose messages surface without a field prefix.
const BARE_MESSAGE_KEYS: [&str; 4] = ["error", "detail", "message", "non_field_errors"];

/// Keys checked, in order, when sniffing a success body for an embedded
/// application error.
const SEMANTIC_KEYS: [&str; 3] = ["error", "detail", "message"];

pub const NETWORK_MESSAGE: &str = "Network error. Check your connection and try again.";
pub const TIMEOUT_MESSAGE: &str = "The request timed out. Try again.";

/// Uniform error shape every failure is reduced to before it reaches a
/// screen. Implements [`std::error::Error`] so it can travel through `?`,
/// but screens treat it as data: no variant matching, just fields.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct NormalizedError {
    /// HTTP status, when a response was received at all.
    pub status: Option<u16>,
    /// Machine-readable code lifted from the body, when the server sent one.
    pub code: Option<String>,
    /// Primary user-facing message.
    pub message: String,
    /// Itemized field messages flattened out of the body.
    pub messages: Vec<String>,
    pub network_error: bool,
    /// Set for 401 responses so callers can route to re-authentication.
    pub auth_error: bool,
    /// Original body, kept for diagnostics.
    pub raw: Value,
}

impl NormalizedError {
    /// Failure that never touched the network, e.g. a local precondition.
    #[must_use]
    pub fn local(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: None,
            code: None,
            messages: vec![message.clone()],
            message,
            network_error: false,
            auth_error: false,
            raw: Value::Null,
        }
    }

    /// Application-level failure embedded in an otherwise-successful body.
    #[must_use]
    pub fn semantic(status: u16, message: String, raw: Value) -> Self {
        let code = extract_code(&raw);
        Self {
            status: Some(status),
            code,
            messages: vec![message.clone()],
            message,
            network_error: false,
            auth_error: false,
            raw,
        }
    }
}

/// Collapse a transport failure into the uniform error shape.
///
/// `fallback` is the caller-supplied message of last resort, used only when
/// the body yields no messages and the status has no default either.
#[must_use]
pub fn normalize(err: &ApiError, fallback: &str) -> NormalizedError {
    match err {
        ApiError::Network { message, timed_out } => {
            log::debug!("network failure: {message}");
            NormalizedError {
                status: None,
                code: None,
                message: if *timed_out { TIMEOUT_MESSAGE } else { NETWORK_MESSAGE }.to_string(),
                messages: Vec::new(),
                network_error: true,
                auth_error: false,
                raw: Value::Null,
            }
        }
        ApiError::Http { status, body } => {
            let messages = flatten_messages(body);
            let message = if messages.is_empty() {
                status_default(*status).unwrap_or(fallback).to_string()
            } else {
                messages.join(" \u{2022} ")
            };
            NormalizedError {
                status: Some(*status),
                code: extract_code(body),
                message,
                messages,
                network_error: false,
                auth_error: *status == 401,
                raw: body.clone(),
            }
        }
    }
}

/// Flatten a failure body into its ordered list of user-facing messages.
///
/// Strings count verbatim, arrays and objects recurse. At the top level the
/// well-known keys in [`BARE_MESSAGE_KEYS`] contribute unprefixed; any other
/// key prefixes its messages as `"<key>: <message>"`, one level deep only.
#[must_use]
pub fn flatten_messages(body: &Value) -> Vec<String> {
    let mut out = Vec::new();
    match body {
        Value::Object(map) => {
            for (key, value) in map {
                if BARE_MESSAGE_KEYS.contains(&key.as_str()) {
                    collect_leaves(value, &mut out);
                } else {
                    let mut nested = Vec::new();
                    collect_leaves(value, &mut nested);
                    out.extend(nested.into_iter().map(|msg| format!("{key}: {msg}")));
                }
            }
        }
        other => collect_leaves(other, &mut out),
    }
    out
}

/// Error text embedded in a successful response body, if any.
///
/// An `error`/`detail`/`message` field in a 2xx body is authoritative over
/// the status: callers must treat a hit as a failed operation.
#[must_use]
pub fn semantic_error(body: &Value) -> Option<String> {
    let map = body.as_object()?;
    for key in SEMANTIC_KEYS {
        if let Some(value) = map.get(key) {
            let mut leaves = Vec::new();
            collect_leaves(value, &mut leaves);
            if let Some(first) = leaves.into_iter().next() {
                return Some(first);
            }
        }
    }
    None
}

/// Depth-first message collection. Only strings become messages; numbers,
/// booleans and nulls are skipped as noise.
fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            if !text.trim().is_empty() {
                out.push(text.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
        Value::Object(map) => {
            for nested in map.values() {
                collect_leaves(nested, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn extract_code(body: &Value) -> Option<String> {
    body.get("code")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn status_default(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("Your session has expired. Sign in again."),
        403 => Some("You do not have permission to do that."),
        404 => Some("The requested resource was not found."),
        409 => Some("The request conflicts with the current state. Reload and retry."),
        429 => Some("Too many requests. Wait a moment and retry."),
        500..=599 => Some("The server ran into a problem. Try again later."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn network_failure_maps_to_the_fixed_message() {
        let err = ApiError::network("connection refused");
        let normalized = normalize(&err, "fallback");

        assert_eq!(normalized.message, NETWORK_MESSAGE);
        assert_eq!(normalized.status, None);
        assert!(normalized.network_error);
        assert!(!normalized.auth_error);
        assert!(normalized.messages.is_empty());
    }

    #[test]
    fn timeout_gets_its_own_message() {
        let err = ApiError::timeout("deadline elapsed");
        let normalized = normalize(&err, "fallback");

        assert_eq!(normalized.message, TIMEOUT_MESSAGE);
        assert!(normalized.network_error);
    }

    #[test]
    fn known_keys_surface_unprefixed_and_field_keys_prefixed() {
        let err = ApiError::Http {
            status: 400,
            body: json!({
                "detail": "Validation failed.",
                "username": ["This username is already taken."]
            }),
        };
        let normalized = normalize(&err, "fallback");

        assert_eq!(
            normalized.messages,
            vec![
                "Validation failed.".to_string(),
                "username: This username is already taken.".to_string(),
            ]
        );
        assert_eq!(
            normalized.message,
            "Validation failed. \u{2022} username: This username is already taken."
        );
        assert_eq!(normalized.status, Some(400));
    }

    #[test]
    fn field_prefixes_stay_one_level_deep() {
        let body = json!({
            "profile": { "email": ["Enter a valid address.", "Too long."] }
        });

        assert_eq!(
            flatten_messages(&body),
            vec![
                "profile: Enter a valid address.".to_string(),
                "profile: Too long.".to_string(),
            ]
        );
    }

    #[test]
    fn bare_string_body_is_one_message() {
        let body = json!("Service rebooting");

        assert_eq!(flatten_messages(&body), vec!["Service rebooting".to_string()]);
    }

    #[test]
    fn scalars_and_empty_strings_are_skipped() {
        let body = json!({
            "detail": ["", "Kept.", 42, true, null]
        });

        assert_eq!(flatten_messages(&body), vec!["Kept.".to_string()]);
    }

    #[test]
    fn status_defaults_cover_message_free_bodies() {
        for (status, needle) in [
            (401, "session"),
            (403, "permission"),
            (404, "not found"),
            (409, "conflicts"),
            (429, "Too many requests"),
            (500, "server"),
            (503, "server"),
        ] {
            let err = ApiError::Http {
                status,
                body: json!({}),
            };
            let normalized = normalize(&err, "fallback");
            assert!(
                normalized.message.contains(needle),
                "status {status}: {}",
                normalized.message
            );
        }
    }

    #[test]
    fn unknown_status_without_messages_uses_the_caller_fallback() {
        let err = ApiError::Http {
            status: 418,
            body: json!({}),
        };
        let normalized = normalize(&err, "The report could not be generated.");

        assert_eq!(normalized.message, "The report could not be generated.");
    }

    #[test]
    fn auth_flag_rides_on_401_only() {
        let unauthorized = ApiError::Http {
            status: 401,
            body: json!({ "detail": "Token expired.", "code": "token_expired" }),
        };
        let forbidden = ApiError::Http {
            status: 403,
            body: json!({}),
        };

        let normalized = normalize(&unauthorized, "fallback");
        assert!(normalized.auth_error);
        assert_eq!(normalized.code.as_deref(), Some("token_expired"));
        assert_eq!(normalized.message, "Token expired.");

        assert!(!normalize(&forbidden, "fallback").auth_error);
    }

    #[test]
    fn semantic_error_reads_embedded_failures_only() {
        assert_eq!(
            semantic_error(&json!({ "error": "Challenge is archived." })),
            Some("Challenge is archived.".to_string())
        );
        assert_eq!(
            semantic_error(&json!({ "detail": ["First", "Second"] })),
            Some("First".to_string())
        );
        assert_eq!(semantic_error(&json!({ "rows": [], "count": 0 })), None);
        assert_eq!(semantic_error(&json!([1, 2, 3])), None);
        assert_eq!(semantic_error(&json!({ "error": "" })), None);
    }

    #[test]
    fn local_errors_carry_no_status_or_raw_body() {
        let normalized = NormalizedError::local("Pick a challenge first.");

        assert_eq!(normalized.status, None);
        assert_eq!(normalized.messages, vec!["Pick a challenge first.".to_string()]);
        assert!(!normalized.network_error);
        assert_eq!(normalized.raw, Value::Null);
    }
}
