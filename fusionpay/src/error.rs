//! Error types for the FusionPay client.

use http::StatusCode;

/// Errors that can occur while talking to the MoneyFusion gateway.
///
/// HTTP-level variants carry a `context` naming the call that failed
/// (e.g. `"POST payment"`), so a single error type can be shared by both
/// gateway calls without losing track of which one broke.
#[derive(Debug, thiserror::Error)]
pub enum FusionPayError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// HTTP transport error (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The gateway answered with a success status but the body is not the expected JSON.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The gateway answered with a non-success status. `body` is the raw response text.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read response body.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// A status check was requested with an empty payment token.
    #[error("payment token must not be empty")]
    EmptyToken,
    /// The payment token cannot be carried as a path segment (`.` or `..`).
    #[error("payment token `{token}` is not a valid path segment")]
    InvalidToken {
        /// The rejected token.
        token: String,
    },
    /// A return URL did not carry a `token` query parameter.
    #[error("return URL has no `token` query parameter")]
    MissingToken,
}

impl FusionPayError {
    /// Returns the HTTP status the gateway answered with, if this error is an [`FusionPayError::HttpStatus`].
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body of a rejected request, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}
