//! Error types for the compatibility layer.
//!
//! # Design
//! Transport failures and failures synthesized by the engine share one
//! shape, `RequestError`, carrying status, headers and message. A caller
//! therefore handles "the server said 404" and "the engine decided this is a
//! 404" through the same fields.

use crate::http::{find_header, Headers, RequestDescriptor};

/// A failed API call, either reported by the transport or synthesized by the
/// engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    pub status: u16,
    pub headers: Headers,
    pub message: String,
    /// The request that produced this failure, as it was dispatched.
    pub request: Option<Box<RequestDescriptor>>,
}

impl RequestError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            message: message.into(),
            request: None,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_request(mut self, request: RequestDescriptor) -> Self {
        self.request = Some(Box::new(request));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Errors raised while loading a `Config`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("enterprise version header name must not be empty")]
    EmptyHeaderName,

    #[error("legacy team URL must contain the :team_id placeholder, got {0:?}")]
    MissingTeamIdPlaceholder(String),
}
