//! Request and response types exchanged with the host transport.
//!
//! # Design
//! These types describe an API call and its result as plain data. The engine
//! reads and rewrites `RequestDescriptor` values and reshapes `Response`
//! values, but never performs the network round-trip itself: the host's
//! transport does, either behind the `Dispatch` trait or between
//! `EnterpriseCompat::prepare` and `EnterpriseCompat::complete`.
//!
//! Everything derives serde so descriptors can cross the FFI boundary and be
//! stored in JSON test vectors.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// Header names mapped to values. Lookups go through `find_header`, which
/// ignores ASCII case.
pub type Headers = BTreeMap<String, String>;

/// Result of one dispatched request: a `Response` or a `RequestError`.
pub type Outcome = Result<Response, RequestError>;

/// HTTP method for a request.
///
/// The verbs the rules inspect have their own variants. Any other method is
/// kept verbatim in `Other` so unmatched requests reach the transport as sent.
/// Known verbs parse case-insensitively and serialize upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(method) => method,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for HttpMethod {
    fn from(method: String) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "OPTIONS" => HttpMethod::Options,
            _ => HttpMethod::Other(method),
        }
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Other(method) => method,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.to_string().into())
    }
}

/// An outgoing API call described as plain data.
///
/// `url` may be absolute or a route template with placeholders
/// (`/repos/:owner/:repo/issues/:number/labels`). `parameters` holds path,
/// query and body fields alike; the transport decides where each one goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Headers,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Per-field validation rules attached by the host, keyed by parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<Map<String, Value>>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            parameters: Map::new(),
            validate: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_validation(mut self, field: impl Into<String>, rule: Value) -> Self {
        self.validate
            .get_or_insert_with(Map::new)
            .insert(field.into(), rule);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A successful response as handed back by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub data: Value,
}

impl Response {
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            status,
            headers: Headers::new(),
            data,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Case-insensitive header lookup.
pub(crate) fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
