//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests, headers and response data cross the boundary as JSON C strings,
//! so the C side needs no knowledge of the descriptor layout. Status codes,
//! flags and the rule tag are plain scalars. Conversion helpers live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use enterprise_compat::{
    EnterpriseCompat, Headers, Outcome, RequestDescriptor, RequestError, Response, Rule,
};
use serde_json::Value;

/// Opaque handle to an `EnterpriseCompat`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiCompat {
    pub(crate) inner: EnterpriseCompat,
}

// ---------------------------------------------------------------------------
// Rule tag
// ---------------------------------------------------------------------------

/// The rule selected by `compat_prepare`, handed back to `compat_complete`.
/// `None` means the request is passed through untouched.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiRule {
    None = 0,
    IssueLabels = 1,
    GetReference = 2,
    ListReferences = 3,
    OrgTeams = 4,
}

impl From<Option<Rule>> for FfiRule {
    fn from(rule: Option<Rule>) -> Self {
        match rule {
            None => FfiRule::None,
            Some(Rule::IssueLabels) => FfiRule::IssueLabels,
            Some(Rule::GetReference) => FfiRule::GetReference,
            Some(Rule::ListReferences) => FfiRule::ListReferences,
            Some(Rule::OrgTeams) => FfiRule::OrgTeams,
        }
    }
}

impl From<FfiRule> for Option<Rule> {
    fn from(rule: FfiRule) -> Self {
        match rule {
            FfiRule::None => None,
            FfiRule::IssueLabels => Some(Rule::IssueLabels),
            FfiRule::GetReference => Some(Rule::GetReference),
            FfiRule::ListReferences => Some(Rule::ListReferences),
            FfiRule::OrgTeams => Some(Rule::OrgTeams),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiPrepared` and `FfiCompatResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    InvalidUtf8 = 2,
    InvalidJson = 3,
    Panic = 4,
}

/// Problems with caller-supplied arguments.
#[derive(Debug, thiserror::Error)]
pub(crate) enum InputError {
    #[error("null argument: {0}")]
    NullArg(&'static str),

    #[error("argument is not valid UTF-8: {0}")]
    InvalidUtf8(&'static str),

    #[error("argument {0} is not valid JSON: {1}")]
    InvalidJson(&'static str, #[source] serde_json::Error),
}

impl InputError {
    fn code(&self) -> FfiErrorCode {
        match self {
            InputError::NullArg(_) => FfiErrorCode::NullArg,
            InputError::InvalidUtf8(_) => FfiErrorCode::InvalidUtf8,
            InputError::InvalidJson(..) => FfiErrorCode::InvalidJson,
        }
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Borrow a required C string argument.
pub(crate) fn required_str<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str, InputError> {
    optional_str(ptr, name)?.ok_or(InputError::NullArg(name))
}

/// Borrow an optional C string argument; null maps to `None`.
pub(crate) fn optional_str<'a>(
    ptr: *const c_char,
    name: &'static str,
) -> Result<Option<&'a str>, InputError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(Some)
        .map_err(|_| InputError::InvalidUtf8(name))
}

pub(crate) fn parse_request(json: &str) -> Result<RequestDescriptor, InputError> {
    serde_json::from_str(json).map_err(|e| InputError::InvalidJson("request_json", e))
}

/// Hand ownership of a Rust string to C. Interior NULs are dropped.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Outcome input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// The transport's outcome, described by the C caller after executing the
/// prepared request. The FFI layer reads but does not free these fields.
///
/// `headers_json` is a JSON object of header names to values and may be
/// null. For a success `body` is the response data as JSON (null or empty
/// means no data); for a failure it is the error message.
#[repr(C)]
pub struct FfiOutcome {
    pub status: u16,
    pub failed: bool,
    pub headers_json: *const c_char,
    pub body: *const c_char,
}

impl FfiOutcome {
    pub(crate) fn to_core(&self) -> Result<Outcome, InputError> {
        let headers: Headers = match optional_str(self.headers_json, "headers_json")? {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(json)
                .map_err(|e| InputError::InvalidJson("headers_json", e))?,
            _ => Headers::new(),
        };
        let body = optional_str(self.body, "body")?.unwrap_or("");

        if self.failed {
            return Ok(Err(RequestError::new(body, self.status).with_headers(headers)));
        }

        let data = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body).map_err(|e| InputError::InvalidJson("body", e))?
        };
        Ok(Ok(Response {
            status: self.status,
            headers,
            data,
        }))
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of `compat_prepare`.
///
/// On success `request_json` holds the request to dispatch (possibly
/// rewritten) and `rule` must be passed to `compat_complete` together with
/// that same JSON.
#[repr(C)]
pub struct FfiPrepared {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub rule: FfiRule,
    pub request_json: *mut c_char,
}

impl FfiPrepared {
    pub(crate) fn ok(rule: Option<Rule>, request: &RequestDescriptor) -> *mut Self {
        let json = serde_json::to_string(request).unwrap_or_default();
        Box::into_raw(Box::new(FfiPrepared {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            rule: rule.into(),
            request_json: into_c_string(json),
        }))
    }

    pub(crate) fn from_error(err: InputError) -> *mut Self {
        Self::failure(err.code(), err.to_string())
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiPrepared {
            error_code,
            error_message: into_c_string(msg),
            rule: FfiRule::None,
            request_json: std::ptr::null_mut(),
        }))
    }
}

/// Result envelope for `compat_complete`.
///
/// When `error_code` is `Ok` the remaining fields describe the outcome the
/// caller must see: `failed` selects between a success (`body` is the data
/// as JSON) and a failure (`body` is the message). Otherwise
/// `error_message` explains what was wrong with the arguments.
#[repr(C)]
pub struct FfiCompatResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub status: u16,
    pub failed: bool,
    pub headers_json: *mut c_char,
    pub body: *mut c_char,
}

impl FfiCompatResult {
    pub(crate) fn from_outcome(outcome: Outcome) -> *mut Self {
        let (status, failed, headers, body) = match outcome {
            Ok(response) => (response.status, false, response.headers, response.data.to_string()),
            Err(error) => (error.status, true, error.headers, error.message),
        };
        let headers_json = serde_json::to_string(&headers).unwrap_or_else(|_| "{}".to_string());
        Self::completed(status, failed, headers_json, body)
    }

    /// Hand the caller's outcome back byte for byte. Null headers become `{}`
    /// and a null body becomes empty.
    pub(crate) fn echo(outcome: &FfiOutcome) -> Result<*mut Self, InputError> {
        let headers_json = optional_str(outcome.headers_json, "headers_json")?.unwrap_or("{}");
        let body = optional_str(outcome.body, "body")?.unwrap_or("");
        Ok(Self::completed(
            outcome.status,
            outcome.failed,
            headers_json.to_string(),
            body.to_string(),
        ))
    }

    fn completed(status: u16, failed: bool, headers_json: String, body: String) -> *mut Self {
        Box::into_raw(Box::new(FfiCompatResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            status,
            failed,
            headers_json: into_c_string(headers_json),
            body: into_c_string(body),
        }))
    }

    pub(crate) fn from_error(err: InputError) -> *mut Self {
        Self::failure(err.code(), err.to_string())
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiCompatResult {
            error_code,
            error_message: into_c_string(msg),
            status: 0,
            failed: false,
            headers_json: std::ptr::null_mut(),
            body: std::ptr::null_mut(),
        }))
    }
}
