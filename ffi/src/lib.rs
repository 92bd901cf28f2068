//! C-ABI wrapper around `enterprise-compat`.
//!
//! # Overview
//! Exposes the compatibility layer through `extern "C"` functions so a host
//! written in any language with a C FFI can keep its own HTTP stack: it asks
//! `compat_prepare` what to send, performs the round-trip, and hands the
//! outcome to `compat_complete` to get what its caller should see.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Requests, headers and response data travel as JSON C strings.
//! - The C caller owns all returned pointers and must call the matching
//!   `compat_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::sync::LazyLock;

use enterprise_compat::{Config, EnterpriseCompat, RequestDescriptor, Rule};

use types::*;

static VERSION: LazyLock<CString> =
    LazyLock::new(|| CString::new(enterprise_compat::VERSION).unwrap_or_default());

// ---------------------------------------------------------------------------
// Handle lifecycle
// ---------------------------------------------------------------------------

/// Create a compatibility layer.
///
/// `config_json` may be null for the default configuration. Returns null if
/// the configuration is not valid UTF-8, not valid JSON, fails validation,
/// or if an internal panic occurs. The caller must free the returned pointer
/// with `compat_free`.
#[unsafe(no_mangle)]
pub extern "C" fn compat_new(config_json: *const c_char) -> *mut FfiCompat {
    catch_unwind(|| {
        let config = match optional_str(config_json, "config_json") {
            Ok(None) => Config::default(),
            Ok(Some(json)) => match Config::from_json(json) {
                Ok(config) => config,
                Err(_) => return std::ptr::null_mut(),
            },
            Err(_) => return std::ptr::null_mut(),
        };
        let inner = EnterpriseCompat::with_config(config);
        Box::into_raw(Box::new(FfiCompat { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a handle created by `compat_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn compat_free(compat: *mut FfiCompat) {
    if !compat.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(compat) });
        });
    }
}

/// Library version as a static C string. Must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn compat_version() -> *const c_char {
    VERSION.as_ptr()
}

// ---------------------------------------------------------------------------
// Prepare / complete
// ---------------------------------------------------------------------------

/// Classify a request and apply its rewrite.
///
/// `request_json` is a serialized request descriptor
/// (`{"method":"GET","url":"/repos/o/r/git/ref/heads/main"}`). The result's
/// `request_json` is what must be sent over the wire.
/// The caller must free the result with `compat_free_prepared`.
#[unsafe(no_mangle)]
pub extern "C" fn compat_prepare(
    compat: *const FfiCompat,
    request_json: *const c_char,
) -> *mut FfiPrepared {
    catch_unwind(|| {
        if compat.is_null() {
            return FfiPrepared::from_error(InputError::NullArg("compat"));
        }
        let compat = unsafe { &*compat };
        let mut request = match required_str(request_json, "request_json").and_then(parse_request)
        {
            Ok(request) => request,
            Err(e) => return FfiPrepared::from_error(e),
        };
        let rule = compat.inner.prepare(&mut request);
        FfiPrepared::ok(rule, &request)
    })
    .unwrap_or_else(|_| FfiPrepared::panic("panic in compat_prepare"))
}

/// Reshape the transport outcome of a prepared request.
///
/// `rule` and `request_json` are the values returned by `compat_prepare`;
/// `outcome` describes what the transport produced. `rule` must be one of
/// the `FfiRule` discriminants. Outcomes the rule leaves alone, and every
/// outcome under `FfiRule::None`, are returned with the caller's headers and
/// body strings unchanged; `request_json` may then be null for `None`.
/// The caller must free the result with `compat_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn compat_complete(
    compat: *const FfiCompat,
    rule: FfiRule,
    request_json: *const c_char,
    outcome: *const FfiOutcome,
) -> *mut FfiCompatResult {
    catch_unwind(|| {
        if compat.is_null() {
            return FfiCompatResult::from_error(InputError::NullArg("compat"));
        }
        if outcome.is_null() {
            return FfiCompatResult::from_error(InputError::NullArg("outcome"));
        }
        let compat = unsafe { &*compat };
        let raw = unsafe { &*outcome };

        let rule: Option<Rule> = rule.into();
        let Some(rule) = rule else {
            return FfiCompatResult::echo(raw).unwrap_or_else(FfiCompatResult::from_error);
        };
        let outcome = match raw.to_core() {
            Ok(outcome) => outcome,
            Err(e) => return FfiCompatResult::from_error(e),
        };
        let request: RequestDescriptor =
            match required_str(request_json, "request_json").and_then(parse_request) {
                Ok(request) => request,
                Err(e) => return FfiCompatResult::from_error(e),
            };

        let completed = compat.inner.complete(rule, &request, outcome.clone());
        if completed == outcome {
            // untouched outcomes go back exactly as the transport produced them
            return FfiCompatResult::echo(raw).unwrap_or_else(FfiCompatResult::from_error);
        }
        FfiCompatResult::from_outcome(completed)
    })
    .unwrap_or_else(|_| FfiCompatResult::panic("panic in compat_complete"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiPrepared` returned by `compat_prepare`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn compat_free_prepared(prepared: *mut FfiPrepared) {
    if prepared.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let prepared = unsafe { Box::from_raw(prepared) };
        free_c_string(prepared.error_message);
        free_c_string(prepared.request_json);
    });
}

/// Free an `FfiCompatResult` returned by `compat_complete`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn compat_free_result(result: *mut FfiCompatResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.headers_json);
        free_c_string(result.body);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn compat_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
