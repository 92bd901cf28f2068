//! Compatibility layer that lets a current GitHub API client talk to older
//! GitHub Enterprise Server releases.
//!
//! # Overview
//! The host client routes each outgoing request through
//! `EnterpriseCompat`. A fixed set of rules recognizes requests the legacy
//! server handles differently, rewrites them before dispatch and reshapes
//! what comes back:
//!
//! - issue label updates send the label list as the raw body,
//! - single and matching reference lookups are served from `git/refs`,
//! - org-scoped team routes that 404 on enterprise get a pointer to the
//!   legacy `/teams/:team_id` route.
//!
//! # Design
//! - The core never touches the network. Either hand `intercept` a
//!   `Dispatch` implementation, or call `prepare` and `complete` around your
//!   own round-trip (host-does-IO).
//! - At most one rule applies per request and every request is dispatched
//!   exactly once.
//! - No state survives a call; `EnterpriseCompat` holds only its `Config`.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod http;
pub mod rule;

pub use config::Config;
pub use dispatch::Dispatch;
pub use engine::EnterpriseCompat;
pub use error::{ConfigError, RequestError};
pub use http::{Headers, HttpMethod, Outcome, RequestDescriptor, Response};
pub use rule::Rule;

/// Crate version, exposed for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
