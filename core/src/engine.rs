//! Request rewriting and response reshaping for legacy enterprise servers.
//!
//! # Design
//! `EnterpriseCompat` holds only its `Config`. Each rule is split into a
//! pre-dispatch half (`prepare`, which rewrites the request in place) and a
//! post-dispatch half (`complete`, which reshapes the outcome). Hosts that do
//! their own IO call the two halves around a single round-trip; everyone
//! else calls `intercept` with a `Dispatch` implementation.
//!
//! No rule issues a second request. Outcomes that no rule recognizes are
//! returned exactly as the transport produced them.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::Config;
use crate::dispatch::Dispatch;
use crate::error::RequestError;
use crate::http::{Outcome, RequestDescriptor, Response};
use crate::rule::Rule;

static REFERENCE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/repos/([^/]+)/([^/]+)/git/(?:ref|matching-refs)/(.*)$").unwrap()
});

static ORG_TEAM_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/orgs/[^/]+/teams/[^/]+").unwrap());

/// Compatibility layer between a current API client and an older server.
#[derive(Debug, Clone, Default)]
pub struct EnterpriseCompat {
    config: Config,
}

impl EnterpriseCompat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Classify `request` and apply the selected rule's request rewrite.
    ///
    /// Returns the rule that must later be passed to `complete`, or `None`
    /// when the request should be dispatched and returned untouched.
    pub fn prepare(&self, request: &mut RequestDescriptor) -> Option<Rule> {
        let rule = Rule::classify(request)?;
        debug!(
            rule = %rule,
            method = %request.method,
            url = %request.url,
            "Applying compatibility rule"
        );

        match rule {
            Rule::IssueLabels => move_labels_to_data(request),
            Rule::GetReference | Rule::ListReferences => {
                request.url = REFERENCE_PATH
                    .replace(&request.url, "/repos/${1}/${2}/git/refs/${3}")
                    .into_owned();
            }
            Rule::OrgTeams => {}
        }

        Some(rule)
    }

    /// Reshape the outcome of a request that `prepare` matched to `rule`.
    ///
    /// `request` is the request as it was dispatched, i.e. after `prepare`.
    pub fn complete(&self, rule: Rule, request: &RequestDescriptor, outcome: Outcome) -> Outcome {
        match rule {
            Rule::IssueLabels => outcome,
            Rule::GetReference => single_reference(request, outcome),
            Rule::ListReferences => reference_list(outcome),
            Rule::OrgTeams => self.org_teams(request, outcome),
        }
    }

    /// Run `request` through the compatibility rules, dispatching it exactly
    /// once through `next`.
    pub async fn intercept<D>(&self, next: &D, mut request: RequestDescriptor) -> Outcome
    where
        D: Dispatch + ?Sized,
    {
        let Some(rule) = self.prepare(&mut request) else {
            trace!(method = %request.method, url = %request.url, "Passing request through");
            return next.dispatch(request).await;
        };

        let dispatched = request.clone();
        let outcome = next.dispatch(request).await;
        self.complete(rule, &dispatched, outcome)
    }

    fn org_teams(&self, request: &RequestDescriptor, outcome: Outcome) -> Outcome {
        let error = match outcome {
            Err(error) if error.status == 404 => error,
            other => return other,
        };

        let on_enterprise = error
            .header(&self.config.enterprise_version_header)
            .is_some_and(|version| !version.is_empty());
        if !on_enterprise {
            return Err(error);
        }

        let legacy_url =
            ORG_TEAM_SEGMENT.replace(&request.url, NoExpand(&self.config.legacy_team_url));
        let message = format!(
            "\"{method} {url}\" is not supported in your GitHub Enterprise Server version. \
             Please replace with request(\"{method} {legacy_url}\", {{ team_id }})",
            method = request.method,
            url = request.url,
        );
        debug!(url = %request.url, %legacy_url, "Org team route unsupported by enterprise server");

        Err(RequestError::new(message, 404)
            .with_headers(error.headers)
            .with_request(request.clone()))
    }
}

/// The legacy labels endpoint takes the label list as the raw body.
fn move_labels_to_data(request: &mut RequestDescriptor) {
    if let Some(labels) = request.parameters.remove("labels") {
        request.parameters.insert("data".to_string(), labels);
    }
    if let Some(validate) = request.validate.as_mut() {
        validate.remove("labels");
    }
}

/// The refs listing answers a prefix with an array; a single-ref lookup must
/// not silently return several.
fn single_reference(request: &RequestDescriptor, outcome: Outcome) -> Outcome {
    let response = outcome?;
    if !response.data.is_array() {
        return Ok(response);
    }

    debug!(url = %request.url, "Reference lookup matched more than one ref");
    Err(RequestError::new(
        format!("More than one reference found at \"{}\"", request.url),
        404,
    )
    .with_headers(response.headers)
    .with_request(request.clone()))
}

/// The refs listing answers an exact match with a bare object and no match
/// with 404; a list operation wants an array in both cases.
fn reference_list(outcome: Outcome) -> Outcome {
    match outcome {
        Ok(mut response) => {
            if !response.data.is_array() {
                let single = response.data.take();
                response.data = Value::Array(vec![single]);
            }
            Ok(response)
        }
        Err(error) if error.status == 404 => {
            debug!("No matching references, returning empty list");
            Ok(Response {
                status: 200,
                headers: error.headers,
                data: Value::Array(Vec::new()),
            })
        }
        Err(error) => Err(error),
    }
}
