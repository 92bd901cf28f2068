//! Request classification.
//!
//! Each `Rule` is one compatibility fix, identified by a pure predicate over
//! the request's method, URL and parameters. Rules are tried in `PRIORITY`
//! order and the first match wins, so a request is transformed by at most
//! one rule.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::http::{HttpMethod, RequestDescriptor};

static ISSUE_LABELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/repos/[^/]+/[^/]+/issues/[^/]+/labels").unwrap());

static GET_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/repos/[^/]+/[^/]+/git/ref/").unwrap());

static LIST_REFERENCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/repos/[^/]+/[^/]+/git/matching-refs/").unwrap());

static ORG_TEAMS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/orgs/[^/]+/teams").unwrap());

/// A compatibility fix the engine knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `POST|PUT .../issues/:number/labels` with a `labels` parameter. The
    /// label list is sent as the raw body instead of a named field.
    IssueLabels,
    /// `GET .../git/ref/*`, served from the `git/refs` listing.
    GetReference,
    /// `GET .../git/matching-refs/*`, served from the `git/refs` listing.
    ListReferences,
    /// Any request under `/orgs/:org/teams`.
    OrgTeams,
}

impl Rule {
    /// Evaluation order. The first rule whose predicate holds is selected.
    pub const PRIORITY: [Rule; 4] = [
        Rule::IssueLabels,
        Rule::GetReference,
        Rule::ListReferences,
        Rule::OrgTeams,
    ];

    /// Select the rule for `request`, if any.
    pub fn classify(request: &RequestDescriptor) -> Option<Rule> {
        Self::PRIORITY
            .into_iter()
            .find(|rule| rule.matches(request))
    }

    pub fn matches(&self, request: &RequestDescriptor) -> bool {
        match self {
            Rule::IssueLabels => {
                matches!(request.method, HttpMethod::Post | HttpMethod::Put)
                    && ISSUE_LABELS.is_match(&request.url)
                    && request.parameters.contains_key("labels")
            }
            Rule::GetReference => {
                request.method == HttpMethod::Get && GET_REFERENCE.is_match(&request.url)
            }
            Rule::ListReferences => {
                request.method == HttpMethod::Get && LIST_REFERENCES.is_match(&request.url)
            }
            Rule::OrgTeams => ORG_TEAMS.is_match(&request.url),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::IssueLabels => "issue-labels",
            Rule::GetReference => "get-reference",
            Rule::ListReferences => "list-references",
            Rule::OrgTeams => "org-teams",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
