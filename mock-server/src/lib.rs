use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Version reported in `x-github-enterprise-version` on every response.
pub const ENTERPRISE_VERSION: &str = "2.19.0";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Everything the server knows. Refs are stored by full name
/// (`refs/heads/main`) and labels by `(owner, repo, issue number)`.
#[derive(Clone, Debug, Default)]
pub struct Store {
    pub refs: BTreeMap<String, String>,
    pub labels: BTreeMap<(String, String, u64), Vec<String>>,
    pub teams: Vec<Team>,
}

impl Store {
    /// A small repository with two feature branches sharing a prefix.
    pub fn seeded() -> Self {
        let refs = [
            ("refs/heads/main", "7638417db6d59f3c431d3e1f261cc637155684cd"),
            ("refs/heads/feature-a", "aa218f56b14c9653891f9e74264a383fa43fefbd"),
            ("refs/heads/feature-b", "612077ae6dffb4d2fbd8ce0cccaa58893b07b5ac"),
            ("refs/tags/v1.0.0", "c3d0be41ecbe669545ee3e94d31ed9a4bc91ee3c"),
        ]
        .into_iter()
        .map(|(name, sha)| (name.to_string(), sha.to_string()))
        .collect();

        Self {
            refs,
            labels: BTreeMap::new(),
            teams: vec![Team {
                id: 1,
                slug: "eng".to_string(),
                name: "Engineering".to_string(),
            }],
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/repos/{owner}/{repo}/git/refs/{*reference}", get(list_refs))
        .route(
            "/repos/{owner}/{repo}/issues/{number}/labels",
            post(add_labels).put(replace_labels),
        )
        .route("/orgs/{org}/teams/{team_slug}", get(get_org_team))
        .route("/teams/{team_id}", get(get_team))
        .with_state(db)
        .layer(middleware::map_response(enterprise_header))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn enterprise_header(mut response: Response) -> Response {
    response.headers_mut().insert(
        "x-github-enterprise-version",
        HeaderValue::from_static(ENTERPRISE_VERSION),
    );
    response
}

/// Legacy prefix listing: an exact name yields one object, a prefix yields
/// every ref under it, nothing yields 404.
async fn list_refs(
    State(db): State<Db>,
    Path((_owner, _repo, reference)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let store = db.read().await;
    let wanted = format!("refs/{reference}");

    if let Some(sha) = store.refs.get(&wanted) {
        return Ok(Json(to_reference(&wanted, sha)).into_response());
    }

    let matches: Vec<Reference> = store
        .refs
        .iter()
        .filter(|(name, _)| name.starts_with(&wanted))
        .map(|(name, sha)| to_reference(name, sha))
        .collect();
    debug!(%wanted, matches = matches.len(), "listing refs");

    if matches.is_empty() {
        return Err(api_error(StatusCode::NOT_FOUND, "Not Found"));
    }
    Ok(Json(matches).into_response())
}

fn to_reference(name: &str, sha: &str) -> Reference {
    Reference {
        name: name.to_string(),
        object: GitObject {
            sha: sha.to_string(),
            kind: "commit".to_string(),
        },
    }
}

/// Older releases only accept a bare array of label names as the body.
fn label_names(body: &Value) -> Result<Vec<String>, ApiError> {
    let invalid = || {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid request. Body must be an array of label names.",
        )
    };
    body.as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|name| name.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

async fn add_labels(
    State(db): State<Db>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
    Json(body): Json<Value>,
) -> Result<Json<Vec<Label>>, ApiError> {
    let names = label_names(&body)?;
    let mut store = db.write().await;
    let labels = store.labels.entry((owner, repo, number)).or_default();
    for name in names {
        if !labels.contains(&name) {
            labels.push(name);
        }
    }
    Ok(Json(to_labels(labels)))
}

async fn replace_labels(
    State(db): State<Db>,
    Path((owner, repo, number)): Path<(String, String, u64)>,
    Json(body): Json<Value>,
) -> Result<Json<Vec<Label>>, ApiError> {
    let names = label_names(&body)?;
    let mut store = db.write().await;
    let labels = store.labels.entry((owner, repo, number)).or_default();
    *labels = names;
    Ok(Json(to_labels(labels)))
}

fn to_labels(names: &[String]) -> Vec<Label> {
    names
        .iter()
        .map(|name| Label { name: name.clone() })
        .collect()
}

/// Org-scoped team routes do not exist on this release.
async fn get_org_team(Path((org, team_slug)): Path<(String, String)>) -> ApiError {
    debug!(%org, %team_slug, "org team route is not supported");
    api_error(StatusCode::NOT_FOUND, "Not Found")
}

async fn get_team(State(db): State<Db>, Path(team_id): Path<u64>) -> Result<Json<Team>, ApiError> {
    let store = db.read().await;
    store
        .teams
        .iter()
        .find(|team| team.id == team_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Not Found"))
}
