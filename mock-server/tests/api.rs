use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ErrorBody, Label, Reference, Team, ENTERPRISE_VERSION};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_value(response: axum::response::Response) -> serde_json::Value {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- refs ---

#[tokio::test]
async fn exact_ref_returns_single_object() {
    let resp = app()
        .oneshot(get("/repos/o/r/git/refs/heads/main"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let reference: Reference = body_json(resp).await;
    assert_eq!(reference.name, "refs/heads/main");
}

#[tokio::test]
async fn ref_prefix_returns_array() {
    let resp = app()
        .oneshot(get("/repos/o/r/git/refs/heads/feature"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let refs: Vec<Reference> = body_json(resp).await;
    let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["refs/heads/feature-a", "refs/heads/feature-b"]);
}

#[tokio::test]
async fn unknown_ref_returns_404() {
    let resp = app()
        .oneshot(get("/repos/o/r/git/refs/heads/nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, "Not Found");
}

#[tokio::test]
async fn singular_ref_route_does_not_exist() {
    let resp = app()
        .oneshot(get("/repos/o/r/git/ref/heads/main"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- labels ---

#[tokio::test]
async fn add_labels_accepts_array_body() {
    let resp = app()
        .oneshot(json_request("POST", "/repos/o/r/issues/1/labels", r#"["bug","ui"]"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let labels: Vec<Label> = body_json(resp).await;
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].name, "bug");
}

#[tokio::test]
async fn add_labels_rejects_named_field() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/repos/o/r/issues/1/labels",
            r#"{"labels":["bug"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_value(resp).await;
    assert!(body["message"].as_str().unwrap().contains("array of label names"));
}

#[tokio::test]
async fn labels_add_then_replace() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/repos/o/r/issues/9/labels", r#"["bug"]"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // add; duplicates are ignored
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/repos/o/r/issues/9/labels", r#"["bug","ui"]"#))
        .await
        .unwrap();
    let labels: Vec<Label> = body_json(resp).await;
    let names: Vec<_> = labels.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["bug", "ui"]);

    // replace
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/repos/o/r/issues/9/labels", r#"["wontfix"]"#))
        .await
        .unwrap();
    let labels: Vec<Label> = body_json(resp).await;
    assert_eq!(labels, vec![Label { name: "wontfix".to_string() }]);
}

// --- teams ---

#[tokio::test]
async fn org_team_route_is_404_with_enterprise_header() {
    let resp = app().oneshot(get("/orgs/acme/teams/eng")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers()["x-github-enterprise-version"],
        ENTERPRISE_VERSION
    );
}

#[tokio::test]
async fn legacy_team_route_returns_team() {
    let resp = app().oneshot(get("/teams/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-github-enterprise-version"));
    let team: Team = body_json(resp).await;
    assert_eq!(team.slug, "eng");
}

#[tokio::test]
async fn unknown_team_returns_404() {
    let resp = app().oneshot(get("/teams/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
