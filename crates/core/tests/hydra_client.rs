//! HTTP client integration tests.
//!
//! The real `HydraClient` talks to an in-process axum server that mimics the
//! NZBHydra search API and NZB download endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use nzbsched_core::{
    testing::fixtures, FeedClient, HydraClient, HydraConfig, QueryError, QuerySession,
    RunOutcome, SaveOutcome, SearchOrchestrator, SearchRequest,
};

const API_KEY: &str = "s3cret";

async fn api(State(base): State<Arc<String>>, Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("apikey").map(String::as_str) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            "<error code=\"100\" description=\"Incorrect user credentials\"/>",
        )
            .into_response();
    }

    let body = match params.get("q").map(String::as_str) {
        Some("Show 1080p") => fixtures::feed(&[
            fixtures::item("Show.S01E01.1080p-GRP", &format!("{}/getnzb/1", base)),
            fixtures::item("", &format!("{}/redirect/2", base)),
            fixtures::item("Show.S01E03.1080p-GRP", &format!("{}/getnzb/broken", base)),
        ]),
        Some("Garbage") => "<rss><channel>".to_string(),
        _ => fixtures::feed(&[]),
    };
    body.into_response()
}

async fn getnzb(Path(id): Path<String>) -> Response {
    if id == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    format!("<nzb id=\"{}\"/>", id).into_response()
}

async fn redirect(Path(id): Path<String>) -> Redirect {
    Redirect::temporary(&format!("/files/Release.{}.nzb", id))
}

async fn file(Path(name): Path<String>) -> String {
    format!("<nzb file=\"{}\"/>", name)
}

/// Start the fake API and return its base URL.
async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let base = format!("http://{}", listener.local_addr().unwrap());

    let app = Router::new()
        .route("/api", get(api))
        .route("/getnzb/{id}", get(getnzb))
        .route("/redirect/{id}", get(redirect))
        .route("/files/{name}", get(file))
        .with_state(Arc::new(base.clone()));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn hydra_config(base: &str, api_key: &str) -> HydraConfig {
    HydraConfig {
        url: base.to_string(),
        api_key: api_key.to_string(),
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_search_and_save_over_http() {
    let base = spawn_server().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("terms.txt"), "Show\n").unwrap();
    std::fs::create_dir(dir.path().join("out")).unwrap();

    let mut config = fixtures::config(dir.path());
    config.hydra = hydra_config(&base, API_KEY);
    config.search.append_resolution = true;
    let client = Arc::new(HydraClient::new(&config.hydra).unwrap());

    let outcome = SearchOrchestrator::new(config, client)
        .run_at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        .await
        .unwrap();

    let RunOutcome::Completed(report) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(report.results(), 3);
    assert_eq!(report.saved(), 2);

    let out = dir.path().join("out");
    assert_eq!(
        std::fs::read_to_string(out.join("Show.S01E01.1080p-GRP.nzb")).unwrap(),
        "<nzb id=\"1\"/>"
    );
    assert_eq!(
        std::fs::read_to_string(out.join("Release.2.nzb")).unwrap(),
        "<nzb file=\"Release.2.nzb\"/>"
    );
    assert!(!out.join("Show.S01E03.1080p-GRP.nzb").exists());
}

#[tokio::test]
async fn test_wrong_api_key_records_status() {
    let base = spawn_server().await;
    let client = HydraClient::new(&hydra_config(&base, "wrong")).unwrap();

    let mut request = SearchRequest::from_config(&fixtures::config(std::path::Path::new("/tmp")));
    request.endpoint = base;
    request.api_key = "wrong".to_string();

    let mut session = QuerySession::new("Show 1080p");
    let count = session.execute(&client, &request).await.unwrap();

    assert_eq!(count, 0);
    assert_eq!(session.status_code(), Some(401));
}

#[tokio::test]
async fn test_malformed_feed_over_http() {
    let base = spawn_server().await;
    let client = HydraClient::new(&hydra_config(&base, API_KEY)).unwrap();

    let mut request = SearchRequest::from_config(&fixtures::config(std::path::Path::new("/tmp")));
    request.endpoint = base;
    request.api_key = API_KEY.to_string();

    let mut session = QuerySession::new("Garbage");
    let err = session.execute(&client, &request).await.unwrap_err();
    assert!(matches!(err, QueryError::Parse(_)));
}

#[tokio::test]
async fn test_download_failure_status() {
    let base = spawn_server().await;
    let client = HydraClient::new(&hydra_config(&base, API_KEY)).unwrap();
    let dir = TempDir::new().unwrap();

    let mut session = QuerySession::new("x");
    session
        .parse_results(&fixtures::feed(&[fixtures::item(
            "Broken",
            &format!("{}/getnzb/broken", base),
        )]))
        .unwrap();
    let summary = session.save_results(&client, dir.path()).await;

    assert!(matches!(
        &summary.outcomes[0],
        SaveOutcome::Failed { reason, .. } if reason == "HTTP 500"
    ));
    assert!(!dir.path().join("Broken.nzb").exists());
    assert_eq!(client.name(), "nzbhydra");
}
