use scholarsearch::client::PublicationClient;
use scholarsearch::config::ClientConfig;
use scholarsearch::coordinator::FetchCoordinator;
use scholarsearch::server::{router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

type TestResult = Result<(), Box<dyn std::error::Error>>;

// ── Test helpers ───────────────────────────────────────────────────────────

fn publication(title: &str, year: i32, author: &str) -> Value {
    json!({
        "source": null,
        "title": title,
        "year": year,
        "authors": [author],
        "link": format!("https://example.org/{}", title.to_lowercase()),
        "abstract": format!("Abstract of {title}")
    })
}

fn service_body() -> Value {
    let einstein: Vec<Value> = (0..12)
        .map(|i| publication(&format!("E{i}"), 1900 + i, "A. Einstein"))
        .collect();
    json!({
        "A. Einstein": {"info": {"name": "A. Einstein"}, "data": einstein},
        "N. Bohr": {"info": {}, "data": [publication("B0", 1922, "N. Bohr")]}
    })
}

/// Starts the publication service mock and the app; returns the app base URL.
async fn start_app(service: &MockServer) -> Result<String, Box<dyn std::error::Error>> {
    let client = PublicationClient::new(&ClientConfig {
        api_url: service.uri(),
        api_key: "test-key".to_string(),
        timeout: Some(Duration::from_secs(5)),
    })?;
    let state = Arc::new(AppState::new(FetchCoordinator::new(client)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });
    Ok(format!("http://{addr}"))
}

async fn mount_service(service: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(service_body()))
        .mount(service)
        .await;
}

// ── search & browse ────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() -> TestResult {
    let service = MockServer::start().await;
    let app = start_app(&service).await?;
    let body = reqwest::get(format!("{app}/health")).await?.text().await?;
    assert_eq!(body, "OK");
    Ok(())
}

#[tokio::test]
async fn search_then_filter_and_paginate() -> TestResult {
    let service = MockServer::start().await;
    mount_service(&service).await;
    let app = start_app(&service).await?;
    let http = reqwest::Client::new();

    let res: Value = http
        .post(format!("{app}/search"))
        .json(&json!({"query": "A. Einstein, N. Bohr"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(res["status"], "success");
    assert_eq!(res["session"]["total_publications"], 13);

    let page: Value = http.get(format!("{app}/publications")).send().await?.json().await?;
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(10));

    let summary: Value = http
        .patch(format!("{app}/criteria"))
        .json(&json!({"sort_order": "descending", "start_year": 1910}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(summary["matching"], 3);

    let page: Value = http.get(format!("{app}/publications")).send().await?.json().await?;
    let titles: Vec<&str> = page["items"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|p| p["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["B0", "E11", "E10"]);

    let summary: Value = http
        .post(format!("{app}/authors/toggle"))
        .json(&json!({"author": "N. Bohr"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(summary["matching"], 2);

    let summary: Value = http
        .post(format!("{app}/criteria/clear"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(summary["matching"], 13);
    assert_eq!(summary["criteria"]["sort_order"], "descending");
    Ok(())
}

#[tokio::test]
async fn short_query_is_rejected() -> TestResult {
    let service = MockServer::start().await;
    let app = start_app(&service).await?;

    let res = reqwest::Client::new()
        .post(format!("{app}/search"))
        .json(&json!({"query": "ab"}))
        .send()
        .await?;
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn service_failure_shows_empty_state() -> TestResult {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&service)
        .await;
    let app = start_app(&service).await?;
    let http = reqwest::Client::new();

    let res: Value = http
        .post(format!("{app}/search"))
        .json(&json!({"query": "A. Einstein"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(res["status"], "failed");
    assert_eq!(
        res["message"],
        "No publications found matching your search criteria."
    );

    let page: Value = http.get(format!("{app}/publications")).send().await?.json().await?;
    assert_eq!(page["total_count"], 0);
    assert_eq!(page["total_pages"], 1);
    Ok(())
}

// ── import & export ────────────────────────────────────────────────────────

#[tokio::test]
async fn import_csv_runs_search() -> TestResult {
    let service = MockServer::start().await;
    mount_service(&service).await;
    let app = start_app(&service).await?;

    let res: Value = reqwest::Client::new()
        .post(format!("{app}/import?format=csv"))
        .body("Author\nA. Einstein\nN. Bohr\n")
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(res["status"], "success");

    let requests = service.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let authors: Vec<String> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "author")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(authors, vec!["A. Einstein", "N. Bohr"]);
    Ok(())
}

#[tokio::test]
async fn export_downloads_filtered_list() -> TestResult {
    let service = MockServer::start().await;
    mount_service(&service).await;
    let app = start_app(&service).await?;
    let http = reqwest::Client::new();

    http.post(format!("{app}/search"))
        .json(&json!({"query": "A. Einstein, N. Bohr"}))
        .send()
        .await?;
    http.patch(format!("{app}/criteria"))
        .json(&json!({"search_term": "bohr", "page": 1}))
        .send()
        .await?;

    let res = http.get(format!("{app}/export/bib")).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let disposition = res
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(
        disposition.as_deref(),
        Some("attachment; filename=\"FilteredPublications.bib\"")
    );
    let bib = res.text().await?;
    assert_eq!(bib.matches("@article{").count(), 1);
    assert!(bib.contains("journal   = {Journal Name}"));

    for format in ["xlsx", "docx"] {
        let res = http.get(format!("{app}/export/{format}")).send().await?;
        assert_eq!(res.status(), reqwest::StatusCode::OK);
        let bytes = res.bytes().await?;
        assert!(bytes.starts_with(b"PK"), "{format} should be a zip container");
    }

    let res = http.get(format!("{app}/export/pdf")).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    Ok(())
}
