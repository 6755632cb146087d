use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serial_test::serial;
use tokio::net::TcpListener;

use super::*;

/// Stand-in for the ICD token and search endpoints.
#[derive(Clone)]
struct FakeIcd {
    token_calls: Arc<AtomicUsize>,
    search_calls: Arc<AtomicUsize>,
    expires_in: Option<u64>,
    search_status: StatusCode,
    search_delay: Duration,
    last_search: Arc<Mutex<Option<(HeaderMap, HashMap<String, String>)>>>,
}

impl Default for FakeIcd {
    fn default() -> Self {
        Self {
            token_calls: Arc::default(),
            search_calls: Arc::default(),
            expires_in: Some(3600),
            search_status: StatusCode::OK,
            search_delay: Duration::ZERO,
            last_search: Arc::default(),
        }
    }
}

async fn token_handler(
    State(fake): State<FakeIcd>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = fake.token_calls.fetch_add(1, Ordering::SeqCst) + 1;

    let valid = form.get("grant_type").map(String::as_str) == Some("client_credentials")
        && form.get("client_id").map(String::as_str) == Some("client")
        && form.get("client_secret").map(String::as_str) == Some("secret")
        && form.get("scope").map(String::as_str) == Some("icdapi_access");
    if !valid {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "invalid_client"})),
        )
            .into_response();
    }

    let mut body = serde_json::json!({
        "access_token": format!("token-{n}"),
        "token_type": "Bearer",
    });
    if let Some(expires_in) = fake.expires_in {
        body["expires_in"] = expires_in.into();
    }
    Json(body).into_response()
}

async fn search_handler(
    State(fake): State<FakeIcd>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.search_calls.fetch_add(1, Ordering::SeqCst);
    *fake.last_search.lock() = Some((headers, params.clone()));

    if !fake.search_delay.is_zero() {
        tokio::time::sleep(fake.search_delay).await;
    }
    if fake.search_status != StatusCode::OK {
        return (fake.search_status, "rejected").into_response();
    }

    let q = params.get("q").cloned().unwrap_or_default();
    Json(serde_json::json!({
        "error": false,
        "destinationEntities": [
            {"id": "http://id.who.int/icd/entity/1", "title": format!("<em class='found'>{q}</em> one")},
            {"title": "no identifier"},
            {"id": "http://id.who.int/icd/entity/3", "title": "three"},
            {"id": "http://id.who.int/icd/entity/4", "title": "four"},
        ]
    }))
    .into_response()
}

async fn spawn_fake(fake: FakeIcd) -> String {
    let app = Router::new()
        .route("/connect/token", post(token_handler))
        .route("/icd/entity/search", get(search_handler))
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config_for(base: &str) -> TerminologyConfig {
    TerminologyConfig {
        token_url: format!("{base}/connect/token"),
        search_url: format!("{base}/icd/entity/search"),
        ..TerminologyConfig::default()
    }
    .with_credentials("client", "secret")
}

#[tokio::test]
async fn test_search_sends_protocol_headers() {
    let fake = FakeIcd::default();
    let base = spawn_fake(fake.clone()).await;
    let client = Icd11Client::new(config_for(&base)).unwrap();

    let entities = client.search("stroke", 10).await.unwrap();
    assert_eq!(entities.len(), 4);
    assert_eq!(entities[0].title, "<em class='found'>stroke</em> one");
    assert_eq!(entities[1].id, None);

    let (headers, params) = fake.last_search.lock().clone().unwrap();
    assert_eq!(params.get("q").map(String::as_str), Some("stroke"));
    assert_eq!(headers["authorization"], "Bearer token-1");
    assert_eq!(headers["accept"], "application/json");
    assert_eq!(headers["accept-language"], "en");
    assert_eq!(headers["api-version"], "v2");
}

#[tokio::test]
async fn test_search_truncates_to_limit() {
    let base = spawn_fake(FakeIcd::default()).await;
    let client = Icd11Client::new(config_for(&base)).unwrap();

    let entities = client.search("sepsis", 2).await.unwrap();
    assert_eq!(entities.len(), 2);
}

#[tokio::test]
async fn test_token_is_reused_until_expiry() {
    let fake = FakeIcd::default();
    let base = spawn_fake(fake.clone()).await;
    let client = Icd11Client::new(config_for(&base)).unwrap();

    client.search("a", 5).await.unwrap();
    client.search("b", 5).await.unwrap();

    assert_eq!(fake.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fake.search_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_short_lived_token_is_not_cached() {
    let fake = FakeIcd {
        expires_in: Some(30),
        ..FakeIcd::default()
    };
    let base = spawn_fake(fake.clone()).await;
    let client = Icd11Client::new(config_for(&base)).unwrap();

    client.search("a", 5).await.unwrap();
    client.search("b", 5).await.unwrap();

    assert_eq!(fake.token_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unauthorized_search_discards_token() {
    let fake = FakeIcd {
        search_status: StatusCode::UNAUTHORIZED,
        ..FakeIcd::default()
    };
    let base = spawn_fake(fake.clone()).await;
    let client = Icd11Client::new(config_for(&base)).unwrap();

    let err = client.search("a", 5).await.unwrap_err();
    assert!(matches!(
        err,
        TerminologyError::SearchRejected { status: 401, .. }
    ));

    client.search("b", 5).await.unwrap_err();
    assert_eq!(fake.token_calls.load(Ordering::SeqCst), 2);
    assert_eq!(fake.search_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_server_error_is_reported_not_retried() {
    let fake = FakeIcd {
        search_status: StatusCode::INTERNAL_SERVER_ERROR,
        ..FakeIcd::default()
    };
    let base = spawn_fake(fake.clone()).await;
    let client = Icd11Client::new(config_for(&base)).unwrap();

    let err = client.search("a", 5).await.unwrap_err();
    assert!(matches!(
        err,
        TerminologyError::SearchRejected { status: 500, .. }
    ));
    assert_eq!(fake.search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fake.token_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_credentials() {
    let fake = FakeIcd::default();
    let base = spawn_fake(fake.clone()).await;
    let config = config_for(&base).with_credentials("client", "wrong");
    let client = Icd11Client::new(config).unwrap();

    let err = client.search("a", 5).await.unwrap_err();
    assert!(matches!(
        err,
        TerminologyError::TokenRejected { status: 400, .. }
    ));
    assert_eq!(fake.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_credentials_fail_without_network() {
    let config = TerminologyConfig {
        token_url: "http://127.0.0.1:9/connect/token".to_string(),
        search_url: "http://127.0.0.1:9/search".to_string(),
        ..TerminologyConfig::default()
    };
    let client = Icd11Client::new(config).unwrap();
    assert!(!client.is_configured());

    assert!(matches!(
        client.search("a", 5).await,
        Err(TerminologyError::MissingCredentials)
    ));
}

#[test]
fn test_configured_reflects_credentials() {
    let client = Icd11Client::new(config_for("http://127.0.0.1:9")).unwrap();
    assert!(client.is_configured());
    assert!(Arc::new(MockTerminologyClient::empty()).is_configured());
    assert!(!MockTerminologyClient::missing_credentials().is_configured());
}

#[tokio::test]
async fn test_slow_search_times_out() {
    let fake = FakeIcd {
        search_delay: Duration::from_secs(5),
        ..FakeIcd::default()
    };
    let base = spawn_fake(fake).await;
    let config = TerminologyConfig {
        timeout: Duration::from_millis(200),
        ..config_for(&base)
    };
    let client = Icd11Client::new(config).unwrap();

    assert!(matches!(
        client.search("a", 5).await,
        Err(TerminologyError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_mock_client_records_queries() {
    let mock = MockTerminologyClient::new(vec![
        TerminologyEntity::new("x/1", "One"),
        TerminologyEntity::new("x/2", "Two"),
    ]);

    let hits = mock.search("one", 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.queries(), vec![("one".to_string(), 1)]);

    let failing = MockTerminologyClient::token_rejected();
    assert!(failing.search("one", 1).await.is_err());
}

#[test]
fn test_strip_markup() {
    assert_eq!(
        strip_markup("<em class='found'>Diabetes</em> mellitus"),
        "Diabetes mellitus"
    );
    assert_eq!(strip_markup("no tags"), "no tags");
    assert_eq!(strip_markup("a <b>bold</b> <i>move</i>"), "a bold move");
}

#[test]
fn test_config_debug_hides_secret() {
    let config = TerminologyConfig::default().with_credentials("client", "hunter2");
    let printed = format!("{config:?}");
    assert!(printed.contains("client"));
    assert!(!printed.contains("hunter2"));
}

#[test]
#[serial]
fn test_config_from_env() {
    // SAFETY: Test code only, serialized with the other env tests.
    unsafe {
        std::env::set_var(TerminologyConfig::ENV_CLIENT_ID, "id");
        std::env::set_var(TerminologyConfig::ENV_CLIENT_SECRET, "secret");
        std::env::set_var(TerminologyConfig::ENV_TIMEOUT_SECS, "3");
        std::env::set_var(TerminologyConfig::ENV_LANGUAGE, "fr");
        std::env::remove_var(TerminologyConfig::ENV_SEARCH_URL);
    }

    let config = TerminologyConfig::from_env();

    // SAFETY: Test code only.
    unsafe {
        std::env::remove_var(TerminologyConfig::ENV_CLIENT_ID);
        std::env::remove_var(TerminologyConfig::ENV_CLIENT_SECRET);
        std::env::remove_var(TerminologyConfig::ENV_TIMEOUT_SECS);
        std::env::remove_var(TerminologyConfig::ENV_LANGUAGE);
    }

    assert!(config.has_credentials());
    assert_eq!(config.timeout, Duration::from_secs(3));
    assert_eq!(config.language, "fr");
    assert_eq!(config.search_url, config::DEFAULT_SEARCH_URL);
}

#[test]
#[serial]
fn test_config_ignores_invalid_timeout() {
    // SAFETY: Test code only.
    unsafe { std::env::set_var(TerminologyConfig::ENV_TIMEOUT_SECS, "soon") };
    let config = TerminologyConfig::from_env();
    // SAFETY: Test code only.
    unsafe { std::env::remove_var(TerminologyConfig::ENV_TIMEOUT_SECS) };

    assert_eq!(config.timeout, Duration::from_secs(10));
}
