use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use threatboard::models::{Health, IocQuery, NewSource, SessionQuery, SourceUpdate};
use threatboard::{ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq)]
struct Recorded {
    method: Method,
    path: String,
    query: Option<String>,
    content_type: Option<String>,
    body: Option<Value>,
}

#[derive(Clone)]
struct Backend {
    requests: Arc<Mutex<Vec<Recorded>>>,
    fail_with: Option<StatusCode>,
}

async fn record(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };
    let recorded = Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    };
    backend.requests.lock().unwrap().push(recorded);
    if let Some(status) = backend.fail_with {
        return (status, axum::Json(json!({"error": "backend exploded"}))).into_response();
    }
    let path = uri.path();
    if method == Method::DELETE {
        StatusCode::NO_CONTENT.into_response()
    } else if path.starts_with("/plain/") {
        (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response()
    } else if path.starts_with("/blank/") {
        StatusCode::BAD_REQUEST.into_response()
    } else if path.starts_with("/garbled/") {
        "<html>not json</html>".into_response()
    } else if path.ends_with("/health") {
        axum::Json(json!({"status": "healthy"})).into_response()
    } else {
        axum::Json(json!({"ok": true})).into_response()
    }
}

async fn spawn_backend(fail_with: Option<StatusCode>) -> (SocketAddr, Arc<Mutex<Vec<Recorded>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let backend = Backend {
        requests: requests.clone(),
        fail_with,
    };
    let app = Router::new().fallback(record).with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, requests)
}

fn take(requests: &Arc<Mutex<Vec<Recorded>>>) -> Vec<Recorded> {
    std::mem::take(&mut *requests.lock().unwrap())
}

#[tokio::test]
async fn each_method_issues_exactly_one_documented_request() {
    let (addr, requests) = spawn_backend(None).await;
    let client = ApiClient::new(format!("http://{}/api", addr));

    client.health_check().await.unwrap();
    client.get_sources().await.unwrap();
    client
        .create_source(&NewSource::new("https://feed.example/list.txt"))
        .await
        .unwrap();
    let update = SourceUpdate {
        active: Some(false),
        ..Default::default()
    };
    client.update_source(4, &update).await.unwrap();
    client.delete_source(4).await.unwrap();
    client.scrape_adhoc("http://x.com", None).await.unwrap();
    client.scrape_source(4).await.unwrap();
    client.get_iocs(&IocQuery::default()).await.unwrap();
    client.get_ioc_stats().await.unwrap();
    client.get_sessions(&SessionQuery::default()).await.unwrap();
    client.get_session_iocs(11).await.unwrap();

    let recorded = take(&requests);
    let calls: Vec<_> = recorded
        .iter()
        .map(|r| (r.method.as_str().to_string(), r.path.as_str()))
        .collect();
    let expected = [
        ("GET", "/api/health"),
        ("GET", "/api/sources"),
        ("POST", "/api/sources"),
        ("PUT", "/api/sources/4"),
        ("DELETE", "/api/sources/4"),
        ("POST", "/api/scrape/adhoc"),
        ("POST", "/api/scrape/source/4"),
        ("GET", "/api/iocs"),
        ("GET", "/api/iocs/stats"),
        ("GET", "/api/sessions"),
        ("GET", "/api/sessions/11/iocs"),
    ];
    assert_eq!(calls.len(), expected.len());
    for ((method, path), (expected_method, expected_path)) in calls.iter().zip(expected) {
        assert_eq!(method, expected_method);
        assert_eq!(*path, expected_path);
    }
    assert!(recorded.iter().all(|r| r.query.is_none()));
    assert!(recorded
        .iter()
        .all(|r| r.content_type.as_deref() == Some("application/json")));
    assert_eq!(recorded[3].body, Some(json!({"active": false})));
    assert_eq!(
        recorded[5].body,
        Some(json!({"url": "http://x.com", "include_private_ips": false}))
    );
    assert_eq!(recorded[6].body, None);
}

#[tokio::test]
async fn query_parameters_are_forwarded() {
    let (addr, requests) = spawn_backend(None).await;
    let client = ApiClient::new(format!("http://{}/api", addr));

    let query = IocQuery {
        ioc_type: Some("ip".to_string()),
        ..Default::default()
    };
    client.get_iocs(&query).await.unwrap();
    client
        .get_sessions(&SessionQuery {
            page: Some(3),
            per_page: None,
        })
        .await
        .unwrap();

    let recorded = take(&requests);
    assert_eq!(recorded[0].path, "/api/iocs");
    assert_eq!(recorded[0].query.as_deref(), Some("type=ip"));
    assert_eq!(recorded[1].query.as_deref(), Some("page=3"));
}

#[tokio::test]
async fn responses_are_returned_unmodified() {
    let (addr, _requests) = spawn_backend(None).await;
    let client = ApiClient::new(format!("http://{}/api", addr));

    let health = client.health_check().await.unwrap();
    assert_eq!(health.status, reqwest::StatusCode::OK);
    assert_eq!(health.data, json!({"status": "healthy"}));
    assert_eq!(health.json::<Health>().unwrap().status, "healthy");

    let deleted = client.delete_source("9").await.unwrap();
    assert_eq!(deleted.status, reqwest::StatusCode::NO_CONTENT);
    assert_eq!(deleted.data, Value::Null);
}

#[tokio::test]
async fn server_errors_propagate_to_the_caller() {
    let (addr, requests) = spawn_backend(Some(StatusCode::INTERNAL_SERVER_ERROR)).await;
    let client = ApiClient::new(format!("http://{}/api", addr));

    let err = client.get_sources().await.unwrap_err();
    match &err {
        ApiError::Status { status, data } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(data, &json!({"error": "backend exploded"}));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert_eq!(take(&requests).len(), 1);
}

#[tokio::test]
async fn malformed_bodies_are_reported() {
    let (addr, requests) = spawn_backend(None).await;
    let client = ApiClient::new(format!("http://{}/garbled", addr));

    let err = client.get_ioc_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(take(&requests).len(), 1);
}

#[tokio::test]
async fn non_json_error_bodies_are_kept_as_text() {
    let (addr, requests) = spawn_backend(None).await;

    let client = ApiClient::new(format!("http://{}/plain", addr));
    match client.get_sources().await.unwrap_err() {
        ApiError::Status { status, data } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(data, json!("upstream down"));
        }
        other => panic!("unexpected error {:?}", other),
    }

    let client = ApiClient::new(format!("http://{}/blank", addr));
    match client.get_sources().await.unwrap_err() {
        ApiError::Status { status, data } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(data, Value::Null);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(take(&requests).len(), 2);
}

#[tokio::test]
async fn environment_client_reaches_the_default_api_path() {
    let (addr, requests) = spawn_backend(None).await;
    let client = ApiClient::from_lookup(&format!("http://{}", addr), |_| None);

    let health = client.health_check().await.unwrap();
    assert_eq!(health.data, json!({"status": "healthy"}));
    let paths: Vec<_> = take(&requests).into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/health"]);
}

#[tokio::test]
async fn network_failures_propagate_to_the_caller() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = ApiClient::new(format!("http://{}/api", addr));
    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_backend() {
    let (addr, requests) = spawn_backend(None).await;
    let client = ApiClient::new(format!("http://{}/api", addr));

    assert!(matches!(
        client.scrape_adhoc("", Some(true)).await,
        Err(ApiError::InvalidArgument(_))
    ));
    assert!(matches!(
        client.update_source("", &SourceUpdate::default()).await,
        Err(ApiError::InvalidArgument(_))
    ));
    assert!(take(&requests).is_empty());
}

#[tokio::test]
async fn base_url_override_changes_every_prefix() {
    let (addr, requests) = spawn_backend(None).await;
    let default = ApiClient::new(format!("http://{}/api", addr));
    let overridden = ApiClient::new(format!("http://{}/intel/api", addr));

    default.health_check().await.unwrap();
    overridden.health_check().await.unwrap();
    overridden.get_ioc_stats().await.unwrap();

    let paths: Vec<_> = take(&requests).into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec!["/api/health", "/intel/api/health", "/intel/api/iocs/stats"]
    );
}
