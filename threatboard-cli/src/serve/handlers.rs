use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use threatboard::route;

use crate::serve::ServeState;

const MAX_PROXY_BODY: usize = 16 * 1024 * 1024;

const HOP_BY_HOP: [header::HeaderName; 5] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::TE,
    header::PROXY_AUTHORIZATION,
];

pub async fn dispatch(State(state): State<Arc<ServeState>>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    if state.config.proxy.matches(&path) {
        return proxy(&state, request).await;
    }
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    let response = static_file(&state, &path).await;
    log::info!("{} {} {}", request.method(), path, response.status());
    response
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

async fn proxy(state: &ServeState, request: Request) -> Response {
    let rule = &state.config.proxy;
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let target = rule.target_url(&path_and_query);
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_PROXY_BODY).await {
        Ok(body) => body,
        Err(err) => {
            log::error!("Failed to read request body for {}: {}", target, err);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::CONTENT_LENGTH);
    if rule.change_origin {
        headers.remove(header::HOST);
    }
    log::info!("{} {} -> {}", parts.method, path_and_query, target);
    let upstream = state
        .http
        .request(parts.method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await;
    let upstream = match upstream {
        Ok(upstream) => upstream,
        Err(err) => {
            log::error!("Proxy request to {} failed: {}", target, err);
            return (StatusCode::BAD_GATEWAY, err.to_string()).into_response();
        }
    };
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::CONTENT_LENGTH);
    let body: Bytes = match upstream.bytes().await {
        Ok(body) => body,
        Err(err) => {
            log::error!("Proxy response from {} failed: {}", target, err);
            return (StatusCode::BAD_GATEWAY, err.to_string()).into_response();
        }
    };
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Maps a request path onto a file under `dist`. Paths that try to leave the
/// directory map to nothing.
fn dist_path(dist: &Path, public_path: &str, path: &str) -> Option<PathBuf> {
    let relative = path
        .strip_prefix(public_path)
        .or_else(|| path.strip_prefix('/'))?;
    let relative = Path::new(relative);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(dist.join(relative))
}

async fn read_file(path: &Path) -> Option<Vec<u8>> {
    if !tokio::fs::metadata(path).await.ok()?.is_file() {
        return None;
    }
    tokio::fs::read(path).await.ok()
}

async fn index(state: &ServeState) -> Response {
    match read_file(&state.dist.join("index.html")).await {
        Some(contents) => (
            [(header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.to_string())],
            contents,
        )
            .into_response(),
        None => {
            log::error!("{} has no index.html", state.dist.display());
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn static_file(state: &ServeState, path: &str) -> Response {
    let build = &state.config.build;
    if route::resolve(path).is_some() {
        return index(state).await;
    }
    let Some(file) = dist_path(&state.dist, &build.public_path, path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(contents) = read_file(&file).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    let mut response = contents.into_response();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    let assets = Path::new(&state.dist).join(&build.assets_dir);
    if file.starts_with(&assets) {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=31536000, immutable"),
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serve::router;
    use axum::Router;
    use std::net::SocketAddr;
    use threatboard::config::DevServerConfig;

    async fn spawn(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn dist_fixture(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("threatboard-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(dir.join("static")).unwrap();
        std::fs::write(dir.join("index.html"), "<html>threatboard</html>").unwrap();
        std::fs::write(dir.join("style.css"), "body {}").unwrap();
        std::fs::write(dir.join("static/app.wasm"), [0u8, 97, 115, 109]).unwrap();
        dir
    }

    async fn echo(request: Request) -> String {
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let method = request.method().clone();
        let uri = request.uri().clone();
        let body = axum::body::to_bytes(request.into_body(), 1024).await.unwrap();
        format!(
            "{} {} host={} body={}",
            method,
            uri,
            host,
            String::from_utf8_lossy(&body)
        )
    }

    async fn spawn_dev_server(name: &str) -> (SocketAddr, SocketAddr) {
        let backend = spawn(Router::new().fallback(echo)).await;
        let mut config = DevServerConfig::default();
        config.proxy.target = format!("http://{}", backend);
        let state = Arc::new(ServeState::new(config, dist_fixture(name)).unwrap());
        (spawn(router(state)).await, backend)
    }

    #[test]
    fn dist_path_refuses_to_escape() {
        let dist = Path::new("/srv/dist");
        assert_eq!(
            dist_path(dist, "/", "/static/app.wasm"),
            Some(PathBuf::from("/srv/dist/static/app.wasm"))
        );
        assert_eq!(dist_path(dist, "/", "/../etc/passwd"), None);
        assert_eq!(dist_path(dist, "/", "/static/../../x"), None);
    }

    #[tokio::test]
    async fn api_requests_are_forwarded_with_path_and_query() {
        let (server, backend) = spawn_dev_server("proxy").await;
        let client = reqwest::Client::new();
        let body = client
            .post(format!("http://{}/api/scrape/adhoc?verbose=1", server))
            .body("{\"url\":\"http://x.com\"}")
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(
            body,
            format!(
                "POST /api/scrape/adhoc?verbose=1 host={} body={{\"url\":\"http://x.com\"}}",
                backend
            )
        );
    }

    #[tokio::test]
    async fn route_paths_fall_back_to_index() {
        let (server, _) = spawn_dev_server("routes").await;
        for path in ["/", "/sources", "/iocs", "/scrape", "/sessions"] {
            let response = reqwest::get(format!("http://{}{}", server, path)).await.unwrap();
            assert_eq!(response.status(), 200);
            assert_eq!(
                response.headers()[header::CONTENT_TYPE.as_str()],
                "text/html; charset=utf-8"
            );
            assert_eq!(response.text().await.unwrap(), "<html>threatboard</html>");
        }
    }

    #[tokio::test]
    async fn files_are_served_and_unknown_paths_are_not_found() {
        let (server, _) = spawn_dev_server("files").await;
        let css = reqwest::get(format!("http://{}/style.css", server)).await.unwrap();
        assert_eq!(css.status(), 200);
        assert_eq!(css.headers()[header::CONTENT_TYPE.as_str()], "text/css");
        assert!(css.headers().get(header::CACHE_CONTROL.as_str()).is_none());

        let wasm = reqwest::get(format!("http://{}/static/app.wasm", server)).await.unwrap();
        assert_eq!(wasm.status(), 200);
        assert!(wasm.headers().get(header::CACHE_CONTROL.as_str()).is_some());

        let missing = reqwest::get(format!("http://{}/dashboard", server)).await.unwrap();
        assert_eq!(missing.status(), 404);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_bad_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = listener.local_addr().unwrap();
        drop(listener);
        let mut config = DevServerConfig::default();
        config.proxy.target = format!("http://{}", dead);
        let state = Arc::new(ServeState::new(config, dist_fixture("dead")).unwrap());
        let server = spawn(router(state)).await;
        let response = reqwest::get(format!("http://{}/api/health", server)).await.unwrap();
        assert_eq!(response.status(), 502);
    }
}
