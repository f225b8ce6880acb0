//! Request routing dispatch module
//!
//! Entry point for every HTTP request: resolves the path to an operation,
//! runs it through the executor, stamps common headers and writes the
//! access log line.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};

use crate::calc::Operation;
use crate::config::AppState;
use crate::error::ApiError;
use crate::handler::executor;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let logging = &state.config.logging;

    // Captured up front, the executor consumes the request
    let mut entry = logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.http_version = version_label(req.version()).to_string();
        entry.user_agent = req
            .headers()
            .get(hyper::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry
    });

    let operation = Operation::from_path(req.uri().path());
    let response = route_request(req, operation, &state).await;
    let response = http::with_server_header(response, &state.config.http.server_name);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.operation = operation.map(Operation::name);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &logging.access_log_format);
    }

    Ok(response)
}

/// Route request to the health probe, an operation, or 404
async fn route_request<B>(
    req: Request<B>,
    operation: Option<Operation>,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let health = &state.config.health;
    if health.enabled && req.uri().path() == health.path {
        return http::build_health_response(req.method() == Method::HEAD);
    }

    match operation {
        Some(op) => executor::handle_operation(req, op, state.config.http.max_body_size).await,
        None => ApiError::NotFound.into_response(),
    }
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::OperationResult;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn test_state() -> Arc<AppState> {
        let mut config = Config::load_from("definitely/not/here/config").unwrap();
        config.logging.access_log = false;
        Arc::new(AppState::new(config))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn send(method: Method, path: &str, body: &str) -> (StatusCode, Bytes) {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        let resp = handle_request(req, test_state(), peer()).await.unwrap();
        let status = resp.status();
        (status, resp.into_body().collect().await.unwrap().to_bytes())
    }

    fn result_of(body: &Bytes) -> f64 {
        serde_json::from_slice::<OperationResult>(body).unwrap().result
    }

    #[tokio::test]
    async fn test_scenario_sum() {
        let (status, body) = send(Method::POST, "/soma", r#"{"operando1": 2, "operando2": 3}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result_of(&body), 5.0);
    }

    #[tokio::test]
    async fn test_scenario_divide_by_zero() {
        let (status, body) = send(Method::POST, "/divisao", r#"{"operando1": 10, "operando2": 0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("division by zero"));
        assert!(!text.contains("resultado"));
    }

    #[tokio::test]
    async fn test_scenario_get_is_405() {
        let (status, _) = send(Method::GET, "/multiplicacao", "anything").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_scenario_not_json() {
        let (status, body) = send(Method::POST, "/subtracao", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(&body[..], b"error reading request body\n");
    }

    #[tokio::test]
    async fn test_scenario_multiply_negative() {
        let (status, body) =
            send(Method::POST, "/multiplicacao", r#"{"operando1": -4, "operando2": 2.5}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result_of(&body), -10.0);
    }

    #[tokio::test]
    async fn test_every_endpoint_rejects_non_post_and_bad_bodies() {
        for op in Operation::ALL {
            for method in [Method::GET, Method::PUT, Method::DELETE] {
                let (status, _) = send(method, op.path(), r#"{"operando1": 1, "operando2": 1}"#).await;
                assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{op}");
            }
            let (status, _) = send(Method::POST, op.path(), r#"{"operando1": 1}"#).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{op}");
        }
    }

    #[tokio::test]
    async fn test_identical_requests_are_idempotent() {
        let body = r#"{"operando1": 0.5, "operando2": 0.25}"#;
        let (_, first) = send(Method::POST, "/soma", body).await;
        for _ in 0..5 {
            let (status, again) = send(Method::POST, "/soma", body).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(again, first);
        }
        assert_eq!(result_of(&first), 0.75);
    }

    #[tokio::test]
    async fn test_unknown_paths_are_404() {
        for path in ["/", "/soma/", "/somar", "/api/soma", "/divisao/1"] {
            let (status, body) = send(Method::POST, path, r#"{"operando1": 1, "operando2": 1}"#).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
            assert_eq!(&body[..], b"404 page not found\n");
        }
    }

    #[tokio::test]
    async fn test_health_probe() {
        let (status, body) = send(Method::GET, "/healthz", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_health_probe_disabled() {
        let mut config = Config::load_from("definitely/not/here/config").unwrap();
        config.logging.access_log = false;
        config.health.enabled = false;
        let req = Request::builder()
            .uri("/healthz")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = handle_request(req, Arc::new(AppState::new(config)), peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_server_header_is_set() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/soma")
            .body(Full::new(Bytes::from(r#"{"operando1": 1, "operando2": 1}"#)))
            .unwrap();
        let resp = handle_request(req, test_state(), peer()).await.unwrap();
        assert_eq!(resp.headers().get("server").unwrap(), "arith-server");
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
