//! gitlab-pat-server: HTTP adapter for GitLab project access token issuance
//!
//! Lightweight HTTP server using hyper. Uses a single-threaded tokio runtime
//! (compatible with core's !Send async traits).

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gitlab_pat_core::error::{ApiError, ErrorResponse};
use gitlab_pat_core::token::{self, TokenFields};

mod platform;
mod schema;

use platform::{ProcessEnv, ReqwestHttpClient, SystemClock};

/// Shared application state
struct AppState {
    http: ReqwestHttpClient,
    clock: SystemClock,
    env: ProcessEnv,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => match raw.parse() {
            Ok(port) => port,
            Err(_) => {
                error!(port = %raw, "PORT must be a number");
                std::process::exit(1);
            }
        },
        Err(_) => 8080,
    };

    let state = Arc::new(AppState {
        http: ReqwestHttpClient::new(),
        clock: SystemClock,
        env: ProcessEnv,
    });

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(port, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(port, "gitlab-pat-server listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!(error = %e, "accept failed");
                continue;
            }
        };
        let state = state.clone();

        // Each connection is handled sequentially (single-threaded runtime)
        let io = hyper_util::rt::TokioIo::new(stream);
        let service = service_fn(move |req| {
            let state = state.clone();
            async move { handle_request(req, &state).await }
        });

        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
            error!(%peer, error = %e, "connection error");
        }
    }
}

/// Initialize tracing; `RUST_LOG` sets the filter, `LOG_FORMAT=json` selects JSON output
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

type HyperResponse = Response<Full<Bytes>>;

async fn handle_request(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<HyperResponse, std::convert::Infallible> {
    let result = route_request(req, state).await;
    Ok(result)
}

async fn route_request(req: Request<Incoming>, state: &AppState) -> HyperResponse {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/") => handle_health(),
        (Method::GET, "/token") => json_response(StatusCode::OK, &schema::token_help()),
        (Method::POST, "/token") | (Method::PUT, "/token") => handle_create(req, state).await,
        _ => json_response(StatusCode::NOT_FOUND, &serde_json::json!({"error": "not_found"})),
    }
}

fn handle_health() -> HyperResponse {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "name": "gitlab-pat",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

async fn handle_create(req: Request<Incoming>, state: &AppState) -> HyperResponse {
    let body = match req.collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => return error_response(&ApiError::invalid_request("failed to read body")),
    };

    let fields = match TokenFields::from_slice(&body) {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };

    match token::create::handle(fields, &state.env, &state.http, &state.clock).await {
        Ok(response) => json_response(StatusCode::OK, &response),
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &ApiError) -> HyperResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "request failed");
    }
    let body = ErrorResponse::from(err);
    json_response(status, &body)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> HyperResponse {
    let json = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}
