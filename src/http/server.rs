//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with the webhook, home and status handlers
//! - Wire up middleware (request id, tracing, timeout, body limit)
//! - Serve on a listener until the shutdown signal fires
//!
//! # Routes
//! - `POST /webhook/{input_type}`: provider named by the path
//! - `POST /webhook`: provider named by the `inputType` query parameter
//! - `GET /`: plain-text banner
//! - `GET /status`: version and registered providers

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::hook::RawRequest;
use crate::http::request::{request_id, request_id_header, UuidRequestId};
use crate::observability::metrics;
use crate::pipeline::HookPipeline;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: HookPipeline,
}

/// HTTP server for the generic server transport.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server dispatching into `pipeline`.
    pub fn new(config: &GatewayConfig, pipeline: HookPipeline) -> Self {
        let state = AppState { pipeline };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(home_handler))
            .route("/status", get(status_handler))
            .route("/webhook", post(webhook_handler))
            .route("/webhook/{input_type}", post(webhook_route_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id_header()))
            .layer(SetRequestIdLayer::new(request_id_header(), UuidRequestId))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn home_handler() -> &'static str {
    concat!("webhook-gateway ", env!("CARGO_PKG_VERSION"), "\n")
}

async fn status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "providers": state.pipeline.registry().keys(),
    }))
}

async fn webhook_route_handler(
    State(state): State<AppState>,
    Path(input_type): Path<String>,
    request: Request<Body>,
) -> Response {
    handle_webhook(&state, Some(&input_type), request).await
}

async fn webhook_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle_webhook(&state, None, request).await
}

async fn handle_webhook(state: &AppState, route_key: Option<&str>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request).to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };
    let raw = RawRequest::adapt(&Request::from_parts(parts, body));

    let info = state.pipeline.dispatch(route_key, &raw).await;

    let input_type = HookPipeline::resolve_key(route_key, &raw).unwrap_or_default();
    metrics::record_request("server", &input_type, info.status_code, start);
    tracing::info!(
        request_id = %request_id,
        input_type = %input_type,
        status = info.status_code,
        destinations = info.responses.len(),
        "Webhook handled"
    );
    info.into_response()
}
