//! Event-loop transport: HTTP/1.1 requests read straight off the socket.
//!
//! # Responsibilities
//! - Parse a request head and `Content-Length` body from raw bytes
//! - Expose the parsed request as a `RequestSource`
//! - Serve one request per connection behind the bounded listener
//!
//! # Design Decisions
//! - `Connection: close` after every response; no keep-alive, no pipelining
//! - Chunked request bodies are refused (501)
//! - Size and read-time limits are enforced before dispatch

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

use crate::config::EventLoopConfig;
use crate::hook::query::QUERY_PARAM_INPUT_TYPE;
use crate::hook::{RawRequest, RequestSource};
use crate::net::{ConnectionTracker, Listener};
use crate::observability::metrics;
use crate::pipeline::HookPipeline;
use crate::transport::server::parse_query;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";
const WEBHOOK_PATH: &str = "/webhook";
const DRAIN_DEADLINE: Duration = Duration::from_secs(10);

/// Why a request could not be read.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed request line")]
    RequestLine,
    #[error("malformed header line")]
    Header,
    #[error("request head is not valid UTF-8")]
    Encoding,
    #[error("invalid content-length")]
    ContentLength,
    #[error("chunked request bodies are not supported")]
    Chunked,
    #[error("request exceeds {0} bytes")]
    TooLarge(usize),
    #[error("connection closed before the request was complete")]
    Incomplete,
    #[error("timed out reading request")]
    Timeout,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// Status sent back for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            WireError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            WireError::Chunked => StatusCode::NOT_IMPLEMENTED,
            WireError::Timeout => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// One request as received by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl WireRequest {
    /// Parse a complete request from `buf`.
    ///
    /// Returns `Ok(None)` while more bytes are needed.
    pub fn parse(buf: &[u8], max_bytes: usize) -> Result<Option<WireRequest>, WireError> {
        let head_end = match find(buf, HEAD_TERMINATOR) {
            Some(i) => i,
            None if buf.len() > max_bytes => return Err(WireError::TooLarge(max_bytes)),
            None => return Ok(None),
        };

        let head = std::str::from_utf8(&buf[..head_end]).map_err(|_| WireError::Encoding)?;
        let mut lines = head.split("\r\n");

        let request_line = lines.next().ok_or(WireError::RequestLine)?;
        let mut parts = request_line.split_whitespace();
        let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(t), Some(v), None) => (m, t, v),
            _ => return Err(WireError::RequestLine),
        };
        if !version.starts_with("HTTP/1.") {
            return Err(WireError::RequestLine);
        }

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line.split_once(':').ok_or(WireError::Header)?;
            let name = name.trim();
            if name.is_empty() {
                return Err(WireError::Header);
            }
            headers.push((name.to_string(), value.trim().to_string()));
        }

        let chunked = headers.iter().any(|(n, v)| {
            n.eq_ignore_ascii_case("transfer-encoding") && v.to_ascii_lowercase().contains("chunked")
        });
        if chunked {
            return Err(WireError::Chunked);
        }

        let content_length = match headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        {
            Some((_, v)) => v.parse::<usize>().map_err(|_| WireError::ContentLength)?,
            None => 0,
        };

        let body_start = head_end + HEAD_TERMINATOR.len();
        let total = body_start.saturating_add(content_length);
        if total > max_bytes {
            return Err(WireError::TooLarge(max_bytes));
        }
        if buf.len() < total {
            return Ok(None);
        }

        Ok(Some(WireRequest {
            method: method.to_string(),
            target: target.to_string(),
            headers,
            body: Bytes::copy_from_slice(&buf[body_start..total]),
        }))
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }
}

impl RequestSource for WireRequest {
    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn query_params(&self) -> Vec<(String, String)> {
        parse_query(self.query())
    }

    fn body(&self) -> Bytes {
        self.body.clone()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Route key for a webhook path.
///
/// `None` if the path is not a webhook path; `Some(None)` for the bare
/// `/webhook` route that takes its key from the query.
pub fn webhook_route(path: &str) -> Option<Option<&str>> {
    let rest = path.strip_prefix(WEBHOOK_PATH)?;
    match rest.trim_end_matches('/') {
        "" => Some(None),
        segment => {
            let key = segment.strip_prefix('/')?;
            if key.is_empty() || key.contains('/') {
                None
            } else {
                Some(Some(key))
            }
        }
    }
}

/// Read one request from `stream` within the configured limits.
pub async fn read_request<S>(stream: &mut S, config: &EventLoopConfig) -> Result<WireRequest, WireError>
where
    S: AsyncRead + Unpin,
{
    tokio::time::timeout(
        Duration::from_secs(config.read_timeout_secs),
        read_until_complete(stream, config.max_request_bytes),
    )
    .await
    .map_err(|_| WireError::Timeout)?
}

async fn read_until_complete<S>(stream: &mut S, max_bytes: usize) -> Result<WireRequest, WireError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(8 * 1024);
    loop {
        if let Some(request) = WireRequest::parse(&buf, max_bytes)? {
            return Ok(request);
        }
        if stream.read_buf(&mut buf).await? == 0 {
            return Err(WireError::Incomplete);
        }
    }
}

/// Status and JSON body for a parsed request.
pub async fn respond(pipeline: &HookPipeline, request: &WireRequest) -> (StatusCode, Vec<u8>) {
    let route = match webhook_route(request.path()) {
        Some(route) => route,
        None => return (StatusCode::NOT_FOUND, b"No matching route found".to_vec()),
    };
    if !request.method.eq_ignore_ascii_case("POST") {
        return (StatusCode::METHOD_NOT_ALLOWED, b"Method not allowed".to_vec());
    }

    let raw = RawRequest::adapt(request);
    let info = pipeline.dispatch(route, &raw).await;
    let status = StatusCode::from_u16(info.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, info.to_body())
}

/// Serialize a `Connection: close` response.
pub fn encode_response(status: StatusCode, body: &[u8]) -> Vec<u8> {
    let content_type = if body.first() == Some(&b'{') {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    };
    let mut out = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        content_type,
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

async fn handle_connection<S>(mut stream: S, pipeline: &HookPipeline, config: &EventLoopConfig)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start = Instant::now();
    let (status, body, input_type) = match read_request(&mut stream, config).await {
        Ok(request) => {
            let input_type = webhook_route(request.path())
                .flatten()
                .map(str::to_string)
                .or_else(|| request.query_param(QUERY_PARAM_INPUT_TYPE))
                .unwrap_or_default();
            let (status, body) = respond(pipeline, &request).await;
            (status, body, input_type)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected event-loop request");
            (e.status(), e.to_string().into_bytes(), String::new())
        }
    };

    metrics::record_request("event_loop", &input_type, status.as_u16(), start);
    if let Err(e) = stream.write_all(&encode_response(status, &body)).await {
        tracing::debug!(error = %e, "Failed to write response");
        return;
    }
    let _ = stream.shutdown().await;
}

/// Accept loop for the event-loop transport.
pub struct EventLoopServer {
    config: EventLoopConfig,
    pipeline: HookPipeline,
    tracker: ConnectionTracker,
}

impl EventLoopServer {
    pub fn new(config: EventLoopConfig, pipeline: HookPipeline) -> Self {
        Self {
            config,
            pipeline,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Serve until `shutdown` fires, then drain open connections.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        let guard = self.tracker.track();
                        let pipeline = self.pipeline.clone();
                        let config = self.config.clone();
                        tokio::spawn(async move {
                            tracing::trace!(connection_id = %guard.id(), peer = %peer, "Serving connection");
                            handle_connection(stream, &pipeline, &config).await;
                            drop(permit);
                            drop(guard);
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "Accept failed"),
                },
                _ = shutdown.recv() => {
                    tracing::info!("Event-loop listener stopping");
                    break;
                }
            }
        }

        if !self.tracker.drain(DRAIN_DEADLINE).await {
            tracing::warn!(
                open_connections = self.tracker.active_count(),
                "Connections still open after drain deadline"
            );
        }
    }
}
