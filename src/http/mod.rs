//! HTTP server subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, middleware)
//!     → request.rs (request id)
//!     → transport::server (http::Request → RawRequest)
//!     → HookPipeline::dispatch
//!     → response.rs (ResponseInfo → HTTP response)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
