//! Webhook gateway library.
//!
//! Normalizes inbound webhook calls from three transports (serverless
//! gateway events, a generic HTTP server, and a raw event loop) into one
//! request shape, decodes their bodies, hands them to a provider
//! normalizer and fans the result out to the configured destinations.

// Core data model
pub mod hook;
pub mod provider;

// Processing
pub mod delivery;
pub mod pipeline;

// Transports
pub mod http;
pub mod net;
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::HookPipeline;
