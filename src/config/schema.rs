//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::hook::BodyEncoding;

/// Root configuration for the webhook gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener for the generic server transport.
    pub listener: ListenerConfig,

    /// Raw event-loop listener.
    pub event_loop: EventLoopConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Extra input types and the body encoding their producers use.
    pub routes: Vec<RouteConfig>,

    /// Named destinations selectable with the `adapters` query parameter.
    pub outputs: Vec<OutputConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Event-loop transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventLoopConfig {
    /// Start the event-loop listener.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Largest request (head and body) accepted, in bytes.
    pub max_request_bytes: usize,

    /// Time allowed to receive a full request, in seconds.
    pub read_timeout_secs: u64,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "0.0.0.0:8081".to_string(),
            max_connections: 1_024,
            max_request_bytes: 2 * 1024 * 1024,
            read_timeout_secs: 10,
        }
    }
}

/// Provider route: an input type served by the canonical normalizer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Input type (path segment or `inputType` parameter).
    pub input_type: String,

    /// How the producer wraps its JSON body.
    #[serde(default)]
    pub body_encoding: BodyEncoding,
}

/// Named output adapter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Name used in the `adapters` query parameter.
    pub name: String,

    /// Incoming-webhook URL of the chat destination.
    pub url: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time for one inbound request, in seconds.
    pub request_secs: u64,

    /// Time allowed for one delivery, in seconds.
    pub delivery_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            delivery_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

impl GatewayConfig {
    /// URL of a named output adapter.
    pub fn output_url(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name.trim()))
            .map(|o| o.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(!config.event_loop.enabled);
        assert_eq!(config.timeouts.delivery_secs, 10);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_routes_and_outputs() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [event_loop]
            enabled = true
            max_connections = 8

            [[routes]]
            input_type = "travisci"
            body_encoding = "url_encoded_json_payload"

            [[routes]]
            input_type = "plain"

            [[outputs]]
            name = "ops"
            url = "https://chat.example/hooks/ops"
            "#,
        )
        .unwrap();

        assert!(config.event_loop.enabled);
        assert_eq!(config.event_loop.max_connections, 8);
        assert_eq!(config.routes[0].body_encoding, BodyEncoding::UrlEncodedJsonPayload);
        assert_eq!(config.routes[1].body_encoding, BodyEncoding::Json);
        assert_eq!(config.output_url("OPS"), Some("https://chat.example/hooks/ops"));
        assert_eq!(config.output_url("dev"), None);
    }
}
