//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate routes and output adapters
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("route input_type must not be empty")]
    EmptyInputType,

    #[error("duplicate route input_type {0:?}")]
    DuplicateRoute(String),

    #[error("output name must not be empty")]
    EmptyOutputName,

    #[error("duplicate output name {0:?}")]
    DuplicateOutput(String),

    #[error("output {name:?}: invalid url {url:?}")]
    InvalidOutputUrl { name: String, url: String },
}

/// Check a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.event_loop.enabled {
        check_address("event_loop.bind_address", &config.event_loop.bind_address, &mut errors);
    }
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    let positive = [
        ("timeouts.request_secs", config.timeouts.request_secs as usize),
        ("timeouts.delivery_secs", config.timeouts.delivery_secs as usize),
        ("security.max_body_size", config.security.max_body_size),
        ("event_loop.max_connections", config.event_loop.max_connections),
        ("event_loop.max_request_bytes", config.event_loop.max_request_bytes),
        ("event_loop.read_timeout_secs", config.event_loop.read_timeout_secs as usize),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        let key = route.input_type.trim().to_lowercase();
        if key.is_empty() {
            errors.push(ValidationError::EmptyInputType);
        } else if !seen.insert(key.clone()) {
            errors.push(ValidationError::DuplicateRoute(key));
        }
    }

    let mut seen = HashSet::new();
    for output in &config.outputs {
        let name = output.name.trim().to_lowercase();
        if name.is_empty() {
            errors.push(ValidationError::EmptyOutputName);
        } else if !seen.insert(name.clone()) {
            errors.push(ValidationError::DuplicateOutput(name));
        }

        let valid_url = url::Url::parse(&output.url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid_url {
            errors.push(ValidationError::InvalidOutputUrl {
                name: output.name.clone(),
                url: output.url.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
