//! Delivery of canonical messages to chat destinations.
//!
//! # Responsibilities
//! - Post one message to one destination
//! - Report every attempt as an `ErrorInfo`, success included
//!
//! # Design Decisions
//! - One attempt per destination, no retries
//! - Transport failures map to gateway statuses (502, 504)
//! - Delivery never returns an error; the status code is the outcome

use std::time::Duration;

use async_trait::async_trait;

use crate::hook::{ErrorInfo, HookData};
use crate::provider::CanonicalMessage;

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Adapter name, or the output type for an ad-hoc `url`.
    pub name: String,
    pub url: String,
}

/// Sends a message to one destination.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(
        &self,
        destination: &Destination,
        message: &CanonicalMessage,
        hook: &HookData,
    ) -> ErrorInfo;
}

/// Posts the canonical message as JSON to the destination URL.
#[derive(Debug, Clone)]
pub struct HttpDelivery {
    client: reqwest::Client,
}

impl HttpDelivery {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { client }
    }
}

#[async_trait]
impl Delivery for HttpDelivery {
    async fn deliver(
        &self,
        destination: &Destination,
        message: &CanonicalMessage,
        hook: &HookData,
    ) -> ErrorInfo {
        let request = self.client.post(&destination.url).json(message);

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.bytes().await.unwrap_or_default();
                tracing::debug!(
                    destination = %destination.name,
                    input_type = %hook.input_type,
                    status,
                    "Delivered message"
                );
                ErrorInfo::new(status, body)
            }
            Err(e) => {
                let status = if e.is_timeout() { 504 } else { 502 };
                tracing::warn!(
                    destination = %destination.name,
                    error = %e,
                    status,
                    "Delivery failed"
                );
                ErrorInfo::new(status, e.to_string())
            }
        }
    }
}
