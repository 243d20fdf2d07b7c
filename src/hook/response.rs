//! Aggregation of downstream delivery outcomes into one response.
//!
//! # Responsibilities
//! - Reduce per-destination outcomes to a single HTTP status
//! - Serialize the hook data and outcomes as the response body
//!
//! # Design Decisions
//! - No outcomes means success (200)
//! - Otherwise the highest status wins, independent of order
//! - Serialization failure yields an empty body, never an error

use bytes::Bytes;
use serde::Serialize;

use crate::hook::data::{serialize_base64, HookData};

pub const STATUS_OK: u16 = 200;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub status_code: u16,
    #[serde(serialize_with = "serialize_base64")]
    pub body: Bytes,
}

impl ErrorInfo {
    pub fn new(status_code: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }
}

/// What the transport sends back for one inbound call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInfo {
    pub hook_data: HookData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<ErrorInfo>,
    pub status_code: u16,
}

/// Overall status for a set of outcomes.
pub fn max_status_code(errors: &[ErrorInfo]) -> u16 {
    match errors {
        [] => STATUS_OK,
        [only] => only.status_code,
        _ => errors
            .iter()
            .map(|e| e.status_code)
            .max()
            .unwrap_or(STATUS_OK),
    }
}

/// Fold delivery outcomes into the response for this call.
pub fn aggregate(hook_data: HookData, errors: Vec<ErrorInfo>) -> ResponseInfo {
    let status_code = max_status_code(&errors);
    ResponseInfo {
        hook_data,
        responses: errors,
        status_code,
    }
}

impl ResponseInfo {
    /// JSON body for the transport response. Empty if serialization fails.
    pub fn to_body(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize response");
            Vec::new()
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
