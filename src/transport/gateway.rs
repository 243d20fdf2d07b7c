//! Serverless HTTP gateway events.
//!
//! # Responsibilities
//! - Deserialize the gateway's proxy request event
//! - Unwrap the JSON envelope the gateway puts around form-encoded requests
//! - Encode a `ResponseInfo` as the gateway's proxy response
//!
//! # Design Decisions
//! - Null maps in the event are treated as empty
//! - Envelope unwrapping stays here; the body decoder never sees it

use std::collections::HashMap;
use std::time::Instant;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::hook::decode::decode_base64;
use crate::hook::query::QUERY_PARAM_INPUT_TYPE;
use crate::hook::{BodyEncoding, RawRequest, RequestSource, ResponseInfo};
use crate::observability::metrics;
use crate::pipeline::HookPipeline;

/// Path parameter naming the provider.
pub const PATH_PARAM_INPUT_TYPE: &str = "inputType";

/// Gateway proxy integration request event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayProxyRequest {
    pub resource: String,
    pub path: String,
    pub http_method: String,
    pub headers: Option<HashMap<String, String>>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub path_parameters: Option<HashMap<String, String>>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

/// Gateway proxy integration response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayProxyResponse {
    pub is_base64_encoded: bool,
    pub status_code: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    body: String,
}

impl RequestSource for GatewayProxyRequest {
    fn headers(&self) -> Vec<(String, String)> {
        // Sorted so case-variant duplicates resolve the same way every time.
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        headers.sort();
        headers
    }

    fn query_params(&self) -> Vec<(String, String)> {
        // Sorted so repeated adaptation of one event is deterministic.
        let mut params: Vec<(String, String)> = self
            .query_string_parameters
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        params.sort();
        params
    }

    fn body(&self) -> Bytes {
        self.body
            .as_ref()
            .map(|b| Bytes::copy_from_slice(b.as_bytes()))
            .unwrap_or_default()
    }

    fn is_base64_encoded(&self) -> bool {
        self.is_base64_encoded
    }
}

impl GatewayProxyRequest {
    /// Provider key from the path parameters, else the query.
    pub fn input_type(&self) -> Option<&str> {
        fn lookup<'a>(params: &'a Option<HashMap<String, String>>, name: &str) -> Option<&'a str> {
            params
                .as_ref()
                .and_then(|p| p.get(name))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        }

        lookup(&self.path_parameters, PATH_PARAM_INPUT_TYPE)
            .or_else(|| lookup(&self.query_string_parameters, QUERY_PARAM_INPUT_TYPE))
    }

    /// Adapt the event for a route using `encoding`.
    ///
    /// For form-encoded routes the gateway delivers the original request as
    /// a JSON envelope; its inner `body` replaces the event body.
    pub fn to_raw_request(&self, encoding: BodyEncoding) -> RawRequest {
        let mut raw = RawRequest::adapt(self);
        if encoding.is_gateway_enveloped() {
            if let Some(inner) = unwrap_envelope(&raw) {
                raw.body = inner;
                raw.is_base64_encoded = false;
            }
        }
        raw
    }
}

fn unwrap_envelope(raw: &RawRequest) -> Option<Bytes> {
    let bytes = if raw.is_base64_encoded {
        Bytes::from(decode_base64(&raw.body).ok()?)
    } else {
        raw.body.clone()
    };
    let envelope: Envelope = serde_json::from_slice(&bytes).ok()?;
    Some(Bytes::from(envelope.body))
}

impl From<&ResponseInfo> for GatewayProxyResponse {
    fn from(info: &ResponseInfo) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            is_base64_encoded: false,
            status_code: info.status_code,
            body: String::from_utf8_lossy(&info.to_body()).into_owned(),
            headers,
        }
    }
}

/// Handle one gateway event end to end.
pub async fn handle_gateway_event(
    pipeline: &HookPipeline,
    event: &GatewayProxyRequest,
) -> GatewayProxyResponse {
    let start = Instant::now();
    let key = event.input_type();
    let encoding = key
        .and_then(|k| pipeline.encoding_for(k))
        .unwrap_or_default();

    let raw = event.to_raw_request(encoding);
    let info = pipeline.dispatch(key, &raw).await;

    let input_type = key.unwrap_or("");
    metrics::record_request("gateway", input_type, info.status_code, start);
    tracing::info!(
        input_type = %input_type,
        status = info.status_code,
        "Gateway event handled"
    );
    GatewayProxyResponse::from(&info)
}
