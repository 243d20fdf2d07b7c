//! Per-call processing shared by every transport.
//!
//! # Data Flow
//! ```text
//! RawRequest + route key
//!     → ProviderRegistry (input type → normalizer, body encoding)
//!     → HookData::assemble
//!     → Normalizer::normalize
//!     → destinations (adapters, then url) → Delivery, concurrently
//!     → aggregate → ResponseInfo
//! ```
//!
//! # Design Decisions
//! - Every destination is attempted; one failure never stops the others
//! - Outcomes keep destination order regardless of completion order
//! - Unknown input types and bad payloads are reported as outcomes (404, 400)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::config::{GatewayConfig, OutputConfig};
use crate::delivery::{Delivery, Destination, HttpDelivery};
use crate::hook::query::QUERY_PARAM_INPUT_TYPE;
use crate::hook::{aggregate, BodyEncoding, ErrorInfo, HookData, RawRequest, ResponseInfo};
use crate::observability::metrics;
use crate::provider::ProviderRegistry;

/// Turns raw requests into aggregated responses.
#[derive(Clone)]
pub struct HookPipeline {
    registry: Arc<ProviderRegistry>,
    outputs: Arc<HashMap<String, String>>,
    delivery: Arc<dyn Delivery>,
}

impl HookPipeline {
    pub fn new(
        registry: ProviderRegistry,
        outputs: &[OutputConfig],
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        let outputs = outputs
            .iter()
            .map(|o| (o.name.trim().to_lowercase(), o.url.clone()))
            .collect();
        Self {
            registry: Arc::new(registry),
            outputs: Arc::new(outputs),
            delivery,
        }
    }

    /// Pipeline with configured routes, outputs and HTTP delivery.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let delivery = HttpDelivery::new(Duration::from_secs(config.timeouts.delivery_secs));
        Self::new(
            ProviderRegistry::from_routes(&config.routes),
            &config.outputs,
            Arc::new(delivery),
        )
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Body encoding of the provider behind `key`.
    pub fn encoding_for(&self, key: &str) -> Option<BodyEncoding> {
        self.registry.get(key).map(|p| p.body_encoding())
    }

    /// Provider key: the route segment if given, else the `inputType` parameter.
    pub fn resolve_key(route_key: Option<&str>, raw: &RawRequest) -> Option<String> {
        route_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or_else(|| {
                raw.query_params
                    .get(QUERY_PARAM_INPUT_TYPE)
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
            })
            .map(str::to_string)
    }

    /// Run one request through normalization and delivery.
    pub async fn dispatch(&self, route_key: Option<&str>, raw: &RawRequest) -> ResponseInfo {
        let key = Self::resolve_key(route_key, raw);
        let provider = match key.as_deref().and_then(|k| self.registry.get(k)) {
            Some(p) => p,
            None => {
                let key = key.unwrap_or_default();
                tracing::warn!(input_type = %key, "No provider for input type");
                let hook = HookData::assemble(raw, BodyEncoding::default());
                let message = format!("unknown input type: {key}");
                return aggregate(hook, vec![ErrorInfo::new(404, message)]);
            }
        };

        let mut hook = HookData::assemble(raw, provider.body_encoding());
        let message = match provider.normalize(&hook) {
            Ok(m) => m,
            Err(e) => {
                tracing::info!(input_type = %provider.key(), error = %e, "Payload rejected");
                return aggregate(hook, vec![ErrorInfo::new(400, e.to_string())]);
            }
        };

        let destinations = self.destinations(&hook);
        let (message_ref, hook_ref) = (&message, &hook);
        let outcomes = join_all(destinations.iter().map(|target| async move {
            let outcome = match target {
                Ok(destination) => self.delivery.deliver(destination, message_ref, hook_ref).await,
                Err(missing) => missing.clone(),
            };
            let name = match target {
                Ok(destination) => destination.name.as_str(),
                Err(_) => "unknown",
            };
            metrics::record_delivery(name, outcome.status_code);
            outcome
        }))
        .await;

        hook.canonical_message = Some(message);
        aggregate(hook, outcomes)
    }

    /// Named adapters in request order, then the ad-hoc `url`.
    ///
    /// Unknown adapter names resolve to a ready-made 404 outcome.
    pub fn destinations(&self, hook: &HookData) -> Vec<Result<Destination, ErrorInfo>> {
        let mut targets: Vec<Result<Destination, ErrorInfo>> = hook
            .output_names
            .iter()
            .map(|name| match self.outputs.get(&name.to_lowercase()) {
                Some(url) => Ok(Destination {
                    name: name.clone(),
                    url: url.clone(),
                }),
                None => Err(ErrorInfo::new(
                    404,
                    format!("unknown output adapter: {name}"),
                )),
            })
            .collect();

        if !hook.output_url.is_empty() {
            let name = if hook.output_type.is_empty() {
                "url".to_string()
            } else {
                hook.output_type.clone()
            };
            targets.push(Ok(Destination {
                name,
                url: hook.output_url.clone(),
            }));
        }
        targets
    }
}
