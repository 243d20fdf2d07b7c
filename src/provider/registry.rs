//! Provider lookup by input type.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RouteConfig;
use crate::provider::{CanonicalNormalizer, Normalizer};

/// Immutable map from input type to provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Normalizer>>,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CanonicalNormalizer::default()));
        registry
    }

    /// Built-ins plus one canonical provider per configured route.
    pub fn from_routes(routes: &[RouteConfig]) -> Self {
        let mut registry = Self::with_defaults();
        for route in routes {
            registry.register(Arc::new(CanonicalNormalizer::new(
                route.input_type.trim(),
                route.body_encoding,
            )));
        }
        registry
    }

    /// Add a provider. A provider with the same key is replaced.
    pub fn register(&mut self, provider: Arc<dyn Normalizer>) {
        let key = normalize_key(provider.key());
        if self.providers.insert(key.clone(), provider).is_some() {
            tracing::debug!(input_type = %key, "Replaced provider");
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Normalizer>> {
        self.providers.get(&normalize_key(key)).cloned()
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.providers.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
