//! Webhook provider normalizers.
//!
//! # Responsibilities
//! - Define the contract a provider module satisfies
//! - Look up the provider (and its body encoding) for an input type
//!
//! # Design Decisions
//! - Providers are trait objects registered by key at startup
//! - The registry is immutable once the server is running
//! - Key lookup is case-insensitive

pub mod canonical;
pub mod message;
pub mod registry;

pub use canonical::CanonicalNormalizer;
pub use message::{Attachment, CanonicalMessage, Field};
pub use registry::ProviderRegistry;

use crate::hook::{BodyEncoding, HookData};

/// Why a provider could not turn a request into a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("empty request body")]
    EmptyBody,
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// One webhook source.
pub trait Normalizer: Send + Sync + std::fmt::Debug {
    /// Input type this provider answers to.
    fn key(&self) -> &str;

    /// How the provider's producer wraps its body.
    fn body_encoding(&self) -> BodyEncoding;

    /// Map the decoded request into a canonical message.
    fn normalize(&self, hook: &HookData) -> Result<CanonicalMessage, NormalizeError>;
}
