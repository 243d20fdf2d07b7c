//! Built-in provider whose payload already is a canonical message.

use crate::hook::{BodyEncoding, HookData};
use crate::provider::{CanonicalMessage, NormalizeError, Normalizer};

pub const CANONICAL_KEY: &str = "canonical";

/// Parses the decoded body directly as a `CanonicalMessage`.
///
/// Registered under `canonical` with a JSON body, and reused for any
/// configured route that only changes the key or the body encoding.
#[derive(Debug, Clone)]
pub struct CanonicalNormalizer {
    key: String,
    encoding: BodyEncoding,
}

impl CanonicalNormalizer {
    pub fn new(key: impl Into<String>, encoding: BodyEncoding) -> Self {
        Self {
            key: key.into(),
            encoding,
        }
    }
}

impl Default for CanonicalNormalizer {
    fn default() -> Self {
        Self::new(CANONICAL_KEY, BodyEncoding::Json)
    }
}

impl Normalizer for CanonicalNormalizer {
    fn key(&self) -> &str {
        &self.key
    }

    fn body_encoding(&self) -> BodyEncoding {
        self.encoding
    }

    fn normalize(&self, hook: &HookData) -> Result<CanonicalMessage, NormalizeError> {
        if hook.input_body.is_empty() {
            return Err(NormalizeError::EmptyBody);
        }

        let message: CanonicalMessage = serde_json::from_slice(&hook.input_body)
            .map_err(|e| NormalizeError::MalformedPayload(e.to_string()))?;

        if message.is_blank() {
            return Err(NormalizeError::MalformedPayload(
                "message has no title, text, activity or attachments".to_string(),
            ));
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn hook(body: &'static [u8]) -> HookData {
        HookData {
            input_body: Bytes::from_static(body),
            ..Default::default()
        }
    }

    #[test]
    fn test_parses_message() {
        let normalizer = CanonicalNormalizer::default();
        let message = normalizer
            .normalize(&hook(
                br#"{"title":"Build","text":"passed","attachments":[{"color":"00ff00","fields":[{"title":"branch","value":"main","short":true}]}]}"#,
            ))
            .unwrap();

        assert_eq!(message.title, "Build");
        assert_eq!(message.text, "passed");
        assert_eq!(message.attachments[0].fields[0].value, "main");
        assert!(message.attachments[0].fields[0].short);
    }

    #[test]
    fn test_empty_body_rejected() {
        let err = CanonicalNormalizer::default().normalize(&hook(b"")).unwrap_err();
        assert_eq!(err, NormalizeError::EmptyBody);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = CanonicalNormalizer::default()
            .normalize(&hook(b"payload=oops"))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedPayload(_)));
    }

    #[test]
    fn test_blank_message_is_malformed() {
        let err = CanonicalNormalizer::default()
            .normalize(&hook(br#"{"iconURL":"https://x/icon.png"}"#))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedPayload(_)));
    }
}
