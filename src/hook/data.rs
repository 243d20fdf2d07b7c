//! Unified per-call hook data handed to provider normalizers.

use bytes::Bytes;
use serde::{Serialize, Serializer};

use crate::hook::decode::decode_body;
use crate::hook::encoding::BodyEncoding;
use crate::hook::query::{extract_query_params, CustomQueryParams};
use crate::hook::raw::RawRequest;
use crate::provider::CanonicalMessage;

/// Everything a provider needs to know about one inbound webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookData {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub input_type: String,

    /// Decoded message bytes (`inputBody` / `inputMessage`).
    #[serde(
        skip_serializing_if = "Bytes::is_empty",
        serialize_with = "serialize_base64"
    )]
    pub input_body: Bytes,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub output_type: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub output_url: String,

    /// Destination adapter names, in request order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_names: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,

    #[serde(skip_serializing_if = "CustomQueryParams::is_empty")]
    pub custom_query_params: CustomQueryParams,

    /// Filled in once the provider has normalized the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_message: Option<CanonicalMessage>,
}

impl HookData {
    /// Compose query extraction and body decoding for one request.
    pub fn assemble(raw: &RawRequest, encoding: BodyEncoding) -> Self {
        let (fixed, custom_query_params) = extract_query_params(&raw.query_params);
        let input_body = decode_body(encoding, &raw.headers, &raw.body, raw.is_base64_encoded);

        Self {
            input_type: fixed.input_type,
            input_body,
            output_type: fixed.output_type,
            output_url: fixed.output_url,
            output_names: fixed.output_names,
            token: fixed.token,
            custom_query_params,
            canonical_message: None,
        }
    }

    /// First value of a custom parameter, looked up case-insensitively.
    pub fn custom_param(&self, name: &str) -> Option<&str> {
        self.custom_query_params
            .get(&name.trim().to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

pub(crate) fn serialize_base64<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    serializer.serialize_str(&STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::raw::QueryParams;

    fn raw_request() -> RawRequest {
        let mut raw = RawRequest {
            body: Bytes::from_static(b"payload=%7B%22text%22%3A%22hi%22%7D"),
            ..Default::default()
        };
        raw.query_params = [
            ("inputType", "travisci"),
            ("adapters", "ops,dev"),
            ("url", " https://chat.example/hook "),
            ("channel", "alerts"),
        ]
        .into_iter()
        .collect::<QueryParams>();
        raw
    }

    #[test]
    fn test_assemble_composes_query_and_body() {
        let hook = HookData::assemble(&raw_request(), BodyEncoding::UrlEncodedJsonPayload);

        assert_eq!(hook.input_type, "travisci");
        assert_eq!(hook.output_url, "https://chat.example/hook");
        assert_eq!(hook.output_names, vec!["ops", "dev"]);
        assert_eq!(&hook.input_body[..], br#"{"text":"hi"}"#);
        assert_eq!(hook.custom_param("CHANNEL"), Some("alerts"));
        assert!(hook.canonical_message.is_none());
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let raw = raw_request();
        let first = HookData::assemble(&raw, BodyEncoding::UrlEncodedJsonPayload);
        let second = HookData::assemble(&raw, BodyEncoding::UrlEncodedJsonPayload);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let json = serde_json::to_value(HookData::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));

        let hook = HookData::assemble(&raw_request(), BodyEncoding::UrlEncodedJsonPayload);
        let json = serde_json::to_value(&hook).unwrap();
        assert_eq!(json["inputType"], "travisci");
        assert_eq!(json["outputUrl"], "https://chat.example/hook");
        assert_eq!(json["customQueryParams"]["channel"][0], "alerts");
        // eyJ0ZXh0IjoiaGkifQ== is {"text":"hi"}
        assert_eq!(json["inputBody"], "eyJ0ZXh0IjoiaGkifQ==");
    }
}
