//! Body encoding conventions used by webhook producers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a provider route expects its request body to be wrapped.
///
/// Chosen by the route configuration, never inferred from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// Raw JSON body.
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`, body handed through as-is.
    UrlEncoded,
    /// Form with the JSON document in its `payload` field.
    UrlEncodedJsonPayload,
    /// `payload` form, or raw JSON when the content type says so.
    #[serde(rename = "url_encoded_or_json")]
    UrlEncodedJsonPayloadOrJson,
    /// Rails-style form; decoded like `UrlEncodedJsonPayload`.
    UrlEncodedRails,
}

impl BodyEncoding {
    pub const ALL: [BodyEncoding; 5] = [
        BodyEncoding::Json,
        BodyEncoding::UrlEncoded,
        BodyEncoding::UrlEncodedJsonPayload,
        BodyEncoding::UrlEncodedJsonPayloadOrJson,
        BodyEncoding::UrlEncodedRails,
    ];

    /// Configuration name of the encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyEncoding::Json => "json",
            BodyEncoding::UrlEncoded => "url_encoded",
            BodyEncoding::UrlEncodedJsonPayload => "url_encoded_json_payload",
            BodyEncoding::UrlEncodedJsonPayloadOrJson => "url_encoded_or_json",
            BodyEncoding::UrlEncodedRails => "url_encoded_rails",
        }
    }

    /// Encodings for which a serverless gateway wraps the whole request in a
    /// JSON envelope.
    pub fn is_gateway_enveloped(&self) -> bool {
        matches!(
            self,
            BodyEncoding::UrlEncoded
                | BodyEncoding::UrlEncodedJsonPayload
                | BodyEncoding::UrlEncodedRails
        )
    }
}

impl fmt::Display for BodyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown body encoding: {0}")]
pub struct UnknownEncoding(pub String);

impl FromStr for BodyEncoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        BodyEncoding::ALL
            .into_iter()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| UnknownEncoding(s.to_string()))
    }
}
