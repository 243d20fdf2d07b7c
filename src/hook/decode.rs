//! Request body decoding.
//!
//! # Responsibilities
//! - Undo transport-level base64 encoding
//! - Unwrap the JSON document from `payload=` forms
//! - Short-circuit to the raw body when the content type is JSON
//!
//! # Design Decisions
//! - Never fails: malformed input degrades to an empty body, and the
//!   provider's JSON parsing reports the problem
//! - The whole policy lives in one `match` over `BodyEncoding`
//! - Empty output cannot tell "bad input" from "no payload field"

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use percent_encoding::percent_decode;

use crate::hook::encoding::BodyEncoding;

/// Form field carrying the JSON document.
pub const PAYLOAD_FIELD: &str = "payload";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Decode `body` into the message bytes a provider normalizer will parse.
///
/// `headers` must be keyed by lower-cased header name.
pub fn decode_body(
    encoding: BodyEncoding,
    headers: &BTreeMap<String, String>,
    body: &[u8],
    is_base64_encoded: bool,
) -> Bytes {
    let body = if is_base64_encoded {
        match decode_base64(body) {
            Ok(decoded) => Bytes::from(decoded),
            Err(e) => {
                tracing::debug!(error = %e, "Body flagged as base64 failed to decode");
                return Bytes::new();
            }
        }
    } else {
        Bytes::copy_from_slice(body)
    };

    let decoded = match encoding {
        BodyEncoding::Json | BodyEncoding::UrlEncoded => body,
        BodyEncoding::UrlEncodedJsonPayload | BodyEncoding::UrlEncodedRails => {
            form_payload(&body)
        }
        BodyEncoding::UrlEncodedJsonPayloadOrJson => {
            if is_json_content_type(headers) {
                body
            } else {
                form_payload(&body)
            }
        }
    };

    tracing::debug!(
        encoding = %encoding,
        body = %String::from_utf8_lossy(&decoded),
        "REQUEST_BODY"
    );
    decoded
}

/// Standard base64, ignoring CR and LF line breaks.
pub fn decode_base64(encoded: &[u8]) -> Result<Vec<u8>, base64::DecodeError> {
    let unwrapped: Vec<u8> = encoded
        .iter()
        .copied()
        .filter(|b| *b != b'\r' && *b != b'\n')
        .collect();
    STANDARD.decode(unwrapped)
}

fn is_json_content_type(headers: &BTreeMap<String, String>) -> bool {
    headers
        .get("content-type")
        .map(|ct| ct.trim().to_ascii_lowercase().contains(JSON_MEDIA_TYPE))
        .unwrap_or(false)
}

/// First `payload` value of a form body, or empty.
fn form_payload(body: &[u8]) -> Bytes {
    parse_form(body)
        .and_then(|fields| {
            fields
                .into_iter()
                .find(|(key, _)| key == PAYLOAD_FIELD.as_bytes())
                .map(|(_, value)| Bytes::from(value))
        })
        .unwrap_or_default()
}

/// Parse an `application/x-www-form-urlencoded` body into raw byte pairs.
///
/// Values keep their decoded bytes even when they are not UTF-8. Returns
/// `None` for bodies a strict form parser rejects: broken percent escapes
/// or `;` used as a separator.
pub fn parse_form(body: &[u8]) -> Option<Vec<(Vec<u8>, Vec<u8>)>> {
    let mut fields = Vec::new();
    for segment in body.split(|b| *b == b'&') {
        if segment.contains(&b';') || !has_valid_escapes(segment) {
            return None;
        }
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.iter().position(|b| *b == b'=') {
            Some(i) => (&segment[..i], &segment[i + 1..]),
            None => (segment, &[][..]),
        };
        fields.push((decode_component(key), decode_component(value)));
    }
    Some(fields)
}

fn decode_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|b| if *b == b'+' { b' ' } else { *b })
        .collect();
    percent_decode(&spaced).collect()
}

fn has_valid_escapes(segment: &[u8]) -> bool {
    let mut i = 0;
    while i < segment.len() {
        if segment[i] == b'%' {
            let valid = segment
                .get(i + 1..i + 3)
                .map(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .unwrap_or(false);
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
