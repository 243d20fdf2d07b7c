//! Transport-agnostic request representation.
//!
//! # Responsibilities
//! - Define the capability set every inbound transport exposes
//! - Map a transport request into a single `RawRequest` value
//!
//! # Design Decisions
//! - Header names are lower-cased once here; later lookups are exact
//! - Query parameters are single-valued, last write wins, first position kept
//! - The body is always present (empty, never absent)

use std::collections::BTreeMap;

use bytes::Bytes;

/// Capabilities an inbound transport request must expose.
///
/// Implemented by the gateway event, the generic server request and the
/// event-loop wire request. Absent fields are reported as empty, never as
/// errors.
pub trait RequestSource {
    /// Header name/value pairs as the transport holds them.
    fn headers(&self) -> Vec<(String, String)>;

    /// Query parameters in transport order. Duplicates are allowed.
    fn query_params(&self) -> Vec<(String, String)>;

    /// Raw body bytes, possibly base64-encoded.
    fn body(&self) -> Bytes;

    /// Whether the transport flagged the body as base64.
    fn is_base64_encoded(&self) -> bool {
        false
    }

    /// Last value supplied for `name`, if any.
    fn query_param(&self, name: &str) -> Option<String> {
        self.query_params()
            .into_iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value)
            .last()
    }
}

/// Ordered, single-valued query parameter map.
///
/// Equality ignores order: transports disagree on parameter ordering.
#[derive(Debug, Clone, Default, Eq)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl PartialEq for QueryParams {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter. A repeated key overwrites the earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// One inbound call, reduced to what decoding and extraction need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    /// Lower-cased header name to value.
    pub headers: BTreeMap<String, String>,
    pub query_params: QueryParams,
    pub body: Bytes,
    pub is_base64_encoded: bool,
}

impl RawRequest {
    /// Structural mapping from any transport request.
    pub fn adapt<S: RequestSource + ?Sized>(source: &S) -> Self {
        let headers = source
            .headers()
            .into_iter()
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value))
            .collect();

        Self {
            headers,
            query_params: source.query_params().into_iter().collect(),
            body: source.body(),
            is_base64_encoded: source.is_base64_encoded(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        headers: Vec<(String, String)>,
        query: Vec<(String, String)>,
    }

    impl RequestSource for Fixture {
        fn headers(&self) -> Vec<(String, String)> {
            self.headers.clone()
        }

        fn query_params(&self) -> Vec<(String, String)> {
            self.query.clone()
        }

        fn body(&self) -> Bytes {
            Bytes::new()
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_headers_lowercased() {
        let fixture = Fixture {
            headers: pairs(&[("Content-Type", "application/json"), ("X-Trace", "1")]),
            query: vec![],
        };
        let raw = RawRequest::adapt(&fixture);

        assert_eq!(raw.content_type(), Some("application/json"));
        assert_eq!(raw.header("x-trace"), Some("1"));
        assert_eq!(raw.header("X-TRACE"), Some("1"));
        assert!(raw.body.is_empty());
        assert!(!raw.is_base64_encoded);
    }

    #[test]
    fn test_query_last_write_wins() {
        let fixture = Fixture {
            headers: vec![],
            query: pairs(&[("token", "a"), ("url", "u"), ("token", "b")]),
        };
        let raw = RawRequest::adapt(&fixture);

        assert_eq!(raw.query_params.get("token"), Some("b"));
        assert_eq!(raw.query_params.len(), 2);
        let keys: Vec<&str> = raw.query_params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["token", "url"]);
        assert_eq!(fixture.query_param("token").as_deref(), Some("b"));
        assert_eq!(fixture.query_param("missing"), None);
    }

    #[test]
    fn test_query_equality_ignores_order() {
        let a: QueryParams = [("a", "1"), ("b", "2")].into_iter().collect();
        let b: QueryParams = [("b", "2"), ("a", "1")].into_iter().collect();
        let c: QueryParams = [("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
