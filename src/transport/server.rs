//! Generic HTTP server requests (`http::Request` with a buffered body).

use axum::http::Request;
use bytes::Bytes;

use crate::hook::RequestSource;

impl RequestSource for Request<Bytes> {
    fn headers(&self) -> Vec<(String, String)> {
        Request::headers(self)
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }

    fn query_params(&self) -> Vec<(String, String)> {
        parse_query(self.uri().query())
    }

    fn body(&self) -> Bytes {
        Request::body(self).clone()
    }
}

/// Decode a raw query string into pairs, in order.
pub fn parse_query(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}
