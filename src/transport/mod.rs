//! Transports that feed requests into the pipeline.
//!
//! Each transport implements [`RequestSource`](crate::hook::RequestSource)
//! for its native request type so the rest of the crate only ever sees a
//! [`RawRequest`](crate::hook::RawRequest):
//!
//! - [`gateway`]: serverless gateway proxy events
//! - [`server`]: buffered `http::Request`s from the axum server
//! - [`event_loop`]: HTTP/1.1 parsed directly off a TCP socket

pub mod event_loop;
pub mod gateway;
pub mod server;

pub use event_loop::{EventLoopServer, WireError, WireRequest};
pub use gateway::{handle_gateway_event, GatewayProxyRequest, GatewayProxyResponse};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::http::Request;
    use bytes::Bytes;

    use super::*;
    use crate::hook::{BodyEncoding, HookData, RawRequest};

    const BODY: &str = r#"{"text":"build passed"}"#;

    fn gateway_event() -> GatewayProxyRequest {
        GatewayProxyRequest {
            http_method: "POST".into(),
            headers: Some(HashMap::from([
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Content-Length".to_string(), BODY.len().to_string()),
            ])),
            query_string_parameters: Some(HashMap::from([
                ("token".to_string(), "T".to_string()),
                ("adapters".to_string(), "ops,dev".to_string()),
            ])),
            body: Some(BODY.to_string()),
            ..Default::default()
        }
    }

    fn server_request() -> Request<Bytes> {
        Request::builder()
            .method("POST")
            .uri("/webhook/canonical?token=T&adapters=ops%2Cdev")
            .header("content-type", "application/json")
            .header("content-length", BODY.len())
            .body(Bytes::from_static(BODY.as_bytes()))
            .unwrap()
    }

    fn wire_request() -> WireRequest {
        let raw = format!(
            "POST /webhook/canonical?adapters=ops,dev&token=T HTTP/1.1\r\nCONTENT-TYPE: application/json\r\nContent-Length: {}\r\n\r\n{}",
            BODY.len(),
            BODY
        );
        WireRequest::parse(raw.as_bytes(), 4096).unwrap().unwrap()
    }

    #[test]
    fn test_transports_agree() {
        let from_gateway = RawRequest::adapt(&gateway_event());
        let from_server = RawRequest::adapt(&server_request());
        let from_wire = RawRequest::adapt(&wire_request());

        assert_eq!(from_gateway, from_server);
        assert_eq!(from_server, from_wire);
    }

    #[test]
    fn test_transports_assemble_same_hook_data() {
        let a = HookData::assemble(&RawRequest::adapt(&gateway_event()), BodyEncoding::Json);
        let b = HookData::assemble(&RawRequest::adapt(&wire_request()), BodyEncoding::Json);

        assert_eq!(a, b);
        assert_eq!(a.token, "T");
        assert_eq!(a.output_names, vec!["ops".to_string(), "dev".to_string()]);
    }
}
