//! Response encoding for the axum server.
//!
//! # Design Decisions
//! - The aggregated status becomes the HTTP status; out-of-range codes map to 500
//! - The body is always the JSON-serialized `ResponseInfo`

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::hook::ResponseInfo;

impl IntoResponse for ResponseInfo {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            self.to_body(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{aggregate, ErrorInfo, HookData};

    #[tokio::test]
    async fn test_status_and_body() {
        let info = aggregate(HookData::default(), vec![ErrorInfo::new(503, "down")]);
        let response = info.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["statusCode"], 503);
    }

    #[test]
    fn test_out_of_range_status() {
        let info = aggregate(HookData::default(), vec![ErrorInfo::new(1000, "")]);
        assert_eq!(info.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
