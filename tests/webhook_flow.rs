//! End-to-end webhook flows over the HTTP server and gateway transports.

mod common;

use std::collections::HashMap;

use serde_json::Value;
use webhook_gateway::config::{OutputConfig, RouteConfig};
use webhook_gateway::hook::BodyEncoding;
use webhook_gateway::transport::{handle_gateway_event, GatewayProxyRequest};
use webhook_gateway::{GatewayConfig, HookPipeline};

use common::{spawn_http_server, start_mock_backend};

fn config_with_outputs(outputs: &[(&str, String)]) -> GatewayConfig {
    GatewayConfig {
        routes: vec![RouteConfig {
            input_type: "travisci".into(),
            body_encoding: BodyEncoding::UrlEncodedJsonPayload,
        }],
        outputs: outputs
            .iter()
            .map(|(name, url)| OutputConfig {
                name: name.to_string(),
                url: url.clone(),
            })
            .collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fan_out_reports_worst_status() {
    let ops = start_mock_backend(200, "ok").await;
    let dev = start_mock_backend(503, "down").await;
    let config = config_with_outputs(&[("ops", ops.url()), ("dev", dev.url())]);
    let (addr, _shutdown) = spawn_http_server(config).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhook/canonical?adapters=ops,dev"))
        .header("Content-Type", "application/json")
        .body(r#"{"text":"deploy finished"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 503);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["statusCode"], 503);
    let statuses: Vec<u64> = json["responses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["statusCode"].as_u64().unwrap())
        .collect();
    assert_eq!(statuses, vec![200, 503]);

    for backend in [&ops, &dev] {
        let received = backend.received();
        assert_eq!(received.len(), 1);
        let message: Value = serde_json::from_str(&received[0]).unwrap();
        assert_eq!(message["text"], "deploy finished");
    }
}

#[tokio::test]
async fn test_form_route_with_ad_hoc_url() {
    let chat = start_mock_backend(200, "ok").await;
    let (addr, _shutdown) = spawn_http_server(config_with_outputs(&[])).await;

    let form = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("payload", r#"{"text":"build #7 passed"}"#)
        .finish();
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhook/travisci"))
        .query(&[("url", chat.url()), ("channel", "#builds".to_string())])
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["hookData"]["customQueryParams"]["channel"][0], "#builds");
    assert_eq!(json["hookData"]["canonicalMessage"]["text"], "build #7 passed");

    let message: Value = serde_json::from_str(&chat.received()[0]).unwrap();
    assert_eq!(message["text"], "build #7 passed");
}

#[tokio::test]
async fn test_unreachable_destination_is_bad_gateway() {
    let (addr, _shutdown) = spawn_http_server(config_with_outputs(&[])).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhook/canonical"))
        .query(&[("url", "http://127.0.0.1:1/hook")])
        .body(r#"{"text":"x"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 502);
}

#[tokio::test]
async fn test_malformed_payload_is_bad_request() {
    let chat = start_mock_backend(200, "ok").await;
    let (addr, _shutdown) = spawn_http_server(config_with_outputs(&[])).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhook/travisci"))
        .query(&[("url", chat.url())])
        .body("payload=%ZZ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert!(chat.received().is_empty());
}

#[tokio::test]
async fn test_gateway_event_envelope() {
    let chat = start_mock_backend(200, "ok").await;
    let pipeline = HookPipeline::from_config(&config_with_outputs(&[("chat", chat.url())]));

    let envelope = serde_json::json!({
        "body": "payload=%7B%22text%22%3A%22from%20the%20gateway%22%7D",
        "headers": {"Content-Type": "application/x-www-form-urlencoded"},
    });
    let event = GatewayProxyRequest {
        http_method: "POST".into(),
        path_parameters: Some(HashMap::from([(
            "inputType".to_string(),
            "travisci".to_string(),
        )])),
        query_string_parameters: Some(HashMap::from([(
            "adapters".to_string(),
            "chat".to_string(),
        )])),
        body: Some(envelope.to_string()),
        ..Default::default()
    };

    let response = handle_gateway_event(&pipeline, &event).await;

    assert_eq!(response.status_code, 200);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["hookData"]["canonicalMessage"]["text"], "from the gateway");
    assert_eq!(chat.received().len(), 1);
}
