//! HTTP transport and discovery tests against a mock Freebox
//!
//! Uses `wiremock` to serve envelopes over real HTTP.

use freebox_exporter::error::ExporterError;
use freebox_exporter::freebox::discovery::discover_http;
use freebox_exporter::freebox::transport::{HttpTransport, Transport, AUTH_HEADER};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> HttpTransport {
    HttpTransport::new(reqwest::Client::new())
}

#[tokio::test]
async fn test_get_returns_envelope_result_and_sends_token() {
    // Given: A server answering only when the session header is present
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v10/system/"))
        .and(header(AUTH_HEADER, "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {"firmware_version": "4.8.5"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // When: Calling with a session token
    let url = format!("{}/api/v10/system/", server.uri());
    let result = transport().get(&url, Some("tok")).await.expect("success");

    // Then: The unwrapped result is returned
    assert_eq!(result["firmware_version"], "4.8.5");
}

#[tokio::test]
async fn test_unauthenticated_get_has_no_session_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v10/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {"challenge": "c"}
        })))
        .mount(&server)
        .await;

    let url = format!("{}/api/v10/login/", server.uri());
    transport().get(&url, None).await.expect("challenge");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("x-fbx-app-auth").is_none());
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v10/login/session/"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {"session_token": "s"}
        })))
        .mount(&server)
        .await;

    let url = format!("{}/api/v10/login/session/", server.uri());
    let body = json!({"app_id": "a", "password": "p"});
    let result = transport().post(&url, Some(&body), None).await.expect("session");

    assert_eq!(result["session_token"], "s");
    let requests = server.received_requests().await.expect("recording enabled");
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(sent, body);
}

#[tokio::test]
async fn test_auth_required_maps_to_sentinel() {
    // Given: The box rejects the session (HTTP 403 with an envelope)
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "error_code": "auth_required",
            "msg": "Il faut être connecté pour accéder à cette fonction"
        })))
        .mount(&server)
        .await;

    // When: Calling any endpoint
    let url = format!("{}/api/v10/system/", server.uri());
    let err = transport().get(&url, Some("old")).await.unwrap_err();

    // Then: The dedicated sentinel is returned
    assert!(matches!(err, ExporterError::AuthRequired));
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_other_error_codes_name_method_and_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error_code": "nodev",
            "msg": "Invalid interface"
        })))
        .mount(&server)
        .await;

    let url = format!("{}/api/v10/lan/browser/nope/", server.uri());
    let err = transport().get(&url, Some("t")).await.unwrap_err();

    match err {
        ExporterError::Api {
            method,
            url: failed_url,
            code,
            message,
        } => {
            assert_eq!(method, "GET");
            assert_eq!(failed_url, url);
            assert_eq!(code, "nodev");
            assert_eq!(message, "Invalid interface");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let url = format!("{}/api/v10/system/", server.uri());
    let err = transport().get(&url, None).await.unwrap_err();

    assert!(matches!(err, ExporterError::Json(_)));
    assert!(!err.is_auth_error());
}

#[tokio::test]
async fn test_http_discovery_decodes_api_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api_version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "box_model_name": "Freebox v7 (r1)",
            "api_base_url": "/api/",
            "https_port": 4242,
            "device_name": "Freebox Server",
            "https_available": true,
            "box_model": "fbxgw7-r1/full",
            "api_domain": "abcd.fbxos.fr",
            "uid": "23b86ec8091013d668829fe12791fdab",
            "api_version": "10.2",
            "device_type": "FreeboxServer7,1"
        })))
        .mount(&server)
        .await;

    let url = format!("{}/api_version", server.uri());
    let api = discover_http(&reqwest::Client::new(), &url)
        .await
        .expect("discovered");

    assert_eq!(api.api_domain, "abcd.fbxos.fr");
    assert_eq!(api.https_port, 4242);
    assert!(api.is_valid());
}

#[tokio::test]
async fn test_http_discovery_rejects_box_without_https() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api_version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_base_url": "/api/",
            "https_port": 0,
            "device_name": "Freebox Server",
            "https_available": false,
            "api_domain": "abcd.fbxos.fr",
            "uid": "u",
            "api_version": "6.0",
            "device_type": "FreeboxServer1,2"
        })))
        .mount(&server)
        .await;

    let url = format!("{}/api_version", server.uri());
    let err = discover_http(&reqwest::Client::new(), &url)
        .await
        .unwrap_err();

    assert!(matches!(err, ExporterError::Discovery(_)));
    assert_eq!(err.exit_code(), 1);
}
