//! Error message quality tests
//!
//! Verifies that errors are actionable and map to the right exit codes.

use freebox_exporter::error::ExporterError;
use freebox_exporter::freebox::api::query_version;
use freebox_exporter::freebox::types::ApiVersion;

fn api(version: &str) -> ApiVersion {
    ApiVersion {
        api_version: version.to_string(),
        ..ApiVersion::default()
    }
}

#[test]
fn test_version_errors_quote_the_input() {
    // Given: A malformed advertised version
    // When: Negotiating
    let err = query_version(&api("ten"), 0).unwrap_err();

    // Then: The message names the bad value
    let msg = err.to_string();
    assert!(msg.contains("could not decode"), "got: {msg}");
    assert!(msg.contains("\"ten\""), "got: {msg}");
}

#[test]
fn test_override_error_names_both_versions() {
    let err = query_version(&api("8.0"), 9).unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains('9') && msg.contains('8'), "got: {msg}");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_api_error_includes_context() {
    let err = ExporterError::Api {
        method: "GET".to_string(),
        url: "https://fbx.example:4242/api/v10/wifi/ap/".to_string(),
        code: "internal_error".to_string(),
        message: "Erreur interne".to_string(),
    };

    let msg = err.to_string();
    assert!(msg.contains("GET"));
    assert!(msg.contains("wifi/ap/"));
    assert!(msg.contains("internal_error"));
    assert!(msg.contains("Erreur interne"));
}

#[test]
fn test_authorization_denied_gives_guidance() {
    let err = ExporterError::AuthorizationDenied("timeout".to_string());

    let msg = err.to_string();
    assert!(msg.contains("timeout"));
    assert!(msg.contains("approve"), "should tell the user what to do: {msg}");
}

#[test]
fn test_only_auth_sentinels_are_recoverable() {
    assert!(ExporterError::AuthRequired.is_auth_error());
    assert!(ExporterError::InvalidToken.is_auth_error());
    assert!(!ExporterError::SessionRejected("x".into()).is_auth_error());
    assert!(!ExporterError::DiscoveryTimeout.is_auth_error());
}

#[test]
fn test_exit_codes_split_config_and_network() {
    // Operator-fixable problems
    assert_eq!(ExporterError::Config("bad".into()).exit_code(), 2);
    assert_eq!(ExporterError::Version("bad".into()).exit_code(), 2);
    assert_eq!(
        ExporterError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "ro")).exit_code(),
        2
    );

    // Network or box problems
    assert_eq!(ExporterError::DiscoveryTimeout.exit_code(), 1);
    assert_eq!(ExporterError::Discovery("unreachable".into()).exit_code(), 1);
    assert_eq!(ExporterError::SessionRejected("x".into()).exit_code(), 1);
    assert_eq!(ExporterError::Mdns("socket".into()).exit_code(), 1);
}

#[test]
fn test_json_error_is_wrapped() {
    let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err: ExporterError = json_err.into();

    assert!(err.to_string().starts_with("JSON error"));
}
