use delegering_chat::api::{parse_reply, ChatError};
use delegering_chat::config::Config;
use serde_json::json;
use std::time::Duration;

fn config(api_url: &str, log_level: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        request_timeout: Duration::from_secs(60),
        log_path: None,
        log_level: log_level.to_string(),
    }
}

#[test]
fn test_config_validation_rejects_non_http_urls() {
    assert!(config("localhost:10000", "info").validate().is_err());
    assert!(config("ws://localhost:10000", "info").validate().is_err());
}

#[test]
fn test_config_validation_allows_local_and_remote_http() {
    assert!(config("http://localhost:10000", "debug").validate().is_ok());
    assert!(config("https://utbildning.example.se", "warn").validate().is_ok());
}

#[test]
fn test_chat_endpoint_is_appended_once() {
    assert_eq!(
        config("http://127.0.0.1:10000/", "info").chat_endpoint(),
        "http://127.0.0.1:10000/api/chat"
    );
    assert_eq!(
        config("https://example.se/api/chat", "info").chat_endpoint(),
        "https://example.se/api/chat"
    );
}

#[test]
fn test_structured_reply_is_passed_through() {
    let payload = parse_reply(&json!({"reply": {
        "textContent": "Välj ett alternativ.",
        "interactiveElement": {"type": "suggestions", "data": {"suggestions": [{"label": "Ja"}]}}
    }}))
    .expect("structured reply parses");
    assert_eq!(payload.text_content, "Välj ett alternativ.");
    assert_eq!(
        payload.interactive_element,
        Some(json!({"type": "suggestions", "data": {"suggestions": [{"label": "Ja"}]}}))
    );
}

#[test]
fn test_reply_without_reply_field_is_malformed() {
    let err = parse_reply(&json!({"message": "fel nyckel"})).expect_err("missing reply");
    assert!(matches!(err, ChatError::MalformedReply(_)));
}
