use super::error::ChatError;
use super::legacy;
use serde_json::Value;

/// Assistant reply as delivered by the backend, before interpretation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplyPayload {
    pub text_content: String,
    /// Raw `{type, data}` object; validated later by the interpreter.
    pub interactive_element: Option<Value>,
}

impl ReplyPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text_content: text.into(),
            interactive_element: None,
        }
    }
}

/// Accepts `{"reply": {textContent, interactiveElement}}` and the legacy
/// `{"reply": "<text possibly embedding JSON>"}`.
pub fn parse_reply(body: &Value) -> Result<ReplyPayload, ChatError> {
    match body.get("reply") {
        Some(Value::Object(reply)) => {
            let text_content = match reply.get("textContent") {
                None | Some(Value::Null) => {
                    return Err(ChatError::malformed("reply has no textContent"))
                }
                Some(Value::String(text)) => text.clone(),
                Some(other) => {
                    return Err(ChatError::malformed(format!(
                        "textContent is not a string: {other}"
                    )))
                }
            };
            let interactive_element = reply
                .get("interactiveElement")
                .filter(|element| !element.is_null())
                .cloned();
            Ok(ReplyPayload {
                text_content,
                interactive_element,
            })
        }
        Some(Value::String(raw)) => {
            let extracted = legacy::extract(raw);
            Ok(ReplyPayload {
                text_content: extracted.text_content,
                interactive_element: extracted.interactive_element,
            })
        }
        Some(Value::Null) | None => Err(ChatError::malformed("response has no reply")),
        Some(other) => Err(ChatError::malformed(format!(
            "reply has unexpected shape: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_reply() {
        let body = json!({"reply": {
            "textContent": "Hej!",
            "interactiveElement": {"type": "suggestions", "data": {"suggestions": []}}
        }});
        let reply = parse_reply(&body).unwrap();
        assert_eq!(reply.text_content, "Hej!");
        assert_eq!(
            reply.interactive_element,
            Some(json!({"type": "suggestions", "data": {"suggestions": []}}))
        );
    }

    #[test]
    fn test_null_interactive_element_is_absent() {
        let body = json!({"reply": {"textContent": "Hej!", "interactiveElement": null}});
        assert_eq!(parse_reply(&body).unwrap(), ReplyPayload::text("Hej!"));
    }

    #[test]
    fn test_legacy_string_reply() {
        let body = json!({"reply": "Bara text."});
        assert_eq!(parse_reply(&body).unwrap(), ReplyPayload::text("Bara text."));
    }

    #[test]
    fn test_missing_reply_is_malformed() {
        assert!(matches!(
            parse_reply(&json!({"error": "boom"})),
            Err(ChatError::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(&json!({"reply": 42})),
            Err(ChatError::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(&json!({"reply": {"textContent": 1}})),
            Err(ChatError::MalformedReply(_))
        ));
    }

    #[test]
    fn test_reply_without_text_content_is_malformed() {
        assert!(matches!(
            parse_reply(&json!({"reply": {"interactiveElement": null}})),
            Err(ChatError::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(&json!({"reply": {"textContent": null}})),
            Err(ChatError::MalformedReply(_))
        ));
        assert_eq!(
            parse_reply(&json!({"reply": {"textContent": ""}})).unwrap(),
            ReplyPayload::text("")
        );
    }
}
