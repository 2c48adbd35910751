//! Recovery of interactive payloads embedded in a plain-text reply.
//!
//! Older backends answer with `{"reply": "<text>"}` where the text may carry
//! a JSON object somewhere inside it. Strategies run in order and the first
//! one yielding an object with a known key wins:
//!
//! 1. a fenced ```` ```json ```` block
//! 2. the whole string
//! 3. an object at the start, text after it
//! 4. an object at the end, text before it
//! 5. the first balanced object anywhere (only that one is tried)

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::interactive::ElementKind;

/// Tags without a client-side widget. Still extracted so the raw JSON does
/// not leak into the text; the interpreter then ignores them.
const UNSUPPORTED_KEYS: [&str; 2] = ["media", "exercise"];

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub text_content: String,
    /// Normalised `{type, data}` payload, if one was found.
    pub interactive_element: Option<Value>,
}

impl Extracted {
    fn plain(raw: &str) -> Self {
        Self {
            text_content: raw.to_string(),
            interactive_element: None,
        }
    }
}

pub fn extract(raw: &str) -> Extracted {
    let raw = raw.trim();
    if raw.is_empty() {
        return Extracted::plain("");
    }

    let Some((object, before, after, method)) = locate(raw) else {
        return Extracted::plain(raw);
    };
    tracing::debug!(method, "extracted interactive payload from text reply");

    let surrounding = join_text(before, after);
    let (own_text, interactive_element) = normalise(object);
    let text_content = match own_text {
        Some(text) => join_text(&surrounding, &text),
        None => surrounding,
    };
    Extracted {
        text_content: collapse_blank_lines(&text_content),
        interactive_element,
    }
}

type Located<'a> = (Map<String, Value>, &'a str, &'a str, &'static str);

fn locate(raw: &str) -> Option<Located<'_>> {
    if let Some(found) = fenced_block(raw) {
        return Some(found);
    }

    if raw.starts_with('{') && raw.ends_with('}') {
        if let Some(object) = parse_known(raw) {
            return Some((object, "", "", "entire string"));
        }
    }

    if raw.starts_with('{') {
        if let Some(end) = balanced_object_end(raw, 0) {
            if let Some(object) = parse_known(&raw[..end]) {
                return Some((object, "", &raw[end..], "start of string"));
            }
        }
    }

    if raw.ends_with('}') {
        let mut search_end = raw.len();
        while let Some(start) = raw[..search_end].rfind('{') {
            if let Some(object) = parse_known(&raw[start..]) {
                return Some((object, &raw[..start], "", "end of string"));
            }
            search_end = start;
        }
    }

    let start = raw.find('{')?;
    let end = balanced_object_end(raw, start)?;
    let object = parse_known(&raw[start..end])?;
    Some((object, &raw[..start], &raw[end..], "first balanced object"))
}

fn fenced_block(raw: &str) -> Option<Located<'_>> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?is)```json\s*(\{.*?\})\s*```").expect("fence pattern is valid")
    });
    let captures = fence.captures(raw)?;
    let whole = captures.get(0)?;
    let body = captures.get(1)?;
    let object = parse_known(body.as_str())?;
    Some((
        object,
        &raw[..whole.start()],
        &raw[whole.end()..],
        "code block",
    ))
}

fn parse_known(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(object)) if object.keys().any(|key| is_known_key(key)) => Some(object),
        _ => None,
    }
}

fn is_known_key(key: &str) -> bool {
    key == "text" || ElementKind::from_tag(key).is_some() || UNSUPPORTED_KEYS.contains(&key)
}

/// Byte offset just past the object opening at `start`, skipping braces
/// inside string literals.
pub(crate) fn balanced_object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.get(start..)?.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Turn a recovered object into `{type, data}` plus any free text it carried.
fn normalise(mut object: Map<String, Value>) -> (Option<String>, Option<Value>) {
    let tag = ElementKind::ALL
        .iter()
        .map(|kind| kind.tag())
        .chain(UNSUPPORTED_KEYS)
        .find(|tag| object.contains_key(*tag));

    let Some(tag) = tag else {
        let text = object
            .remove("text")
            .and_then(|text| text.as_str().map(str::to_string));
        return (text, None);
    };

    // Suggestions keep their prompt text alongside the list.
    if tag == ElementKind::Suggestions.tag() {
        let element = serde_json::json!({"type": tag, "data": Value::Object(object)});
        return (None, Some(element));
    }

    let text = object
        .remove("text")
        .and_then(|text| text.as_str().map(str::to_string));
    let mut data = Map::new();
    if let Some(body) = object.remove(tag) {
        data.insert(tag.to_string(), body);
    }
    let element = serde_json::json!({"type": tag, "data": Value::Object(data)});
    (text, Some(element))
}

fn join_text(before: &str, after: &str) -> String {
    match (before.trim(), after.trim()) {
        ("", "") => String::new(),
        (text, "") | ("", text) => text.to_string(),
        (before, after) => format!("{before}\n\n{after}"),
    }
}

fn collapse_blank_lines(text: &str) -> String {
    static BLANKS: OnceLock<Regex> = OnceLock::new();
    let blanks = BLANKS.get_or_init(|| {
        Regex::new(r"\n\s*\n").expect("blank line pattern is valid")
    });
    blanks.replace_all(text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_passes_through() {
        let extracted = extract("  Hej! Hur mår du?  ");
        assert_eq!(extracted.text_content, "Hej! Hur mår du?");
        assert_eq!(extracted.interactive_element, None);
    }

    #[test]
    fn test_fenced_block_between_text() {
        let raw = "Läs frågan.\n```json\n{\"ordering\": {\"text\": \"Ordna\", \"items\": []}}\n```\nLycka till!";
        let extracted = extract(raw);
        assert_eq!(extracted.text_content, "Läs frågan.\n\nLycka till!");
        assert_eq!(
            extracted.interactive_element,
            Some(json!({"type": "ordering", "data": {"ordering": {"text": "Ordna", "items": []}}}))
        );
    }

    #[test]
    fn test_entire_string_suggestions_keep_text_in_data() {
        let raw = r#"{"text": "Vill du fortsätta?", "suggestions": [{"label": "Ja"}, {"label": "Nej"}]}"#;
        let extracted = extract(raw);
        assert_eq!(extracted.text_content, "");
        assert_eq!(
            extracted.interactive_element,
            Some(json!({
                "type": "suggestions",
                "data": {"text": "Vill du fortsätta?", "suggestions": [{"label": "Ja"}, {"label": "Nej"}]}
            }))
        );
    }

    #[test]
    fn test_object_at_start_with_trailing_text() {
        let raw = r#"{"feedback": {"type": "safety", "message": "Bra"}} Fortsätt så!"#;
        let extracted = extract(raw);
        assert_eq!(extracted.text_content, "Fortsätt så!");
        assert_eq!(
            extracted.interactive_element.as_ref().and_then(|e| e.get("type")),
            Some(&json!("feedback"))
        );
    }

    #[test]
    fn test_object_at_end_with_leading_text() {
        let raw = r#"Här kommer en fråga: {"multipleChoice": {"text": "Välj {en}", "options": []}}"#;
        let extracted = extract(raw);
        assert_eq!(extracted.text_content, "Här kommer en fråga:");
        assert_eq!(
            extracted.interactive_element.as_ref().and_then(|e| e.get("type")),
            Some(&json!("multipleChoice"))
        );
    }

    #[test]
    fn test_first_balanced_object_mid_string() {
        let raw = r#"Före {"scenario": {"description": "Yrsel", "options": []}} efter."#;
        let extracted = extract(raw);
        assert_eq!(extracted.text_content, "Före\n\nefter.");
        assert!(extracted.interactive_element.is_some());
    }

    #[test]
    fn test_unknown_keys_leave_text_untouched() {
        let raw = r#"Konfiguration: {"color": "blue"}"#;
        let extracted = extract(raw);
        assert_eq!(extracted.text_content, raw);
        assert_eq!(extracted.interactive_element, None);
    }

    #[test]
    fn test_text_only_object_contributes_text() {
        let extracted = extract(r#"{"text": "Bara text"}"#);
        assert_eq!(extracted.text_content, "Bara text");
        assert_eq!(extracted.interactive_element, None);
    }

    #[test]
    fn test_balanced_scan_ignores_braces_in_strings() {
        let text = r#"x {"a": "}{", "b": "\"}"} y"#;
        let start = text.find('{').unwrap();
        let end = balanced_object_end(text, start).unwrap();
        assert_eq!(&text[start..end], r#"{"a": "}{", "b": "\"}"}"#);
        assert_eq!(balanced_object_end("{ unterminated", 0), None);
    }
}
