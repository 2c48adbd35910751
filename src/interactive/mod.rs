//! Turns an untyped interactive payload into a validated element.
//!
//! Validation fails closed: a payload with a known tag but a malformed body
//! becomes [`Interpretation::Invalid`] and is rendered as a one-line error,
//! never as a partially working widget.

mod element;
pub mod widget;

pub use element::{
    Choice, DialogueLine, ElementKind, Feedback, FeedbackKind, InteractiveElement, Matching,
    MultipleChoice, Ordering, Roleplay, Scenario, ScenarioOption, Suggestion, Suggestions,
};
pub use widget::{WidgetAction, WidgetState};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interpretation {
    /// No payload, or a tag this client does not know.
    #[default]
    None,
    Element(InteractiveElement),
    Invalid { kind: ElementKind, reason: String },
}

impl Interpretation {
    pub fn element(&self) -> Option<&InteractiveElement> {
        match self {
            Interpretation::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Interpretation::None)
    }
}

/// Interpret a raw `{type, data}` payload.
pub fn interpret(payload: &Value) -> Interpretation {
    let object = match payload {
        Value::Null => return Interpretation::None,
        Value::Object(object) => object,
        other => {
            tracing::warn!(payload = %other, "interactive payload is not an object");
            return Interpretation::None;
        }
    };

    let Some(tag) = object.get("type").and_then(Value::as_str) else {
        tracing::warn!("interactive payload has no type tag");
        return Interpretation::None;
    };
    let Some(kind) = ElementKind::from_tag(tag) else {
        tracing::warn!(tag, "unknown interactive element type");
        return Interpretation::None;
    };

    let Some(data) = object.get("data").and_then(Value::as_object) else {
        return invalid(kind, "data is missing or not an object");
    };

    match build(kind, data) {
        Ok(element) => Interpretation::Element(element),
        Err(reason) => invalid(kind, reason),
    }
}

fn invalid(kind: ElementKind, reason: impl Into<String>) -> Interpretation {
    let reason = reason.into();
    tracing::warn!(tag = kind.tag(), %reason, "interactive payload rejected");
    Interpretation::Invalid { kind, reason }
}

fn build(kind: ElementKind, data: &Map<String, Value>) -> Result<InteractiveElement, String> {
    let element = match kind {
        ElementKind::Scenario => {
            let scenario: Scenario = body(kind, data)?;
            non_empty("options", scenario.options.len())?;
            if scenario.options.iter().any(|option| option.label.trim().is_empty()) {
                return Err("scenario option without label".to_string());
            }
            InteractiveElement::Scenario(scenario)
        }
        ElementKind::MultipleChoice => {
            let question: MultipleChoice = body(kind, data)?;
            non_empty("options", question.options.len())?;
            unique_ids("options", &question.options)?;
            InteractiveElement::MultipleChoice(question)
        }
        ElementKind::Matching => {
            let question: Matching = body(kind, data)?;
            non_empty("items", question.items.len())?;
            non_empty("matches", question.matches.len())?;
            unique_ids("items", &question.items)?;
            unique_ids("matches", &question.matches)?;
            if question.matches.len() < question.items.len() {
                return Err("fewer matches than items".to_string());
            }
            InteractiveElement::Matching(question)
        }
        ElementKind::Ordering => {
            let question: Ordering = body(kind, data)?;
            non_empty("items", question.items.len())?;
            unique_ids("items", &question.items)?;
            InteractiveElement::Ordering(question)
        }
        ElementKind::Roleplay => {
            let roleplay: Roleplay = body(kind, data)?;
            non_empty("dialogue", roleplay.dialogue.len())?;
            InteractiveElement::Roleplay(roleplay)
        }
        ElementKind::Feedback => InteractiveElement::Feedback(body(kind, data)?),
        ElementKind::Suggestions => InteractiveElement::Suggestions(suggestions(data)?),
    };
    Ok(element)
}

/// Variant bodies normally sit under their own tag inside `data`; a flat
/// `data` object is accepted as well.
fn body<T: DeserializeOwned>(kind: ElementKind, data: &Map<String, Value>) -> Result<T, String> {
    let value = match data.get(kind.tag()) {
        Some(nested) => nested.clone(),
        None => Value::Object(data.clone()),
    };
    serde_json::from_value(value).map_err(|err| err.to_string())
}

#[derive(Deserialize)]
struct SuggestionsBody {
    #[serde(default)]
    text: Option<String>,
    #[serde(alias = "options")]
    suggestions: Vec<Suggestion>,
}

fn suggestions(data: &Map<String, Value>) -> Result<Suggestions, String> {
    let parsed: SuggestionsBody =
        serde_json::from_value(Value::Object(data.clone())).map_err(|err| err.to_string())?;
    non_empty("suggestions", parsed.suggestions.len())?;
    if parsed
        .suggestions
        .iter()
        .any(|option| option.answer_text().is_none())
    {
        return Err("suggestion without label or value".to_string());
    }
    let binary = is_binary(&parsed.suggestions);
    Ok(Suggestions {
        text: parsed.text,
        options: parsed.suggestions,
        binary,
    })
}

fn non_empty(field: &str, len: usize) -> Result<(), String> {
    if len == 0 {
        return Err(format!("{field} is empty"));
    }
    Ok(())
}

fn unique_ids(field: &str, choices: &[Choice]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for choice in choices {
        if !seen.insert(choice.id.as_str()) {
            return Err(format!("duplicate id {:?} in {field}", choice.id));
        }
    }
    Ok(())
}

/// Two suggestions where one label contains an affirmative word and the
/// other a negative one ("Det är sant" / "Det är falskt").
pub fn is_binary(options: &[Suggestion]) -> bool {
    let [first, second] = options else {
        return false;
    };
    let first = first.answer_text().map(polarity).unwrap_or_default();
    let second = second.answer_text().map(polarity).unwrap_or_default();
    (first.affirmative && second.negative) || (first.negative && second.affirmative)
}

/// True for the affirmative side of a binary pair.
pub fn is_affirmative(option: &Suggestion) -> bool {
    option
        .answer_text()
        .map(polarity)
        .is_some_and(|found| found.affirmative && !found.negative)
}

#[derive(Debug, Default, Clone, Copy)]
struct Polarity {
    affirmative: bool,
    negative: bool,
}

/// Whole-word scan, so "Januari" carries no polarity.
fn polarity(text: &str) -> Polarity {
    let mut found = Polarity::default();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        match word.to_lowercase().as_str() {
            "ja" | "sant" | "true" | "yes" => found.affirmative = true,
            "nej" | "falskt" | "false" | "no" => found.negative = true,
            _ => {}
        }
    }
    found
}
