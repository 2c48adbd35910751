use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed set of interactive variants, keyed by their wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Scenario,
    MultipleChoice,
    Matching,
    Ordering,
    Roleplay,
    Feedback,
    Suggestions,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Scenario,
        ElementKind::MultipleChoice,
        ElementKind::Matching,
        ElementKind::Ordering,
        ElementKind::Roleplay,
        ElementKind::Feedback,
        ElementKind::Suggestions,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Scenario => "scenario",
            ElementKind::MultipleChoice => "multipleChoice",
            ElementKind::Matching => "matching",
            ElementKind::Ordering => "ordering",
            ElementKind::Roleplay => "roleplay",
            ElementKind::Feedback => "feedback",
            ElementKind::Suggestions => "suggestions",
        }
    }

    /// One-line inline message shown in place of a payload that failed validation.
    pub fn load_error(self) -> &'static str {
        match self {
            ElementKind::Scenario => "Fel: Kunde inte ladda scenariot.",
            ElementKind::MultipleChoice => "Fel: Kunde inte ladda flervalsfrågan.",
            ElementKind::Matching => "Fel: Kunde inte ladda matchningsfrågan.",
            ElementKind::Ordering => "Fel: Kunde inte ladda ordningsfrågan.",
            ElementKind::Roleplay => "Fel: Kunde inte ladda rollspelet.",
            ElementKind::Feedback => "Fel: Kunde inte ladda feedback.",
            ElementKind::Suggestions => "Fel: Kunde inte ladda svarsalternativen.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractiveElement {
    Scenario(Scenario),
    MultipleChoice(MultipleChoice),
    Matching(Matching),
    Ordering(Ordering),
    Roleplay(Roleplay),
    Feedback(Feedback),
    Suggestions(Suggestions),
}

impl InteractiveElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            InteractiveElement::Scenario(_) => ElementKind::Scenario,
            InteractiveElement::MultipleChoice(_) => ElementKind::MultipleChoice,
            InteractiveElement::Matching(_) => ElementKind::Matching,
            InteractiveElement::Ordering(_) => ElementKind::Ordering,
            InteractiveElement::Roleplay(_) => ElementKind::Roleplay,
            InteractiveElement::Feedback(_) => ElementKind::Feedback,
            InteractiveElement::Suggestions(_) => ElementKind::Suggestions,
        }
    }

    /// Roleplay and feedback are read-only; everything else produces an answer.
    pub fn is_answerable(&self) -> bool {
        !matches!(
            self,
            InteractiveElement::Roleplay(_) | InteractiveElement::Feedback(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
    pub options: Vec<ScenarioOption>,
}

impl Scenario {
    pub const DEFAULT_TITLE: &'static str = "Patientsituation";

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(Self::DEFAULT_TITLE)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioOption {
    pub label: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoice {
    pub text: String,
    #[serde(default)]
    pub multi_select: bool,
    pub options: Vec<Choice>,
}

/// An identified option, used by multiple choice, matching and ordering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Matching {
    pub text: String,
    pub items: Vec<Choice>,
    pub matches: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ordering {
    pub text: String,
    pub items: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roleplay {
    pub title: String,
    pub scenario: String,
    pub dialogue: Vec<DialogueLine>,
    #[serde(default)]
    pub learning_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DialogueLine {
    pub role: String,
    pub message: String,
}

impl DialogueLine {
    /// Lines spoken by the learner are marked "(du)" in the role.
    pub fn is_learner(&self) -> bool {
        self.role.contains("(du)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Knowledge,
    Procedure,
    Priority,
    Safety,
}

impl FeedbackKind {
    pub fn heading(self) -> &'static str {
        match self {
            FeedbackKind::Knowledge => "Kunskap",
            FeedbackKind::Procedure => "Tillvägagångssätt",
            FeedbackKind::Priority => "Prioritering",
            FeedbackKind::Safety => "Patientsäkerhet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub message: String,
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(default)]
    pub correct_action: Option<String>,
    #[serde(default)]
    pub user_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestions {
    pub text: Option<String>,
    pub options: Vec<Suggestion>,
    /// Two options recognised as an affirmative/negative pair.
    pub binary: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestion {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub value: Option<String>,
}

impl Suggestion {
    /// The text sent as the answer: the label, falling back to the value.
    pub fn answer_text(&self) -> Option<&str> {
        [self.label.as_deref(), self.value.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

/// Accepts string or numeric ids; models emit both.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        other => Err(de::Error::custom(format!("expected a string, got {other}"))),
    }
}
