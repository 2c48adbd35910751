use serde::{Deserialize, Serialize};

/// The first message of every conversation.
pub const START_MESSAGE: &str = "start";

/// Onboarding answers, each "ja" or "nej".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingAnswers {
    pub underskoterska: String,
    pub delegering: String,
}

impl Default for OnboardingAnswers {
    fn default() -> Self {
        Self {
            underskoterska: "nej".to_string(),
            delegering: "nej".to_string(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<OnboardingAnswers>,
}

impl ChatRequest {
    pub fn is_start(&self) -> bool {
        self.message == START_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = ChatRequest {
            message: START_MESSAGE.to_string(),
            name: "Anna".to_string(),
            answers: Some(OnboardingAnswers {
                underskoterska: "ja".to_string(),
                delegering: "nej".to_string(),
            }),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "start",
                "name": "Anna",
                "answers": {"underskoterska": "ja", "delegering": "nej"}
            })
        );
        assert!(request.is_start());
    }

    #[test]
    fn test_answers_are_omitted_when_absent() {
        let request = ChatRequest {
            message: "Hej".to_string(),
            name: "Anna".to_string(),
            answers: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"message": "Hej", "name": "Anna"})
        );
    }
}
