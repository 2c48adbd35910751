use crate::api::client::MockReplyProducer;
use crate::api::error::ChatError;
use crate::types::ChatRequest;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Replays queued response bodies (or failures) in order and records every
/// request it receives.
#[derive(Clone)]
pub struct MockApiClient {
    responses: Arc<Mutex<Vec<Result<Value, ChatError>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockApiClient {
    pub fn new(responses: Vec<Result<Value, ChatError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl MockReplyProducer for MockApiClient {
    fn create_mock_reply(&self, request: &ChatRequest) -> Result<Value, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses_guard = self.responses.lock().unwrap();
        if responses_guard.is_empty() {
            return Err(ChatError::Transport {
                url: "mock".to_string(),
                detail: "MockApiClient: No more responses configured".to_string(),
            });
        }
        responses_guard.remove(0)
    }
}
