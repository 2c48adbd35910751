use super::error::{map_api_request_error, ChatError};
use super::logging::{debug_payload_enabled, emit_debug_reply, emit_debug_request};
use super::reply::{parse_reply, ReplyPayload};
use crate::config::Config;
use crate::types::ChatRequest;
use anyhow::Result;
use serde_json::Value;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
pub trait MockReplyProducer: Send + Sync {
    fn create_mock_reply(&self, request: &ChatRequest) -> Result<Value, ChatError>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
    #[cfg(test)]
    mock_reply_producer: Option<Arc<dyn MockReplyProducer>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.chat_endpoint(),
            #[cfg(test)]
            mock_reply_producer: None,
        })
    }

    #[cfg(test)]
    pub fn new_mock(mock_producer: Arc<dyn MockReplyProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: "http://localhost:10000/api/chat".to_string(),
            mock_reply_producer: Some(mock_producer),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one chat turn and return the parsed reply.
    pub async fn send_chat(&self, request: &ChatRequest) -> Result<ReplyPayload, ChatError> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_reply_producer {
                let body = producer.create_mock_reply(request)?;
                return parse_reply(&body);
            }
        }

        if debug_payload_enabled() {
            match serde_json::to_value(request) {
                Ok(payload) => emit_debug_request(&self.endpoint, &payload),
                Err(err) => tracing::warn!(error = %err, "cannot serialise request for debug log"),
            }
        }
        tracing::debug!(url = %self.endpoint, start = request.is_start(), "sending chat request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, &self.endpoint))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, &self.endpoint))?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|error| map_api_request_error(error, &self.endpoint))?;

        if debug_payload_enabled() {
            emit_debug_reply(&self.endpoint, status, &body);
        }
        parse_reply(&body)
    }
}
