//! Per-exchange orchestration: submit, await the reply, reveal it.
//!
//! `ChatSession` is the only writer of the conversation store and the
//! answerability gate. It performs no I/O itself; callers send the returned
//! [`ChatRequest`] and feed the outcome back through [`ChatSession::receive_reply`].

use crate::api::{ChatError, ReplyPayload};
use crate::config::SessionConfig;
use crate::interactive::{interpret, InteractiveElement, Interpretation};
use crate::reveal::{segment_text, RevealProgress, RevealScheduler, RevealTick};
use crate::state::{AnswerabilityGate, ConversationStore, Message, MessageId};
use crate::types::{ChatRequest, START_MESSAGE};
use thiserror::Error;
use tokio::sync::mpsc;

#[cfg(test)]
mod tests;

pub const START_ERROR_TEXT: &str = "Det uppstod ett fel vid anslutning till servern...";
pub const REPLY_ERROR_TEXT: &str = "Det uppstod ett fel...";

/// Widgets appear once half of the text is visible.
const PREVIEW_RATIO: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Sending,
    WaitingForReply,
    Revealing,
    ErrorShown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("nothing to send")]
    EmptyInput,
    #[error("a request is already in flight")]
    RequestInFlight,
    #[error("message is no longer answerable")]
    MessageNotActive,
    #[error("message is still being revealed")]
    RevealIncomplete,
    #[error("message has nothing to answer")]
    NotAnswerable,
    #[error("conversation already started")]
    AlreadyStarted,
}

/// How a message's interactive element should be presented right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetVisibility {
    /// Not shown yet; less than half of the text is visible.
    Hidden,
    /// Shown but not answerable until the reveal completes.
    Preview,
    Interactive,
    /// Shown disabled: an older message, or a request is in flight.
    Frozen,
}

pub struct ChatSession {
    config: SessionConfig,
    store: ConversationStore,
    gate: AnswerabilityGate,
    phase: SessionPhase,
    reveal: Option<RevealScheduler>,
    tick_tx: mpsc::UnboundedSender<RevealTick>,
    started: bool,
    pending_start: bool,
}

impl ChatSession {
    pub fn new(config: SessionConfig, tick_tx: mpsc::UnboundedSender<RevealTick>) -> Self {
        Self {
            config,
            store: ConversationStore::new(),
            gate: AnswerabilityGate::new(),
            phase: SessionPhase::Idle,
            reveal: None,
            tick_tx,
            started: false,
            pending_start: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn messages(&self) -> &[Message] {
        self.store.all()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self, id: MessageId) -> bool {
        self.gate.is_active(id)
    }

    pub fn active_id(&self) -> Option<MessageId> {
        self.gate.active_id()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_request_in_flight(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Sending | SessionPhase::WaitingForReply
        )
    }

    /// Typed input, quick responses and widget answers are all refused while
    /// a request is in flight.
    pub fn accepts_input(&self) -> bool {
        !self.is_request_in_flight()
    }

    /// Open the conversation with the "start" sentinel.
    pub fn begin(&mut self) -> Result<ChatRequest, SubmitRejected> {
        if self.started {
            return Err(SubmitRejected::AlreadyStarted);
        }
        if self.is_request_in_flight() {
            return Err(SubmitRejected::RequestInFlight);
        }
        self.started = true;
        self.set_phase(SessionPhase::Sending);
        self.gate.clear();
        Ok(self.dispatch(START_MESSAGE.to_string()))
    }

    /// Submit free text (typed input or a quick response).
    pub fn submit(&mut self, text: &str) -> Result<ChatRequest, SubmitRejected> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }
        if self.is_request_in_flight() {
            return Err(SubmitRejected::RequestInFlight);
        }

        self.started = true;
        self.set_phase(SessionPhase::Sending);
        // The previous message stops being active, so its reveal goes with it.
        if let Some(mut reveal) = self.reveal.take() {
            reveal.dispose();
        }
        self.store.append(Message::user(text));
        self.gate.clear();
        Ok(self.dispatch(text.to_string()))
    }

    /// Submit an answer produced by the interactive element of `message_id`.
    pub fn answer_interactive(
        &mut self,
        message_id: MessageId,
        answer: &str,
    ) -> Result<ChatRequest, SubmitRejected> {
        if self.is_request_in_flight() {
            return Err(SubmitRejected::RequestInFlight);
        }
        if !self.gate.is_active(message_id) {
            tracing::debug!(%message_id, "answer for inactive message ignored");
            return Err(SubmitRejected::MessageNotActive);
        }
        if !self.is_reveal_complete(message_id) {
            return Err(SubmitRejected::RevealIncomplete);
        }
        let answerable = self
            .store
            .get(message_id)
            .and_then(|message| message.interactive.element())
            .is_some_and(InteractiveElement::is_answerable);
        if !answerable {
            return Err(SubmitRejected::NotAnswerable);
        }
        self.submit(answer)
    }

    /// Record the outcome of the request returned by `begin`/`submit`.
    pub fn receive_reply(
        &mut self,
        outcome: Result<ReplyPayload, ChatError>,
    ) -> Option<RevealProgress> {
        if self.phase != SessionPhase::WaitingForReply {
            tracing::warn!(phase = ?self.phase, "reply received with no request in flight");
            return None;
        }

        match outcome {
            Ok(reply) => {
                let interactive = match &reply.interactive_element {
                    Some(payload) => interpret(payload),
                    None => Interpretation::None,
                };
                let segments = segment_text(&reply.text_content);
                let id = self.append_active(Message::assistant(reply.text_content, interactive));
                tracing::info!(message_id = %id, segments = segments.len(), "reply received");

                self.set_phase(SessionPhase::Revealing);
                let mut reveal = RevealScheduler::new(id, self.tick_tx.clone());
                let progress = reveal.start(segments);
                self.reveal = Some(reveal);
                if let Some(progress) = progress {
                    self.after_progress(progress);
                }
                progress
            }
            Err(err) => {
                tracing::warn!(error = %err, start = self.pending_start, "chat request failed");
                let text = if self.pending_start {
                    START_ERROR_TEXT
                } else {
                    REPLY_ERROR_TEXT
                };
                let id = self.append_active(Message::assistant(text, Interpretation::None));

                self.set_phase(SessionPhase::ErrorShown);
                let mut reveal = RevealScheduler::new(id, self.tick_tx.clone());
                let progress = reveal.show_all(segment_text(text));
                self.reveal = Some(reveal);
                self.set_phase(SessionPhase::Idle);
                Some(progress)
            }
        }
    }

    pub fn on_reveal_tick(&mut self, tick: RevealTick) -> Option<RevealProgress> {
        let progress = self.reveal.as_mut()?.on_tick(tick)?;
        self.after_progress(progress);
        Some(progress)
    }

    /// Skip the active message's reveal. No effect on any other message.
    pub fn skip_reveal(&mut self) -> Option<RevealProgress> {
        let progress = self.reveal.as_mut()?.skip()?;
        self.after_progress(progress);
        Some(progress)
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal
            .as_ref()
            .is_some_and(|reveal| !reveal.is_complete())
    }

    /// Segments currently visible for `id`, or `None` when the message is
    /// not under reveal and shows in full.
    pub fn visible_segments(&self, id: MessageId) -> Option<&[String]> {
        self.reveal
            .as_ref()
            .filter(|reveal| reveal.message_id() == id && !reveal.is_complete())
            .map(RevealScheduler::visible_segments)
    }

    pub fn completion_ratio(&self, id: MessageId) -> f32 {
        match &self.reveal {
            Some(reveal) if reveal.message_id() == id => reveal.completion_ratio(),
            _ => 1.0,
        }
    }

    pub fn widget_visibility(&self, id: MessageId) -> WidgetVisibility {
        if !self.gate.is_active(id) {
            return WidgetVisibility::Frozen;
        }
        let ratio = self.completion_ratio(id);
        if self.is_reveal_complete(id) {
            WidgetVisibility::Interactive
        } else if ratio >= PREVIEW_RATIO {
            WidgetVisibility::Preview
        } else {
            WidgetVisibility::Hidden
        }
    }

    fn is_reveal_complete(&self, id: MessageId) -> bool {
        match &self.reveal {
            Some(reveal) if reveal.message_id() == id => reveal.is_complete(),
            _ => true,
        }
    }

    fn append_active(&mut self, message: Message) -> MessageId {
        let id = self.store.append(message);
        self.gate.activate(id);
        id
    }

    fn dispatch(&mut self, message: String) -> ChatRequest {
        self.pending_start = message == START_MESSAGE && self.store.is_empty();
        self.set_phase(SessionPhase::WaitingForReply);
        ChatRequest {
            message,
            name: self.config.user_name.clone(),
            answers: Some(self.config.onboarding_answers.clone()),
        }
    }

    fn after_progress(&mut self, progress: RevealProgress) {
        if progress.completed_now && self.phase == SessionPhase::Revealing {
            self.set_phase(SessionPhase::Idle);
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "session phase");
            self.phase = phase;
        }
    }
}
