use super::*;
use crate::api::mock_client::MockApiClient;
use crate::api::ApiClient;
use crate::interactive::{InteractiveElement, WidgetAction, WidgetState};
use crate::state::Sender;
use serde_json::{json, Value};
use std::sync::Arc;

const FOUR_PARAGRAPHS: &str = "Hej!\n\nIdag pratar vi om delegering.\n\nÄr du redo?\n\nVi börjar.";

fn make_session() -> (ChatSession, mpsc::UnboundedReceiver<RevealTick>) {
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let config = SessionConfig::started("Anna", "ja", "nej").expect("valid session config");
    (ChatSession::new(config, tick_tx), tick_rx)
}

fn make_client(responses: Vec<Result<Value, ChatError>>) -> (ApiClient, MockApiClient) {
    let mock = MockApiClient::new(responses);
    (ApiClient::new_mock(Arc::new(mock.clone())), mock)
}

fn reply(text: &str, element: Value) -> Result<Value, ChatError> {
    Ok(json!({"reply": {"textContent": text, "interactiveElement": element}}))
}

async fn exchange(session: &mut ChatSession, client: &ApiClient, request: ChatRequest) {
    let outcome = client.send_chat(&request).await;
    session.receive_reply(outcome);
}

async fn finish_reveal(session: &mut ChatSession, ticks: &mut mpsc::UnboundedReceiver<RevealTick>) {
    while session.is_revealing() {
        let tick = ticks.recv().await.expect("reveal tick");
        session.on_reveal_tick(tick);
    }
}

fn ordering_payload() -> Value {
    json!({
        "type": "ordering",
        "data": {"ordering": {"text": "Sortera", "items": [
            {"id": "a", "text": "First"},
            {"id": "b", "text": "Second"}
        ]}}
    })
}

#[tokio::test(start_paused = true)]
async fn test_start_reply_is_revealed_without_widget() {
    let (mut session, mut ticks) = make_session();
    let (client, mock) = make_client(vec![reply("Hej!", Value::Null)]);

    let request = session.begin().expect("begin");
    assert_eq!(request.message, "start");
    assert_eq!(request.name, "Anna");
    assert_eq!(session.phase(), SessionPhase::WaitingForReply);
    assert!(session.messages().is_empty());

    exchange(&mut session, &client, request).await;
    assert_eq!(session.phase(), SessionPhase::Revealing);
    finish_reveal(&mut session, &mut ticks).await;

    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(session.messages().len(), 1);
    let message = &session.messages()[0];
    assert_eq!(message.sender, Sender::Assistant);
    assert_eq!(message.text_content, "Hej!");
    assert!(message.interactive.is_none());
    assert!(session.is_active(message.id));
    assert_eq!(session.visible_segments(message.id), None);
    assert_eq!(session.completion_ratio(message.id), 1.0);

    let sent = mock.requests();
    assert_eq!(sent.len(), 1);
    let answers = sent[0].answers.as_ref().expect("answers sent");
    assert_eq!(answers.underskoterska, "ja");
    assert_eq!(answers.delegering, "nej");
}

#[tokio::test(start_paused = true)]
async fn test_begin_only_once() {
    let (mut session, _ticks) = make_session();
    session.begin().expect("begin");
    assert_eq!(session.begin(), Err(SubmitRejected::AlreadyStarted));
}

#[tokio::test(start_paused = true)]
async fn test_single_request_in_flight_while_revealing() {
    let (mut session, mut ticks) = make_session();
    let (client, mock) = make_client(vec![
        reply(FOUR_PARAGRAPHS, Value::Null),
        reply("Inga problem, jag förklarar igen.", Value::Null),
    ]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    let first = ticks.recv().await.expect("first tick");
    session.on_reveal_tick(first);
    assert!(session.is_revealing());

    let request = session.submit("Jag förstår inte").expect("submit while revealing");
    assert_eq!(session.phase(), SessionPhase::WaitingForReply);
    assert!(!session.is_revealing());
    assert_eq!(session.active_id(), None);
    assert!(!session.accepts_input());

    assert_eq!(session.submit("Hallå?"), Err(SubmitRejected::RequestInFlight));
    let first_id = session.messages()[0].id;
    assert_eq!(
        session.answer_interactive(first_id, "Ja"),
        Err(SubmitRejected::RequestInFlight)
    );
    assert_eq!(mock.requests().len(), 1);

    exchange(&mut session, &client, request).await;
    finish_reveal(&mut session, &mut ticks).await;

    assert_eq!(mock.requests().len(), 2);
    let senders: Vec<Sender> = session.messages().iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        vec![Sender::Assistant, Sender::User, Sender::Assistant]
    );
    assert_eq!(session.messages()[1].text_content, "Jag förstår inte");
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_ordering_answer_is_sent_as_next_message() {
    let (mut session, mut ticks) = make_session();
    let (client, mock) = make_client(vec![
        reply("Sortera stegen.", ordering_payload()),
        reply("Rätt!", Value::Null),
    ]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    let message = session.messages()[0].clone();
    let element = message.interactive.element().expect("ordering element").clone();
    assert!(matches!(element, InteractiveElement::Ordering(_)));
    assert_eq!(
        session.answer_interactive(message.id, "First → Second"),
        Err(SubmitRejected::RevealIncomplete)
    );

    finish_reveal(&mut session, &mut ticks).await;
    assert_eq!(
        session.widget_visibility(message.id),
        WidgetVisibility::Interactive
    );

    let mut widget = WidgetState::for_element(&element);
    let answer = widget
        .apply(&element, WidgetAction::Submit)
        .expect("ordering always answers");
    assert_eq!(answer, "First → Second");

    let request = session
        .answer_interactive(message.id, &answer)
        .expect("active message accepts answer");
    assert_eq!(request.message, "First → Second");
    assert_eq!(
        session.widget_visibility(message.id),
        WidgetVisibility::Frozen
    );

    exchange(&mut session, &client, request).await;
    assert_eq!(mock.requests()[1].message, "First → Second");
    assert_eq!(session.messages()[1].sender, Sender::User);
    assert_eq!(session.messages()[1].text_content, "First → Second");
}

#[tokio::test(start_paused = true)]
async fn test_answers_for_superseded_messages_are_rejected() {
    let (mut session, mut ticks) = make_session();
    let (client, _mock) = make_client(vec![
        reply("Sortera stegen.", ordering_payload()),
        reply("Nästa fråga.", ordering_payload()),
    ]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    finish_reveal(&mut session, &mut ticks).await;
    let m1 = session.messages()[0].id;

    let request = session.submit("Okej").unwrap();
    exchange(&mut session, &client, request).await;
    finish_reveal(&mut session, &mut ticks).await;
    let m2 = session.messages()[2].id;

    assert!(session.is_active(m2));
    assert_eq!(
        session.answer_interactive(m1, "First → Second"),
        Err(SubmitRejected::MessageNotActive)
    );
    assert_eq!(session.widget_visibility(m1), WidgetVisibility::Frozen);
    assert_eq!(session.widget_visibility(m2), WidgetVisibility::Interactive);
    assert_eq!(session.messages().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_display_only_and_plain_messages_take_no_answers() {
    let (mut session, mut ticks) = make_session();
    let feedback = json!({
        "type": "feedback",
        "data": {"feedback": {"type": "safety", "message": "Bra tänkt."}}
    });
    let (client, mock) = make_client(vec![
        reply("Återkoppling.", feedback),
        reply("Bara text.", Value::Null),
    ]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    finish_reveal(&mut session, &mut ticks).await;
    let feedback_id = session.messages()[0].id;
    assert!(session.is_active(feedback_id));
    assert!(matches!(
        session.messages()[0].interactive.element(),
        Some(InteractiveElement::Feedback(_))
    ));
    assert_eq!(
        session.answer_interactive(feedback_id, "Tack"),
        Err(SubmitRejected::NotAnswerable)
    );

    let request = session.submit("Okej").unwrap();
    exchange(&mut session, &client, request).await;
    finish_reveal(&mut session, &mut ticks).await;
    let plain_id = session.messages()[2].id;
    assert_eq!(
        session.answer_interactive(plain_id, "Tack"),
        Err(SubmitRejected::NotAnswerable)
    );
    assert_eq!(session.messages().len(), 3);
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_widget_appears_at_half_reveal() {
    let (mut session, mut ticks) = make_session();
    let (client, _mock) = make_client(vec![reply(FOUR_PARAGRAPHS, ordering_payload())]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    let id = session.messages()[0].id;
    assert_eq!(session.widget_visibility(id), WidgetVisibility::Hidden);

    let tick = ticks.recv().await.unwrap();
    session.on_reveal_tick(tick);
    assert_eq!(session.visible_segments(id).map(<[String]>::len), Some(1));
    assert_eq!(session.widget_visibility(id), WidgetVisibility::Hidden);

    let tick = ticks.recv().await.unwrap();
    session.on_reveal_tick(tick);
    assert_eq!(session.widget_visibility(id), WidgetVisibility::Preview);

    let progress = session.skip_reveal().expect("skip completes");
    assert!(progress.completed_now);
    assert!(session.skip_reveal().is_none());
    assert_eq!(session.widget_visibility(id), WidgetVisibility::Interactive);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_shows_error_and_reenables_input() {
    let (mut session, _ticks) = make_session();
    let (client, _mock) = make_client(vec![
        Err(ChatError::Unreachable {
            url: "http://localhost:10000/api/chat".to_string(),
            detail: "connection refused".to_string(),
        }),
        Err(ChatError::Timeout {
            url: "http://localhost:10000/api/chat".to_string(),
        }),
    ]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;

    assert_eq!(session.messages().len(), 1);
    let error = &session.messages()[0];
    assert_eq!(error.sender, Sender::Assistant);
    assert_eq!(error.text_content, START_ERROR_TEXT);
    assert!(error.interactive.is_none());
    assert!(session.is_active(error.id));
    assert!(!session.is_revealing());
    assert_eq!(session.visible_segments(error.id), None);
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.accepts_input());

    let request = session.submit("Hej igen").expect("input usable after error");
    exchange(&mut session, &client, request).await;
    assert_eq!(session.messages().len(), 3);
    assert_eq!(session.messages()[2].text_content, REPLY_ERROR_TEXT);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_reply_is_recovered_like_transport_failure() {
    let (mut session, _ticks) = make_session();
    let (client, _mock) = make_client(vec![Ok(json!({"error": "internal"}))]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;

    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].text_content, START_ERROR_TEXT);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_reply_without_text_content_shows_error_message() {
    let (mut session, _ticks) = make_session();
    let (client, _mock) = make_client(vec![
        reply("Hej!", Value::Null),
        Ok(json!({"reply": {"interactiveElement": null}})),
    ]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    session.skip_reveal();

    let request = session.submit("Vad menar du?").unwrap();
    exchange(&mut session, &client, request).await;

    assert_eq!(session.messages().len(), 3);
    let error = &session.messages()[2];
    assert_eq!(error.sender, Sender::Assistant);
    assert_eq!(error.text_content, REPLY_ERROR_TEXT);
    assert!(session.is_active(error.id));
    assert!(session.accepts_input());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_payload_keeps_text() {
    let (mut session, mut ticks) = make_session();
    let (client, _mock) = make_client(vec![reply(
        "Välj ett alternativ.",
        json!({"type": "multipleChoice", "data": {"multipleChoice": {"text": "Fråga"}}}),
    )]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    finish_reveal(&mut session, &mut ticks).await;

    let message = &session.messages()[0];
    assert_eq!(message.text_content, "Välj ett alternativ.");
    assert!(matches!(
        message.interactive,
        Interpretation::Invalid { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_legacy_string_reply_is_interpreted() {
    let (mut session, mut ticks) = make_session();
    let (client, _mock) = make_client(vec![Ok(json!({
        "reply": "Stämmer det?\n```json\n{\"text\": \"Svara\", \"suggestions\": [{\"label\": \"Ja\"}, {\"label\": \"Nej\"}]}\n```"
    }))]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    finish_reveal(&mut session, &mut ticks).await;

    let message = &session.messages()[0];
    assert_eq!(message.text_content, "Stämmer det?");
    let Some(InteractiveElement::Suggestions(suggestions)) = message.interactive.element() else {
        panic!("expected suggestions, got {:?}", message.interactive);
    };
    assert!(suggestions.binary);
}

#[tokio::test(start_paused = true)]
async fn test_empty_reply_text_completes_immediately() {
    let (mut session, _ticks) = make_session();
    let (client, _mock) = make_client(vec![reply("", Value::Null)]);

    let request = session.begin().unwrap();
    exchange(&mut session, &client, request).await;
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(!session.is_revealing());
}

#[tokio::test(start_paused = true)]
async fn test_stray_reply_is_ignored() {
    let (mut session, _ticks) = make_session();
    assert!(session
        .receive_reply(Ok(ReplyPayload::text("Ingen frågade")))
        .is_none());
    assert!(session.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_submission_is_rejected() {
    let (mut session, _ticks) = make_session();
    assert_eq!(session.submit("   "), Err(SubmitRejected::EmptyInput));
    assert_eq!(session.phase(), SessionPhase::Idle);
}
