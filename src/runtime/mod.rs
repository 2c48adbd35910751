//! Background request worker. The UI loop hands it one [`ChatRequest`] at a
//! time and receives the outcome as a [`UiUpdate`].

use crate::api::{ApiClient, ChatError, ReplyPayload};
use crate::types::ChatRequest;
use tokio::sync::mpsc;
use tokio::task;

#[derive(Debug)]
pub enum UiUpdate {
    Reply(Result<ReplyPayload, ChatError>),
}

pub fn spawn_chat_worker(
    client: ApiClient,
    update_tx: mpsc::UnboundedSender<UiUpdate>,
) -> mpsc::UnboundedSender<ChatRequest> {
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ChatRequest>();
    task::spawn(async move {
        while let Some(request) = request_rx.recv().await {
            let outcome = client.send_chat(&request).await;
            if let Err(err) = &outcome {
                tracing::debug!(error = %err, "chat worker delivering failure");
            }
            if update_tx.send(UiUpdate::Reply(outcome)).is_err() {
                break;
            }
        }
    });
    request_tx
}
