use super::message::{Message, MessageId};

/// Append-only, ordered record of the conversation.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the id of the stored message.
    pub fn append(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        id
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().rev().find(|message| message.id == id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactive::Interpretation;

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut store = ConversationStore::new();
        let first = store.append(Message::assistant("Hej!", Interpretation::None));
        let second = store.append(Message::user("Hej hej"));

        let ids: Vec<MessageId> = store.all().iter().map(|message| message.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(store.get(first).map(|m| m.text_content.as_str()), Some("Hej!"));
        assert_eq!(store.last().map(|m| m.id), Some(second));
        assert_eq!(store.len(), 2);
    }
}
