use super::message::MessageId;

/// Single source of truth for which message may currently be answered.
#[derive(Debug, Default)]
pub struct AnswerabilityGate {
    active: Option<MessageId>,
}

impl AnswerabilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, id: MessageId) -> bool {
        self.active == Some(id)
    }

    pub fn active_id(&self) -> Option<MessageId> {
        self.active
    }

    pub(crate) fn activate(&mut self, id: MessageId) {
        self.active = Some(id);
    }

    /// Nothing is answerable while a request is in flight.
    pub(crate) fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_activation_is_active() {
        let mut gate = AnswerabilityGate::new();
        let first = MessageId::new();
        let second = MessageId::new();

        gate.activate(first);
        assert!(gate.is_active(first));

        gate.activate(second);
        assert!(!gate.is_active(first));
        assert!(gate.is_active(second));

        gate.clear();
        assert!(!gate.is_active(second));
        assert_eq!(gate.active_id(), None);
    }
}
