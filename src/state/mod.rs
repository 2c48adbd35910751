mod gate;
mod message;
mod store;

pub use gate::AnswerabilityGate;
pub use message::{Message, MessageId, Sender};
pub use store::ConversationStore;
