pub mod client;
mod error;
pub mod legacy;
pub mod logging;
#[cfg(test)]
pub mod mock_client;
mod reply;

pub use client::ApiClient;
pub use error::ChatError;
pub use reply::{parse_reply, ReplyPayload};
