//! Chat transcript storage and mutation boundary

pub mod gateway;
pub mod store;

pub use gateway::ChatGateway;
pub use store::{Chat, ChatId, ChatStore, Message, Role, CHATS_TAG};
