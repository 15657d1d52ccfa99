pub mod conversation;
pub mod directory;
pub mod identity;
pub mod message_log;
