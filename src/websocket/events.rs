use serde::{Deserialize, Serialize};

use crate::models::message::Message;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SendMessage { content: String },
    MarkRead,
    Heartbeat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        conversation_id: String,
    },
    History {
        messages: Vec<Message>,
    },
    NewMessage {
        message: Message,
    },
    /// The feed fell behind and dropped `skipped` messages; the client
    /// should refetch history to fill the gap.
    Lagged {
        skipped: u64,
    },
    MessagesRead {
        updated: u64,
    },
    Error {
        message: String,
    },
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_tagging() {
        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"send_message","content":"hi"}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::SendMessage { content } if content == "hi"));

        let parsed: ClientMessage = serde_json::from_str(r#"{"type":"heartbeat"}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::Heartbeat));
    }

    #[test]
    fn test_server_message_tagging() {
        let json = serde_json::to_string(&ServerMessage::Lagged { skipped: 3 }).unwrap();
        assert!(json.contains(r#""type":"lagged""#));
        assert!(json.contains(r#""skipped":3"#));
    }
}
