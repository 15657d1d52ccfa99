use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single persisted message. Immutable once written except for the
/// read flag. `seq` is the per-conversation ordering key, assigned at
/// insert time; `created_at` is carried for display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
    pub seq: i64,
    pub is_read: i64,
}

impl Message {
    pub fn new(conversation_id: String, sender_id: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id,
            sender_id,
            content,
            created_at: Utc::now().to_rfc3339(),
            // placeholder until the insert assigns the real sequence
            seq: 0,
            is_read: 0,
        }
    }
}
