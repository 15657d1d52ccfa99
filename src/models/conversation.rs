use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The unique channel between exactly two participants. The pair is
/// stored sorted so {A,B} and {B,A} resolve to the same row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: String,
    pub participant_a: String,
    pub participant_b: String,
    pub created_at: String,
    pub last_message_at: String,
}

impl Conversation {
    pub fn new(participant_a: String, participant_b: String) -> Self {
        let (participant_a, participant_b) = Self::normalize_pair(participant_a, participant_b);
        let now = Utc::now().to_rfc3339();

        Self {
            id: Uuid::new_v4().to_string(),
            participant_a,
            participant_b,
            created_at: now.clone(),
            last_message_at: now,
        }
    }

    /// Orders a pair lexicographically so lookups are independent of
    /// argument order.
    pub fn normalize_pair(mut a: String, mut b: String) -> (String, String) {
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        (a, b)
    }

    pub fn has_participant(&self, participant_id: &str) -> bool {
        self.participant_a == participant_id || self.participant_b == participant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pair_orders_lexicographically() {
        let (a, b) = Conversation::normalize_pair("zoe".to_string(), "amy".to_string());
        assert_eq!(a, "amy");
        assert_eq!(b, "zoe");

        let (a, b) = Conversation::normalize_pair("amy".to_string(), "zoe".to_string());
        assert_eq!(a, "amy");
        assert_eq!(b, "zoe");
    }

    #[test]
    fn test_new_normalizes_pair() {
        let conv = Conversation::new("u2".to_string(), "u1".to_string());
        assert_eq!(conv.participant_a, "u1");
        assert_eq!(conv.participant_b, "u2");
    }

    #[test]
    fn test_has_participant() {
        let conv = Conversation::new("u1".to_string(), "u2".to_string());
        assert!(conv.has_participant("u1"));
        assert!(conv.has_participant("u2"));
        assert!(!conv.has_participant("u3"));
    }
}
