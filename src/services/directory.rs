use crate::database::DbPool;
use crate::models::conversation::Conversation;
use crate::services::identity;
use crate::utils::error::{AppError, AppResult};

/// Resolves the unique conversation for an unordered participant pair,
/// creating it on first contact.
///
/// Creation races on the same pair are settled by the unique constraint
/// on the normalized pair: every caller attempts a conditional insert
/// and then reads back the single row that won.
pub async fn resolve_or_create(
    pool: &DbPool,
    participant_a: &str,
    participant_b: &str,
) -> AppResult<Conversation> {
    if participant_a == participant_b {
        return Err(AppError::InvalidParticipants(
            "a conversation needs two distinct participants".to_string(),
        ));
    }

    identity::lookup(pool, participant_a).await?;
    identity::lookup(pool, participant_b).await?;

    let candidate = Conversation::new(participant_a.to_string(), participant_b.to_string());

    sqlx::query(
        "INSERT INTO conversations (id, participant_a, participant_b, created_at, last_message_at)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (participant_a, participant_b) DO NOTHING",
    )
    .bind(&candidate.id)
    .bind(&candidate.participant_a)
    .bind(&candidate.participant_b)
    .bind(&candidate.created_at)
    .bind(&candidate.last_message_at)
    .execute(pool.as_ref())
    .await?;

    let conversation = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE participant_a = ? AND participant_b = ?",
    )
    .bind(&candidate.participant_a)
    .bind(&candidate.participant_b)
    .fetch_one(pool.as_ref())
    .await?;

    Ok(conversation)
}

/// A participant's conversations, most recent activity first.
pub async fn get_user_conversations(
    pool: &DbPool,
    participant_id: &str,
) -> AppResult<Vec<Conversation>> {
    let conversations = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE participant_a = ? OR participant_b = ?
         ORDER BY last_message_at DESC",
    )
    .bind(participant_id)
    .bind(participant_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(conversations)
}
