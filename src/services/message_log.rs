use crate::database::DbPool;
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::utils::error::{AppError, AppResult};

/// Appends a message to a conversation's log.
///
/// The per-conversation sequence number is assigned inside the insert
/// statement itself, so the insert is the serialization point for
/// concurrent appends to the same conversation. Appends to different
/// conversations need no coordination.
pub async fn append(
    pool: &DbPool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
) -> AppResult<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::EmptyContent);
    }

    let conversation = fetch_conversation(pool, conversation_id).await?;
    if !conversation.has_participant(sender_id) {
        return Err(AppError::ForbiddenSender(format!(
            "{sender_id} is not a participant of this conversation"
        )));
    }

    let message = Message::new(
        conversation_id.to_string(),
        sender_id.to_string(),
        content.to_string(),
    );

    sqlx::query(
        "INSERT INTO messages (id, conversation_id, sender_id, content, created_at, seq, is_read)
         SELECT ?, ?, ?, ?, ?, COALESCE(MAX(seq), 0) + 1, 0
         FROM messages WHERE conversation_id = ?",
    )
    .bind(&message.id)
    .bind(&message.conversation_id)
    .bind(&message.sender_id)
    .bind(&message.content)
    .bind(&message.created_at)
    .bind(conversation_id)
    .execute(pool.as_ref())
    .await?;

    sqlx::query("UPDATE conversations SET last_message_at = ? WHERE id = ?")
        .bind(&message.created_at)
        .bind(conversation_id)
        .execute(pool.as_ref())
        .await?;

    // read back for the assigned sequence number
    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(&message.id)
        .fetch_one(pool.as_ref())
        .await?;

    Ok(message)
}

/// Full history in ascending ordering-key order. Reflects every append
/// committed before the call; repeatable given no new appends.
pub async fn list_all(pool: &DbPool, conversation_id: &str) -> AppResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE conversation_id = ? ORDER BY seq ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(messages)
}

/// Marks every message not sent by the reader as read. Returns the
/// number of rows updated.
pub async fn mark_read(pool: &DbPool, conversation_id: &str, reader_id: &str) -> AppResult<u64> {
    let conversation = fetch_conversation(pool, conversation_id).await?;
    if !conversation.has_participant(reader_id) {
        return Err(AppError::ForbiddenSender(format!(
            "{reader_id} is not a participant of this conversation"
        )));
    }

    let result = sqlx::query(
        "UPDATE messages SET is_read = 1
         WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
    )
    .bind(conversation_id)
    .bind(reader_id)
    .execute(pool.as_ref())
    .await?;

    Ok(result.rows_affected())
}

async fn fetch_conversation(pool: &DbPool, conversation_id: &str) -> AppResult<Conversation> {
    sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = ?")
        .bind(conversation_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::UnknownConversation(conversation_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{memory_pool, seed_participant};
    use crate::services::directory::resolve_or_create;

    async fn setup() -> (DbPool, Conversation) {
        let pool = memory_pool().await;
        seed_participant(&pool, "u1").await;
        seed_participant(&pool, "u2").await;
        seed_participant(&pool, "u3").await;
        let conversation = resolve_or_create(&pool, "u1", "u2").await.unwrap();
        (pool, conversation)
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_sequence() {
        let (pool, conv) = setup().await;

        let first = append(&pool, &conv.id, "u1", "hi").await.unwrap();
        let second = append(&pool, &conv.id, "u2", "hello").await.unwrap();
        let third = append(&pool, &conv.id, "u1", "how are you").await.unwrap();

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(third.seq, 3);
    }

    #[tokio::test]
    async fn test_list_all_is_ordered_and_idempotent() {
        let (pool, conv) = setup().await;

        for i in 0..5 {
            append(&pool, &conv.id, "u1", &format!("msg {i}"))
                .await
                .unwrap();
        }

        let first_read = list_all(&pool, &conv.id).await.unwrap();
        assert_eq!(first_read.len(), 5);
        for window in first_read.windows(2) {
            assert!(window[0].seq < window[1].seq);
            assert!(window[0].created_at <= window[1].created_at);
        }

        let second_read = list_all(&pool, &conv.id).await.unwrap();
        let first_ids: Vec<&str> = first_read.iter().map(|m| m.id.as_str()).collect();
        let second_ids: Vec<&str> = second_read.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn test_empty_content_persists_nothing() {
        let (pool, conv) = setup().await;

        let err = append(&pool, &conv.id, "u1", "   \n\t ").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyContent));

        let messages = list_all(&pool, &conv.id).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_content_is_trimmed() {
        let (pool, conv) = setup().await;

        let message = append(&pool, &conv.id, "u1", "  hi  ").await.unwrap();
        assert_eq!(message.content, "hi");
    }

    #[tokio::test]
    async fn test_forbidden_sender_persists_nothing() {
        let (pool, conv) = setup().await;

        let err = append(&pool, &conv.id, "u3", "let me in").await.unwrap_err();
        assert!(matches!(err, AppError::ForbiddenSender(_)));

        let messages = list_all(&pool, &conv.id).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let (pool, _conv) = setup().await;

        let err = append(&pool, "no-such-id", "u1", "hi").await.unwrap_err();
        assert!(matches!(err, AppError::UnknownConversation(_)));
    }

    #[tokio::test]
    async fn test_append_updates_last_activity() {
        let (pool, conv) = setup().await;

        let message = append(&pool, &conv.id, "u1", "hi").await.unwrap();

        let updated: String =
            sqlx::query_scalar("SELECT last_message_at FROM conversations WHERE id = ?")
                .bind(&conv.id)
                .fetch_one(pool.as_ref())
                .await
                .unwrap();
        assert_eq!(updated, message.created_at);
    }

    #[tokio::test]
    async fn test_mark_read_flips_peer_messages_only() {
        let (pool, conv) = setup().await;

        append(&pool, &conv.id, "u1", "one").await.unwrap();
        append(&pool, &conv.id, "u1", "two").await.unwrap();
        append(&pool, &conv.id, "u2", "three").await.unwrap();

        let updated = mark_read(&pool, &conv.id, "u2").await.unwrap();
        assert_eq!(updated, 2);

        let messages = list_all(&pool, &conv.id).await.unwrap();
        assert!(messages.iter().filter(|m| m.sender_id == "u1").all(|m| m.is_read == 1));
        assert!(messages.iter().filter(|m| m.sender_id == "u2").all(|m| m.is_read == 0));

        // second pass finds nothing left to update
        let updated = mark_read(&pool, &conv.id, "u2").await.unwrap();
        assert_eq!(updated, 0);
    }

    #[tokio::test]
    async fn test_mark_read_requires_membership() {
        let (pool, conv) = setup().await;

        let err = mark_read(&pool, &conv.id, "u3").await.unwrap_err();
        assert!(matches!(err, AppError::ForbiddenSender(_)));
    }
}
