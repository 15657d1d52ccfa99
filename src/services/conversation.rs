use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::database::DbPool;
use crate::delivery::{DeliveryBus, MessageFeed};
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::services::{directory, message_log};
use crate::utils::error::{AppError, AppResult};

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Composes the conversation directory, the message log and the
/// delivery bus into the two operations callers need: send a message
/// between two participants, and observe their conversation.
#[derive(Clone)]
pub struct ConversationService {
    db: DbPool,
    bus: Arc<DeliveryBus>,
    op_timeout: Duration,
}

impl ConversationService {
    pub fn new(db: DbPool, bus: Arc<DeliveryBus>) -> Self {
        Self {
            db,
            bus,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Resolves (or creates) the pair's conversation, appends the
    /// message, then publishes it to live observers. The append commits
    /// before the publish: a degraded publish never hides a durable
    /// message, and a published message is always readable via history.
    pub async fn send_message(
        &self,
        from_id: &str,
        to_id: &str,
        content: &str,
    ) -> AppResult<Message> {
        let conversation = self
            .bounded(directory::resolve_or_create(&self.db, from_id, to_id))
            .await?;

        let message = self
            .bounded(message_log::append(
                &self.db,
                &conversation.id,
                from_id,
                content,
            ))
            .await?;

        let delivered = self.bus.publish(&message).await;
        tracing::debug!(
            message_id = %message.id,
            conversation_id = %conversation.id,
            delivered,
            "message appended and published"
        );

        Ok(message)
    }

    /// Full history plus a live feed for what comes next. The feed is
    /// attached before the history snapshot is taken, then resumed past
    /// the snapshot's last sequence number, so a message appended in
    /// the gap is neither dropped nor delivered twice.
    pub async fn observe(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> AppResult<(Conversation, Vec<Message>, MessageFeed)> {
        let conversation = self
            .bounded(directory::resolve_or_create(&self.db, from_id, to_id))
            .await?;

        let feed = self.bus.subscribe(&conversation.id).await;
        let history = self
            .bounded(message_log::list_all(&self.db, &conversation.id))
            .await?;

        let last_seq = history.last().map(|m| m.seq).unwrap_or(0);
        Ok((conversation, history, feed.after(last_seq)))
    }

    /// Marks the peer's messages in the pair's conversation as read.
    pub async fn mark_read(&self, from_id: &str, to_id: &str) -> AppResult<u64> {
        let conversation = self
            .bounded(directory::resolve_or_create(&self.db, from_id, to_id))
            .await?;

        self.bounded(message_log::mark_read(&self.db, &conversation.id, from_id))
            .await
    }

    async fn bounded<T>(&self, op: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout),
        }
    }
}
