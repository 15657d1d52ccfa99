use futures_util::Stream;
use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use crate::models::message::Message;

/// Bounded per-topic buffer. A subscriber that falls further behind
/// than this sees a `Lagged` gap signal instead of stalling the sender.
const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum FeedEvent {
    Message(Message),
    /// The subscriber fell behind and `skipped` messages were dropped
    /// from its buffer. History stays correct via the message log.
    Lagged(u64),
}

/// Fan-out of newly appended messages, one broadcast topic per
/// conversation. Subscribers only ever see messages published after
/// they attached; retroactive history comes from the message log.
pub struct DeliveryBus {
    topics: RwLock<HashMap<String, broadcast::Sender<Message>>>,
}

impl DeliveryBus {
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    pub async fn subscribe(&self, conversation_id: &str) -> MessageFeed {
        let mut topics = self.topics.write().await;
        let tx = topics
            .entry(conversation_id.to_string())
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0);

        MessageFeed {
            rx: tx.subscribe(),
            cancel: CancellationToken::new(),
            resume_after: 0,
        }
    }

    /// Sends to current subscribers of the message's conversation and
    /// returns how many received it. Never blocks; a topic with no
    /// remaining subscribers is dropped from the registry.
    pub async fn publish(&self, message: &Message) -> usize {
        let delivered = {
            let topics = self.topics.read().await;
            match topics.get(&message.conversation_id) {
                Some(tx) => tx.send(message.clone()).unwrap_or(0),
                None => 0,
            }
        };

        if delivered == 0 {
            let mut topics = self.topics.write().await;
            let stale = topics
                .get(&message.conversation_id)
                .is_some_and(|tx| tx.receiver_count() == 0);
            if stale {
                topics.remove(&message.conversation_id);
            }
        }

        delivered
    }
}

impl Default for DeliveryBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live, cancellable feed of one conversation's messages.
pub struct MessageFeed {
    rx: broadcast::Receiver<Message>,
    cancel: CancellationToken,
    resume_after: i64,
}

impl MessageFeed {
    /// Skips messages at or below `seq`, for resuming past a history
    /// snapshot without duplicates.
    pub fn after(mut self, seq: i64) -> Self {
        self.resume_after = seq;
        self
    }

    /// Next event, in append order. `None` once cancelled or the topic
    /// is gone.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                result = self.rx.recv() => match result {
                    Ok(message) => {
                        if message.seq <= self.resume_after {
                            continue;
                        }
                        return Some(FeedEvent::Message(message));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        return Some(FeedEvent::Lagged(skipped));
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            }
        }
    }

    /// Idempotent; `recv` returns `None` promptly afterwards.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn into_stream(mut self) -> impl Stream<Item = FeedEvent> {
        async_stream::stream! {
            while let Some(event) = self.recv().await {
                yield event;
            }
        }
    }
}
