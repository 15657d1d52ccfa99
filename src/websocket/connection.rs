use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use super::events::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::delivery::FeedEvent;

/// Drives one observer connection: history snapshot first, then live
/// feed forwarding, with inbound send/heartbeat frames handled on the
/// same loop.
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>, me: String, peer: String) {
    let (mut sink, mut stream) = socket.split();

    let (conversation, history, mut feed) = match state.service.observe(&me, &peer).await {
        Ok(observed) => observed,
        Err(err) => {
            let _ = send_event(
                &mut sink,
                &ServerMessage::Error {
                    message: err.to_string(),
                },
            )
            .await;
            return;
        }
    };

    tracing::debug!(conversation_id = %conversation.id, participant = %me, "observer attached");

    if !send_event(
        &mut sink,
        &ServerMessage::Connected {
            conversation_id: conversation.id.clone(),
        },
    )
    .await
        || !send_event(&mut sink, &ServerMessage::History { messages: history }).await
    {
        feed.cancel();
        return;
    }

    loop {
        tokio::select! {
            event = feed.recv() => match event {
                Some(FeedEvent::Message(message)) => {
                    if !send_event(&mut sink, &ServerMessage::NewMessage { message }).await {
                        break;
                    }
                }
                Some(FeedEvent::Lagged(skipped)) => {
                    tracing::warn!(conversation_id = %conversation.id, skipped, "observer lagged");
                    if !send_event(&mut sink, &ServerMessage::Lagged { skipped }).await {
                        break;
                    }
                }
                None => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Some(reply) = handle_client_frame(&state, &me, &peer, &text).await
                        && !send_event(&mut sink, &reply).await
                    {
                        break;
                    }
                }
                Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    feed.cancel();
    tracing::debug!(conversation_id = %conversation.id, participant = %me, "observer detached");
}

async fn handle_client_frame(
    state: &Arc<AppState>,
    me: &str,
    peer: &str,
    text: &str,
) -> Option<ServerMessage> {
    let frame = match serde_json::from_str::<ClientMessage>(text) {
        Ok(frame) => frame,
        Err(_) => {
            return Some(ServerMessage::Error {
                message: "malformed frame".to_string(),
            });
        }
    };

    match frame {
        ClientMessage::SendMessage { content } => {
            // the sender observes the same feed, so success needs no
            // direct reply; the published message comes back through it
            match state.service.send_message(me, peer, &content).await {
                Ok(_) => None,
                Err(err) => Some(ServerMessage::Error {
                    message: err.to_string(),
                }),
            }
        }
        ClientMessage::MarkRead => match state.service.mark_read(me, peer).await {
            Ok(updated) => Some(ServerMessage::MessagesRead { updated }),
            Err(err) => Some(ServerMessage::Error {
                message: err.to_string(),
            }),
        },
        ClientMessage::Heartbeat => Some(ServerMessage::Pong),
    }
}

async fn send_event(sink: &mut SplitSink<WebSocket, WsMessage>, event: &ServerMessage) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => sink.send(WsMessage::Text(json)).await.is_ok(),
        Err(_) => false,
    }
}
