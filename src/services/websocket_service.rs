use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    dto::ws::ClientMessage,
    state::{SharedState, session::SessionConnection},
};

const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle for an individual trivia WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) =
        mpsc::channel::<Message>(state.config().connection_buffer());

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let initial_message = match tokio::time::timeout(JOIN_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            let _ = outbound_tx.try_send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(None) | Err(_) => {
            warn!("websocket join timed out");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let session_id = match ClientMessage::from_json_str(&initial_message) {
        Ok(ClientMessage::JoinSession { session_id }) => session_id,
        Ok(ClientMessage::Unknown) => {
            warn!("first message was not joinSession");
            let _ = outbound_tx.try_send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Err(err) => {
            warn!(error = %err, "failed to parse client message");
            let _ = outbound_tx.try_send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let Some(session) = state.registry().get_session(&session_id) else {
        warn!(%session_id, "websocket join for unknown session");
        let _ = outbound_tx.try_send(Message::Close(None));
        finalize(writer_task, outbound_tx).await;
        return;
    };

    let connection = SessionConnection::new(outbound_tx.clone());
    let connection_id = connection.id;
    session.add_connection(connection).await;
    session.broadcast_player_count().await;

    let mut closed = session.closed_watcher();
    loop {
        let message = tokio::select! {
            _ = closed.wait_for(|closed| *closed) => {
                info!(%session_id, %connection_id, "session closed; dropping connection");
                let _ = outbound_tx.try_send(Message::Close(None));
                break;
            }
            message = receiver.next() => message,
        };

        let Some(message) = message else {
            break;
        };

        match message {
            Ok(Message::Text(text)) => match ClientMessage::from_json_str(&text) {
                Ok(ClientMessage::JoinSession { session_id: other }) => {
                    warn!(%session_id, requested = %other, "ignoring duplicate joinSession");
                }
                Ok(ClientMessage::Unknown) => {
                    warn!(%session_id, payload = %text, "unhandled client action");
                }
                Err(err) => {
                    warn!(%session_id, error = %err, "failed to parse client message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.try_send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%session_id, %connection_id, "client closed");
                let _ = outbound_tx.try_send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%session_id, %connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    session.remove_connection(&connection_id).await;
    info!(%session_id, %connection_id, "connection detached");

    finalize(writer_task, outbound_tx).await;
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::Sender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
