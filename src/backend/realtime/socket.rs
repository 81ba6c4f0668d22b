/**
 * WebSocket Connection Actor
 *
 * `GET /ws` upgrades to a WebSocket and runs one actor per connection:
 *
 * - Writer task: owns the sink, serialises queued `ServerEvent`s and control
 *   frames
 * - Reader loop: feeds text frames to the `Session`, answers pings, sends a
 *   ping every interval and closes after the idle timeout
 *
 * Every exit path (client close, stream end, receive error, idle timeout,
 * writer failure) ends with `Session::close`, which unregisters the
 * connection.
 */

use axum::{
    body::Bytes,
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::registry::ConnectionHandle;
use super::session::{Session, SessionContext};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::{ServerEvent, WsConfig};

/// Close code sent when the peer stops responding
const CLOSE_GOING_AWAY: u16 = 1001;

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Upgrade handler for `GET /ws`
///
/// Identity is established afterwards by the `join` frame.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_connection(socket, state))
}

/// Why the reader loop stopped
#[derive(Debug)]
enum Exit {
    ClientClosed,
    StreamEnded,
    IdleTimeout,
    /// The writer task ended on its own (sink error)
    WriterFinished,
    Transport(BackendError),
}

/// Run the actor for one upgraded socket until it terminates
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (connection, events) = ConnectionHandle::channel();
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();
    let connection_id = connection.id();

    let context = SessionContext {
        registry: state.registry.clone(),
        dispatcher: state.dispatcher.clone(),
        tokens: state.tokens.clone(),
        require_join_token: state.config.ws.require_join_token,
    };
    let mut session = Session::new(connection, context);
    let ws_config: WsConfig = state.config.ws.clone();

    tracing::info!(connection_id = %connection_id, "[Realtime] WebSocket actor started");

    let mut writer = tokio::spawn(writer_task(ws_sender, events, control_rx));

    let mut ping_timer = interval_at(Instant::now() + ws_config.ping_interval(), ws_config.ping_interval());
    ping_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();

    let exit = loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                last_seen = Instant::now();
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        // Errors are already reported to the client by the session.
                        let _ = session.handle_text(text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!(connection_id = %connection_id, "[Realtime] Ignoring binary frame");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = control_tx.send(Message::Pong(data));
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(connection_id = %connection_id, reason = ?frame, "[Realtime] Client initiated close");
                        break Exit::ClientClosed;
                    }
                    Some(Err(e)) => break Exit::Transport(BackendError::transport(e.to_string())),
                    None => break Exit::StreamEnded,
                }
            }
            _ = ping_timer.tick() => {
                if last_seen.elapsed() >= ws_config.idle_timeout() {
                    let _ = control_tx.send(Message::Close(Some(CloseFrame {
                        code: CLOSE_GOING_AWAY,
                        reason: "idle timeout".into(),
                    })));
                    break Exit::IdleTimeout;
                }
                // The writer owns the receiver, so this only fails once it is gone.
                let _ = control_tx.send(Message::Ping(Bytes::new()));
            }
            _ = &mut writer => break Exit::WriterFinished,
        }
    };

    session.close();

    match &exit {
        Exit::Transport(err) => {
            tracing::warn!(connection_id = %connection_id, "[Realtime] {}", err);
        }
        Exit::IdleTimeout | Exit::WriterFinished => {
            tracing::warn!(connection_id = %connection_id, reason = ?exit, "[Realtime] Connection dropped");
        }
        Exit::ClientClosed | Exit::StreamEnded => {}
    }

    // Closing the control channel lets the writer flush a pending close
    // frame and stop.
    drop(control_tx);
    drop(session);
    if !matches!(exit, Exit::WriterFinished)
        && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err()
    {
        writer.abort();
    }

    tracing::info!(connection_id = %connection_id, reason = ?exit, "[Realtime] WebSocket actor stopped");
}

/// Writer task: forwards queued events and control frames to the sink
async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
    mut control: mpsc::UnboundedReceiver<Message>,
) {
    loop {
        let message = tokio::select! {
            biased;
            frame = control.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
            event = events.recv() => match event {
                Some(event) => match event.to_json() {
                    Ok(json) => Message::Text(json.into()),
                    Err(e) => {
                        tracing::error!("[Realtime] Failed to serialize outbound event: {}", e);
                        continue;
                    }
                },
                None => break,
            },
        };

        let closing = matches!(message, Message::Close(_));
        if let Err(e) = ws_sender.send(message).await {
            tracing::debug!("[Realtime] WebSocket send failed: {}", e);
            break;
        }
        if closing {
            break;
        }
    }
}
