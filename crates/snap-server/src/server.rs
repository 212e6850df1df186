//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, Score, ServerMessage};
use crate::session::{FiredCall, GameSession, SessionError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use snap_core::{EngineConfig, GameAction, GameEvent, GameSnapshot, ScheduledCall};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// Active games keyed by the player playing them
    pub sessions: DashMap<Uuid, GameSession>,
    /// Mapping from player ID to their message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Settings every new game starts from
    pub config: EngineConfig,
}

impl ServerState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            player_senders: DashMap::new(),
            config,
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    fn send_error(&self, player_id: Uuid, err: impl ToString) {
        self.send_to_player(
            player_id,
            ServerMessage::Error {
                message: err.to_string(),
            },
        );
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Snap server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
///
/// Client messages and fired timers are both handled on this task, one at
/// a time, so the engine never sees two calls at once.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign a player ID
    let player_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    // Timers post their calls back here
    let (calls_tx, mut calls_rx) = mpsc::unbounded_channel::<FiredCall>();

    // Send welcome message
    let welcome = ServerMessage::Welcome { player_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            msg = ws_receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                        handle_message(player_id, client_msg, &state, &calls_tx);
                    } else {
                        warn!("Invalid message from {}: {}", player_id, text);
                        state.send_error(player_id, "Invalid message");
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("Client {} closing connection", player_id);
                    break;
                }
                Some(Ok(Message::Ping(_))) => {
                    state.send_to_player(player_id, ServerMessage::Pong);
                }
                Some(Err(e)) => {
                    error!("WebSocket error from {}: {}", player_id, e);
                    break;
                }
                Some(Ok(_)) => {}
            },
            Some((generation, call)) = calls_rx.recv() => {
                handle_fired(player_id, generation, call, &state);
            }
        }
    }

    // Clean up on disconnect
    state.sessions.remove(&player_id);
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(
    player_id: Uuid,
    msg: ClientMessage,
    state: &Arc<ServerState>,
    calls: &mpsc::UnboundedSender<FiredCall>,
) {
    match msg {
        ClientMessage::NewGame {
            player_name,
            difficulty,
        } => {
            let generation = state
                .sessions
                .get(&player_id)
                .map_or(0, |s| s.generation + 1);

            match GameSession::new(
                player_name,
                difficulty,
                &state.config,
                generation,
                calls.clone(),
            ) {
                Ok(session) => {
                    info!(
                        "Player {} started game {} ({:?})",
                        player_id, session.id, difficulty
                    );
                    let started = ServerMessage::GameStarted {
                        session: session.to_info(),
                        state: session.snapshot(),
                    };
                    state.sessions.insert(player_id, session);
                    state.send_to_player(player_id, started);
                }
                Err(e) => state.send_error(player_id, e),
            }
        }

        ClientMessage::Play => apply_action(player_id, GameAction::Play, state),
        ClientMessage::Snap => apply_action(player_id, GameAction::Snap, state),
        ClientMessage::Next => apply_action(player_id, GameAction::Next, state),

        ClientMessage::GetState => {
            let snapshot = state.sessions.get(&player_id).map(|s| s.snapshot());
            match snapshot {
                Some(snapshot) => {
                    state.send_to_player(player_id, ServerMessage::GameState { state: snapshot })
                }
                None => state.send_error(player_id, SessionError::NoActiveGame),
            }
        }

        ClientMessage::Ping => {
            state.send_to_player(player_id, ServerMessage::Pong);
        }
    }
}

fn apply_action(player_id: Uuid, action: GameAction, state: &Arc<ServerState>) {
    let Some(mut session) = state.sessions.get_mut(&player_id) else {
        state.send_error(player_id, SessionError::NoActiveGame);
        return;
    };

    let events = session.apply(action);
    let snapshot = session.snapshot();
    let score = session.score;
    drop(session); // Release lock before sending

    debug!("Player {} {:?}: {} events", player_id, action, events.len());
    publish(player_id, events, snapshot, score, state);
}

/// Handle a timer firing for the computer.
fn handle_fired(
    player_id: Uuid,
    generation: u64,
    call: ScheduledCall,
    state: &Arc<ServerState>,
) {
    let Some(mut session) = state.sessions.get_mut(&player_id) else {
        return;
    };

    let events = session.fire(generation, call);
    let snapshot = session.snapshot();
    let score = session.score;
    drop(session);

    debug!("Fired {:?} for {}: {} events", call, player_id, events.len());
    publish(player_id, events, snapshot, score, state);
}

/// Push events, the new table and any round result to the player.
/// Ignored calls produce no events and send nothing.
fn publish(
    player_id: Uuid,
    events: Vec<GameEvent>,
    snapshot: GameSnapshot,
    score: Score,
    state: &Arc<ServerState>,
) {
    if events.is_empty() {
        return;
    }

    let winner = events.iter().find_map(GameEvent::round_winner);

    state.send_to_player(player_id, ServerMessage::Events { events });
    state.send_to_player(player_id, ServerMessage::GameState { state: snapshot });

    if let Some(winner) = winner {
        info!("Round won by {} for player {}", winner, player_id);
        state.send_to_player(player_id, ServerMessage::RoundOver { winner, score });
    }
}
