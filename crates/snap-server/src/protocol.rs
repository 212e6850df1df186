//! WebSocket protocol messages for Snap.

use serde::{Deserialize, Serialize};
use snap_core::{Difficulty, GameEvent, GameSnapshot, Player};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Start a fresh game against the computer
    NewGame {
        player_name: String,
        /// Falls back to the server's configured reaction delay
        #[serde(default)]
        difficulty: Option<Difficulty>,
    },

    /// Lay the next card
    Play,

    /// Call snap
    Snap,

    /// Continue to the next round
    Next,

    /// Request the current table
    GetState,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned player ID
    Welcome { player_id: Uuid },

    /// Game created and first round dealt
    GameStarted {
        session: SessionInfo,
        state: GameSnapshot,
    },

    /// Table updated
    GameState { state: GameSnapshot },

    /// What changed since the last update
    Events { events: Vec<GameEvent> },

    /// A round has been decided
    RoundOver { winner: Player, score: Score },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// Rounds won by each side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub human: u32,
    pub computer: u32,
}

impl Score {
    pub fn record(&mut self, winner: Player) {
        match winner {
            Player::Human => self.human += 1,
            Player::Computer => self.computer += 1,
        }
    }
}

/// Session information for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub player_name: String,
    pub difficulty: Option<Difficulty>,
    pub score: Score,
}
