//! Player gestures and the events they produce.
//!
//! The presentation layer sends [`GameAction`]s on behalf of the human and
//! re-renders from the engine state afterwards. [`GameEvent`]s describe what
//! changed, so a host can animate or log it without diffing state.

use crate::card::{Card, Player};
use serde::{Deserialize, Serialize};

/// Everything the human can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameAction {
    /// Shuffle, deal and start over
    Reset,
    /// Lay the next card
    Play,
    /// Call snap on the two top cards
    Snap,
    /// Collect the spoils and start the next round
    Next,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// Snap was called on a real match
    SnapCalled,
    /// Snap was called with no match on the table
    FalseSnap,
    /// The computer laid a card over an uncalled snap
    PlayedThroughSnap,
    /// The next card belongs to the player who just played
    OpponentExhausted,
    /// The last card of the deck was played
    DeckExhausted,
}

/// Events that occur as a result of engine calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Deck was shuffled and dealt
    RoundStarted { turn: Player },

    /// A card moved into the played zone
    CardPlayed {
        player: Player,
        card: Card,
        cursor: usize,
    },

    /// Snap was called
    SnapCalled { correct: bool },

    /// A round has a winner
    RoundWon { winner: Player, reason: WinReason },

    /// Played cards went back into the deck
    SpoilsCollected {
        winner: Player,
        woven: usize,
        appended: usize,
    },

    /// The computer will act after a delay
    ComputerScheduled { delay_ms: u64 },
}

impl GameEvent {
    /// Winner, if this event ended a round
    pub fn round_winner(&self) -> Option<Player> {
        match self {
            GameEvent::RoundWon { winner, .. } => Some(*winner),
            _ => None,
        }
    }
}
