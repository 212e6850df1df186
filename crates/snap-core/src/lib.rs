//! Snap - a rules engine for the two-player card game
//!
//! This crate provides the core game logic for Snap, including:
//! - The 52-card deck with fair shuffling and alternating deals
//! - The turn state machine shared by the human and the computer
//! - Snap detection and round resolution
//! - Re-weaving the played cards into the deck for the round winner
//!
//! # Architecture
//!
//! The engine is synchronous and never waits. Whenever the simulated
//! opponent should act later, the engine asks an injected [`Scheduler`] to
//! call back after a delay; the host fires that call through
//! [`GameEngine::fire`]. It can be compiled to:
//! - Native Rust for server-side game hosting
//! - WebAssembly for a browser table
//!
//! # Modules
//!
//! - [`card`]: Suits, values, players and cards
//! - [`deck`]: The deck, dealing and spoils redistribution
//! - [`config`]: Timing settings for the computer
//! - [`scheduler`]: Deferred calls back into the engine
//! - [`engine`]: Game state machine
//! - [`actions`]: Human gestures and resulting events

pub mod actions;
pub mod card;
pub mod config;
pub mod deck;
pub mod engine;
pub mod scheduler;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, WinReason};
pub use card::{Card, Player, Suit, Value};
pub use config::{ConfigError, Difficulty, EngineConfig};
pub use deck::{Deck, DeckError, WeaveOutcome, DECK_SIZE};
pub use engine::{GameEngine, GameSnapshot};
pub use scheduler::{ManualScheduler, PendingCall, ScheduledCall, Scheduler};
