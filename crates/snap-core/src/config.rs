//! Timing configuration for the simulated opponent.
//!
//! The engine never measures time itself. These values are handed to the
//! [`Scheduler`](crate::scheduler::Scheduler) together with each request.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Delay before the computer reacts to its turn or to a snap on the table
pub const DEFAULT_REACTION_DELAY_MS: u64 = 1500;

/// Delay between a finished round and the next one when auto-continuing
pub const DEFAULT_PLAY_DELAY_MS: u64 = 3000;

/// Delay before the computer's opening card when it moves first
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Reaction delay must be greater than zero")]
    ZeroReactionDelay,
}

/// How quickly the computer reacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Reaction delay preset in milliseconds
    pub fn reaction_delay_ms(&self) -> u64 {
        match self {
            Difficulty::Easy => 2500,
            Difficulty::Medium => DEFAULT_REACTION_DELAY_MS,
            Difficulty::Hard => 800,
        }
    }
}

/// Engine timing settings, plain numbers so they can be set from anywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub reaction_delay_ms: u64,
    pub play_delay_ms: u64,
    pub initial_delay_ms: u64,
    /// Ask the scheduler to start the next round after `play_delay_ms`
    pub auto_continue: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reaction_delay_ms: DEFAULT_REACTION_DELAY_MS,
            play_delay_ms: DEFAULT_PLAY_DELAY_MS,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            auto_continue: false,
        }
    }
}

impl EngineConfig {
    /// Default timings with the reaction delay of a difficulty preset
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self {
            reaction_delay_ms: difficulty.reaction_delay_ms(),
            ..Self::default()
        }
    }

    pub fn reaction_delay(&self) -> Duration {
        Duration::from_millis(self.reaction_delay_ms)
    }

    pub fn play_delay(&self) -> Duration {
        Duration::from_millis(self.play_delay_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Check the settings make a playable game
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reaction_delay_ms == 0 {
            return Err(ConfigError::ZeroReactionDelay);
        }
        Ok(())
    }
}
