//! Game session management.

use snap_core::{
    ConfigError, Difficulty, EngineConfig, GameAction, GameEngine, GameEvent, GameSnapshot,
    ScheduledCall, Scheduler,
};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::{Score, SessionInfo};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No game in progress")]
    NoActiveGame,

    #[error("Invalid game settings: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// A scheduled call tagged with the game it belongs to
pub type FiredCall = (u64, ScheduledCall);

/// Scheduler backed by tokio timers.
///
/// Each request becomes a sleeping task that posts the call back to the
/// connection's channel, so it runs on the same task as client messages.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    generation: u64,
    calls: mpsc::UnboundedSender<FiredCall>,
}

impl TokioScheduler {
    pub fn new(generation: u64, calls: mpsc::UnboundedSender<FiredCall>) -> Self {
        Self { generation, calls }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&mut self, delay: Duration, call: ScheduledCall) {
        let generation = self.generation;
        let calls = self.calls.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver is gone once the connection closes
            let _ = calls.send((generation, call));
        });
    }
}

/// One player's game against the computer.
pub struct GameSession {
    pub id: Uuid,
    pub player_name: String,
    pub difficulty: Option<Difficulty>,
    pub score: Score,
    /// Bumped on every new game and every new round so timers left over
    /// from a finished round can be told apart
    pub generation: u64,
    engine: GameEngine<TokioScheduler>,
}

impl GameSession {
    pub fn new(
        player_name: String,
        difficulty: Option<Difficulty>,
        base: &EngineConfig,
        generation: u64,
        calls: mpsc::UnboundedSender<FiredCall>,
    ) -> Result<Self, SessionError> {
        let config = match difficulty {
            Some(difficulty) => EngineConfig {
                reaction_delay_ms: difficulty.reaction_delay_ms(),
                ..base.clone()
            },
            None => base.clone(),
        };
        config.validate()?;

        let scheduler = TokioScheduler::new(generation, calls);
        Ok(Self {
            id: Uuid::new_v4(),
            player_name,
            difficulty,
            score: Score::default(),
            generation,
            engine: GameEngine::new(config, scheduler),
        })
    }

    /// Apply a human gesture
    pub fn apply(&mut self, action: GameAction) -> Vec<GameEvent> {
        if self.starts_round(action) {
            self.advance_generation();
        }
        let events = self.engine.apply(action);
        self.tally(&events);
        events
    }

    /// Run a fired timer, dropping it if it belongs to an earlier round
    pub fn fire(&mut self, generation: u64, call: ScheduledCall) -> Vec<GameEvent> {
        if generation != self.generation {
            return Vec::new();
        }
        if call == ScheduledCall::NextRound && self.engine.winner().is_some() {
            self.advance_generation();
        }
        let events = self.engine.fire(call);
        self.tally(&events);
        events
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.engine.snapshot()
    }

    pub fn to_info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            player_name: self.player_name.clone(),
            difficulty: self.difficulty,
            score: self.score,
        }
    }

    fn starts_round(&self, action: GameAction) -> bool {
        match action {
            GameAction::Reset => true,
            GameAction::Next => self.engine.winner().is_some(),
            GameAction::Play | GameAction::Snap => false,
        }
    }

    // Calls the new round schedules carry the new generation
    fn advance_generation(&mut self) {
        self.generation += 1;
        self.engine.scheduler_mut().generation = self.generation;
    }

    fn tally(&mut self, events: &[GameEvent]) {
        for winner in events.iter().filter_map(GameEvent::round_winner) {
            self.score.record(winner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap_core::Player;

    fn session(generation: u64) -> (GameSession, mpsc::UnboundedReceiver<FiredCall>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = GameSession::new(
            "Tester".to_string(),
            Some(Difficulty::Hard),
            &EngineConfig::default(),
            generation,
            tx,
        )
        .unwrap();
        (session, rx)
    }

    #[tokio::test]
    async fn test_create_session() {
        let (session, _rx) = session(0);
        assert_eq!(session.player_name, "Tester");
        assert_eq!(session.to_info().difficulty, Some(Difficulty::Hard));
        assert_eq!(session.score, Score::default());
        assert_eq!(session.snapshot().cursor, -1);
    }

    #[tokio::test]
    async fn test_false_snap_scores_for_computer() {
        let (mut session, _rx) = session(0);
        let events = session.apply(GameAction::Snap);
        assert!(events
            .iter()
            .any(|e| e.round_winner() == Some(Player::Computer)));
        assert_eq!(session.score, Score { human: 0, computer: 1 });

        // Decided round ignores more snaps
        assert!(session.apply(GameAction::Snap).is_empty());
        assert_eq!(session.score.computer, 1);
    }

    #[tokio::test]
    async fn test_stale_generation_is_dropped() {
        let (mut session, _rx) = session(3);
        let before = session.snapshot();
        assert!(session.fire(2, ScheduledCall::ComputerPlay).is_empty());
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test]
    async fn test_next_round_drops_leftover_timers() {
        let (mut session, _rx) = session(0);

        // Nothing on the table yet, so this snap is false
        session.apply(GameAction::Snap);
        assert_eq!(session.generation, 0);

        let events = session.apply(GameAction::Next);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::SpoilsCollected { .. })));
        assert_eq!(session.generation, 1);

        let before = session.snapshot();
        assert!(session.fire(0, ScheduledCall::ComputerPlay).is_empty());
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test]
    async fn test_next_mid_round_keeps_timers() {
        let (mut session, _rx) = session(2);
        assert!(session.apply(GameAction::Next).is_empty());
        assert_eq!(session.generation, 2);
    }

    #[tokio::test]
    async fn test_tokio_scheduler_posts_back() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(7, tx);
        scheduler.schedule_after(Duration::from_millis(5), ScheduledCall::ComputerPlay);
        assert_eq!(rx.recv().await, Some((7, ScheduledCall::ComputerPlay)));
    }

    #[tokio::test]
    async fn test_zero_delay_config_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let base = EngineConfig {
            reaction_delay_ms: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            GameSession::new("A".into(), None, &base, 0, tx.clone()),
            Err(SessionError::InvalidConfig(ConfigError::ZeroReactionDelay))
        ));

        // A difficulty preset replaces the zero delay
        assert!(GameSession::new("A".into(), Some(Difficulty::Easy), &base, 0, tx).is_ok());
    }
}
