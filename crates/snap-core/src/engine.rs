//! Core game state machine.
//!
//! This module contains the `GameEngine` struct and all rules of a round:
//! dealing, laying cards, snap detection, and handing the played cards to
//! the round winner.
//!
//! The engine is driven from two surfaces. The human acts directly through
//! [`GameEngine::play`] with `is_computer = false`, [`GameEngine::call_snap`]
//! and [`GameEngine::next`]. The computer only ever acts when a call the
//! engine handed to its [`Scheduler`] fires and the host passes it back to
//! [`GameEngine::fire`]. Calls that make no sense in the current state are
//! ignored and return no events.

use crate::actions::{GameAction, GameEvent, WinReason};
use crate::card::{Card, Player};
use crate::config::EngineConfig;
use crate::deck::{Deck, DeckError};
use crate::scheduler::{ScheduledCall, Scheduler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Everything the presentation layer needs to draw the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub cards: Vec<Card>,
    /// Position of the top played card, -1 when nothing is played
    pub cursor: i32,
    pub turn: Player,
    pub winner: Option<Player>,
    pub round_ended: bool,
    pub is_snap: bool,
    pub human_cards: usize,
    pub computer_cards: usize,
}

/// A single game of Snap between a human and the computer
#[derive(Debug, Clone)]
pub struct GameEngine<S: Scheduler> {
    deck: Deck,
    /// Index of the last played card
    cursor: Option<usize>,
    turn: Player,
    winner: Option<Player>,
    round_ended: bool,
    config: EngineConfig,
    scheduler: S,
    rng: StdRng,
}

impl<S: Scheduler> GameEngine<S> {
    /// Create a game and deal the first round
    pub fn new(config: EngineConfig, scheduler: S) -> Self {
        Self::with_rng(config, scheduler, StdRng::from_entropy())
    }

    /// Create a game whose shuffles and first movers are reproducible
    pub fn with_seed(config: EngineConfig, scheduler: S, seed: u64) -> Self {
        Self::with_rng(config, scheduler, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, scheduler: S, rng: StdRng) -> Self {
        let mut engine = Self {
            deck: Deck::standard(),
            cursor: None,
            turn: Player::Human,
            winner: None,
            round_ended: false,
            config,
            scheduler,
            rng,
        };
        engine.reset();
        engine
    }

    /// Resume from an already dealt deck with nothing played yet.
    ///
    /// Every card must be held by a player. Nothing is scheduled, even when
    /// `turn` is the computer; the caller drives the first move.
    pub fn from_deck(
        deck: Deck,
        turn: Player,
        config: EngineConfig,
        scheduler: S,
    ) -> Result<Self, DeckError> {
        if let Some(card) = deck.cards().iter().find(|c| c.owner.is_none()) {
            return Err(DeckError::UnownedCard(*card));
        }

        Ok(Self {
            deck,
            cursor: None,
            turn,
            winner: None,
            round_ended: false,
            config,
            scheduler,
            rng: StdRng::from_entropy(),
        })
    }

    // ==================== Accessors ====================

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Index of the top played card, `None` before the first card of a round
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn round_ended(&self) -> bool {
        self.round_ended
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Cards already laid this round, oldest first
    pub fn played_cards(&self) -> &[Card] {
        &self.deck.cards()[..self.played_count()]
    }

    /// The most recently played card
    pub fn top_card(&self) -> Option<&Card> {
        self.cursor.and_then(|i| self.deck.get(i))
    }

    /// How many cards a player still has to play
    pub fn cards_held(&self, player: Player) -> usize {
        self.deck.held_by(player)
    }

    /// Whether the two most recently played cards share a value
    pub fn is_snap(&self) -> bool {
        match self.cursor {
            Some(i) if i >= 1 => self.deck[i].matches(&self.deck[i - 1]),
            _ => false,
        }
    }

    /// Serializable view of the whole table
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cards: self.deck.cards().to_vec(),
            cursor: self.cursor.map_or(-1, |i| i as i32),
            turn: self.turn,
            winner: self.winner,
            round_ended: self.round_ended,
            is_snap: self.is_snap(),
            human_cards: self.cards_held(Player::Human),
            computer_cards: self.cards_held(Player::Computer),
        }
    }

    // ==================== Operations ====================

    /// Apply a human gesture
    pub fn apply(&mut self, action: GameAction) -> Vec<GameEvent> {
        match action {
            GameAction::Reset => self.reset(),
            GameAction::Play => self.play(false),
            GameAction::Snap => self.call_snap(),
            GameAction::Next => self.next(),
        }
    }

    /// Run a call that the scheduler has fired
    pub fn fire(&mut self, call: ScheduledCall) -> Vec<GameEvent> {
        match call {
            ScheduledCall::ComputerPlay => self.play(true),
            ScheduledCall::NextRound => self.next(),
        }
    }

    /// Shuffle, pick who starts, and deal the deck alternately
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.round_ended = false;
        self.winner = None;

        self.deck.shuffle(&mut self.rng);

        self.turn = if self.rng.gen_bool(0.5) {
            Player::Computer
        } else {
            Player::Human
        };
        self.deck.deal_alternating(self.turn);
        self.cursor = None;

        debug!(turn = %self.turn, "new deal");

        let mut events = vec![GameEvent::RoundStarted { turn: self.turn }];
        if self.turn == Player::Computer {
            let delay = self.config.initial_delay();
            self.schedule_computer(delay, &mut events);
        }
        events
    }

    /// Lay the next card.
    ///
    /// Ignored once the round has a winner, or when the human tries to play
    /// on the computer's turn. If a snap is already on the table, the
    /// computer wins by playing over it; the human has to call snap instead,
    /// so a human play is ignored.
    pub fn play(&mut self, is_computer: bool) -> Vec<GameEvent> {
        let player = Player::from_is_computer(is_computer);

        if let Some(winner) = self.winner {
            debug!(%player, %winner, "play ignored, round is decided");
            return Vec::new();
        }

        if !is_computer && self.turn == Player::Computer {
            debug!("play ignored, waiting for the computer");
            return Vec::new();
        }

        let mut events = Vec::new();

        if self.is_snap() {
            if is_computer {
                self.declare_winner(Player::Computer, WinReason::PlayedThroughSnap, &mut events);
            } else {
                debug!("play ignored, snap is on the table");
            }
            return events;
        }

        let index = self.played_count();
        let played = self.deck[index];
        events.push(GameEvent::CardPlayed {
            player,
            card: played,
            cursor: index,
        });

        match self.deck.get(index + 1).map(|next| next.owner) {
            // The opponent has nothing left to lay before the same hand comes round again
            Some(Some(owner)) if Some(owner) == played.owner => {
                self.round_ended = true;
                self.declare_winner(owner, WinReason::OpponentExhausted, &mut events);
            }
            Some(_) => {}
            None => {
                self.round_ended = true;
                let last = played.owner.unwrap_or(player);
                self.declare_winner(last, WinReason::DeckExhausted, &mut events);
            }
        }

        if let Some(card) = self.deck.get_mut(index) {
            card.owner = None;
        }
        self.cursor = Some(index);

        self.turn = player.opponent();

        if self.turn == Player::Computer || self.is_snap() {
            let delay = self.config.reaction_delay();
            self.schedule_computer(delay, &mut events);
        }

        events
    }

    /// Call snap. Right calls win the round for the human, wrong calls lose it.
    pub fn call_snap(&mut self) -> Vec<GameEvent> {
        if self.winner.is_some() {
            debug!("snap ignored, round is decided");
            return Vec::new();
        }

        let correct = self.is_snap();
        let mut events = vec![GameEvent::SnapCalled { correct }];
        if correct {
            self.declare_winner(Player::Human, WinReason::SnapCalled, &mut events);
        } else {
            self.declare_winner(Player::Computer, WinReason::FalseSnap, &mut events);
        }
        events
    }

    /// Hand the played cards to the round winner and start the next round.
    ///
    /// Ignored while the round is still open. If it is the computer's turn
    /// it lays its first card straight away.
    pub fn next(&mut self) -> Vec<GameEvent> {
        let Some(winner) = self.winner else {
            debug!("next ignored, no winner yet");
            return Vec::new();
        };

        let outcome = self.deck.reweave(self.played_count(), winner);
        debug!(%winner, woven = outcome.woven, appended = outcome.appended, "spoils collected");

        self.winner = None;
        self.round_ended = false;
        self.cursor = None;

        let mut events = vec![GameEvent::SpoilsCollected {
            winner,
            woven: outcome.woven,
            appended: outcome.appended,
        }];

        if self.turn == Player::Computer {
            events.extend(self.play(true));
        }
        events
    }

    // ==================== Helper Methods ====================

    fn played_count(&self) -> usize {
        self.cursor.map_or(0, |i| i + 1)
    }

    fn declare_winner(&mut self, winner: Player, reason: WinReason, events: &mut Vec<GameEvent>) {
        debug!(%winner, ?reason, "round won");
        self.winner = Some(winner);
        events.push(GameEvent::RoundWon { winner, reason });

        if self.config.auto_continue {
            self.scheduler
                .schedule_after(self.config.play_delay(), ScheduledCall::NextRound);
        }
    }

    fn schedule_computer(&mut self, delay: Duration, events: &mut Vec<GameEvent>) {
        self.scheduler
            .schedule_after(delay, ScheduledCall::ComputerPlay);
        events.push(GameEvent::ComputerScheduled {
            delay_ms: delay.as_millis() as u64,
        });
    }
}
