//! The 52-card deck and its reordering rules.
//!
//! The deck is a single ordered sequence shared by both players. The prefix
//! up to the cursor is the played zone (unowned cards), the rest is split
//! between the players by the `owner` of each card. Cards are never added or
//! removed: shuffling, dealing and re-weaving spoils only move them around.

use crate::card::{Card, Player, Suit, Value};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::ops::Index;
use thiserror::Error;

/// Number of cards in a standard deck
pub const DECK_SIZE: usize = 52;

/// Errors from building a deck out of arbitrary cards
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("Deck must hold {expected} cards, found {found}")]
    WrongSize { expected: usize, found: usize },

    #[error("Duplicate card in deck: {0}")]
    DuplicateCard(Card),

    #[error("Card is not held by either player: {0}")]
    UnownedCard(Card),
}

/// Result of folding the played zone back into the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaveOutcome {
    /// Spoils inserted between two adjacent cards of the loser
    pub woven: usize,
    /// Spoils left over and appended to the end
    pub appended: usize,
}

/// Ordered sequence of the 52 canonical cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build the standard deck, suit by suit, values ascending, nobody owning anything
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for value in Value::ALL {
                cards.push(Card::new(suit, value));
            }
        }
        Self { cards }
    }

    /// Take an arbitrary arrangement, checking it is a full deck
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, DeckError> {
        if cards.len() != DECK_SIZE {
            return Err(DeckError::WrongSize {
                expected: DECK_SIZE,
                found: cards.len(),
            });
        }

        let mut seen = HashSet::with_capacity(DECK_SIZE);
        for card in &cards {
            if !seen.insert(card.face()) {
                return Err(DeckError::DuplicateCard(*card));
            }
        }

        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    /// Whether every canonical card is present exactly once
    pub fn is_canonical(&self) -> bool {
        if self.cards.len() != DECK_SIZE {
            return false;
        }
        let faces: HashSet<(Suit, Value)> = self.cards.iter().map(Card::face).collect();
        faces.len() == DECK_SIZE
    }

    /// Uniform Fisher-Yates shuffle
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Hand out the whole deck by position parity.
    ///
    /// Card 0 goes to `first_mover`, card 1 to the opponent, and so on.
    pub fn deal_alternating(&mut self, first_mover: Player) {
        let offset = match first_mover {
            Player::Human => 0,
            Player::Computer => 1,
        };
        for (i, card) in self.cards.iter_mut().enumerate() {
            card.owner = Some(if (i + offset) % 2 == 1 {
                Player::Computer
            } else {
                Player::Human
            });
        }
    }

    /// Fold the first `played` cards back into the deck in favour of `winner`.
    ///
    /// The played prefix is cut out as spoils. Walking the rest from index 1,
    /// each time two neighbours belong to the same player and that player is
    /// not the winner, the next spoil is handed to the winner and inserted
    /// between them. Spoils left after the walk go to the bottom.
    pub fn reweave(&mut self, played: usize, winner: Player) -> WeaveOutcome {
        assert!(
            played <= self.cards.len(),
            "played zone of {} cards exceeds deck of {}",
            played,
            self.cards.len()
        );

        let mut spoils: VecDeque<Card> = self.cards.drain(..played).collect();
        let mut woven = 0;

        let mut i = 1;
        while i < self.cards.len() {
            let prev = self.cards[i - 1].owner;
            if self.cards[i].owner == prev && prev != Some(winner) {
                if let Some(mut spoil) = spoils.pop_front() {
                    spoil.owner = Some(winner);
                    self.cards.insert(i, spoil);
                    woven += 1;
                }
            }
            i += 1;
        }

        let appended = spoils.len();
        self.cards.extend(spoils.into_iter().map(|mut card| {
            card.owner = Some(winner);
            card
        }));

        WeaveOutcome { woven, appended }
    }

    /// Number of cards a player still holds
    pub fn held_by(&self, player: Player) -> usize {
        self.cards
            .iter()
            .filter(|c| c.owner == Some(player))
            .count()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}

impl Index<usize> for Deck {
    type Output = Card;

    fn index(&self, index: usize) -> &Card {
        &self.cards[index]
    }
}
