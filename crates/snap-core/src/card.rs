//! Cards, suits, values and the two players.
//!
//! This module contains:
//! - Suit and Value enums for the 52 canonical cards
//! - Player identity (human or simulated computer)
//! - Card struct with its current owner

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card suit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spade,
    Heart,
    Diamond,
    Club,
}

impl Suit {
    /// All suits in deck-building order
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];

    /// Lowercase name used by the presentation layer
    pub fn name(&self) -> &'static str {
        match self {
            Suit::Spade => "spade",
            Suit::Heart => "heart",
            Suit::Diamond => "diamond",
            Suit::Club => "club",
        }
    }
}

/// Card value. Ranks run 1 through 10 then J, Q, K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Value {
    /// All values in ascending rank order
    pub const ALL: [Value; 13] = [
        Value::One,
        Value::Two,
        Value::Three,
        Value::Four,
        Value::Five,
        Value::Six,
        Value::Seven,
        Value::Eight,
        Value::Nine,
        Value::Ten,
        Value::Jack,
        Value::Queen,
        Value::King,
    ];

    /// Numeric rank (1-13)
    pub fn rank(&self) -> u8 {
        *self as u8 + 1
    }

    /// Value for a numeric rank, if it is in 1..=13
    pub fn from_rank(rank: u8) -> Option<Value> {
        Value::ALL.get(rank.checked_sub(1)? as usize).copied()
    }

    /// Face label as shown on the table
    pub fn label(&self) -> &'static str {
        match self {
            Value::One => "1",
            Value::Two => "2",
            Value::Three => "3",
            Value::Four => "4",
            Value::Five => "5",
            Value::Six => "6",
            Value::Seven => "7",
            Value::Eight => "8",
            Value::Nine => "9",
            Value::Ten => "10",
            Value::Jack => "J",
            Value::Queen => "Q",
            Value::King => "K",
        }
    }
}

/// One of the two sides at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Human,
    Computer,
}

impl Player {
    /// The other side
    pub fn opponent(&self) -> Player {
        match self {
            Player::Human => Player::Computer,
            Player::Computer => Player::Human,
        }
    }

    /// Map the `is_computer` flag used by the play surfaces
    pub fn from_is_computer(is_computer: bool) -> Player {
        if is_computer {
            Player::Computer
        } else {
            Player::Human
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Human => write!(f, "human"),
            Player::Computer => write!(f, "computer"),
        }
    }
}

/// A single card.
///
/// Suit and value never change. `owner` is `None` once the card has been
/// laid on the table (the played zone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub value: Value,
    pub owner: Option<Player>,
}

impl Card {
    /// Create an unowned card
    pub fn new(suit: Suit, value: Value) -> Self {
        Self {
            suit,
            value,
            owner: None,
        }
    }

    /// Create a card held by a player
    pub fn owned(suit: Suit, value: Value, owner: Player) -> Self {
        Self {
            suit,
            value,
            owner: Some(owner),
        }
    }

    /// Same rank, regardless of suit
    pub fn matches(&self, other: &Card) -> bool {
        self.value == other.value
    }

    /// Identity of the card ignoring ownership
    pub fn face(&self) -> (Suit, Value) {
        (self.suit, self.value)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}s", self.value.label(), self.suit.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_ranks() {
        assert_eq!(Value::One.rank(), 1);
        assert_eq!(Value::Ten.rank(), 10);
        assert_eq!(Value::King.rank(), 13);
        assert_eq!(Value::from_rank(11), Some(Value::Jack));
        assert_eq!(Value::from_rank(0), None);
        assert_eq!(Value::from_rank(14), None);
    }

    #[test]
    fn test_face_labels() {
        assert_eq!(Value::Seven.label(), "7");
        assert_eq!(Value::Queen.label(), "Q");
        let card = Card::new(Suit::Heart, Value::King);
        assert_eq!(card.to_string(), "K of hearts");
    }

    #[test]
    fn test_matches_ignores_suit() {
        let a = Card::owned(Suit::Spade, Value::Five, Player::Human);
        let b = Card::new(Suit::Club, Value::Five);
        let c = Card::new(Suit::Spade, Value::Six);
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_opponent() {
        assert_eq!(Player::Human.opponent(), Player::Computer);
        assert_eq!(Player::Computer.opponent(), Player::Human);
        assert_eq!(Player::from_is_computer(true), Player::Computer);
    }

    #[test]
    fn test_card_json_shape() {
        let card = Card::owned(Suit::Diamond, Value::Jack, Player::Computer);
        let json = serde_json::to_value(card).unwrap();
        assert_eq!(json["suit"], "diamond");
        assert_eq!(json["value"], "J");
        assert_eq!(json["owner"], "computer");
    }
}
