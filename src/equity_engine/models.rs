use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::equity_engine::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Card primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(self) -> char {
        match self {
            Suit::Clubs    => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts   => 'h',
            Suit::Spades   => 's',
        }
    }

    pub fn from_symbol(c: char) -> Option<Suit> {
        match c {
            'c' => Some(Suit::Clubs),
            'd' => Some(Suit::Diamonds),
            'h' => Some(Suit::Hearts),
            's' => Some(Suit::Spades),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Rank 2..=14 where 14 = Ace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct Rank(pub u8);

impl Rank {
    pub const TWO: Rank = Rank(2);
    pub const ACE: Rank = Rank(14);

    /// All thirteen ranks, highest first.
    pub fn descending() -> impl Iterator<Item = Rank> {
        (2u8..=14).rev().map(Rank)
    }

    pub fn symbol(self) -> char {
        match self.0 {
            2 => '2', 3 => '3', 4 => '4', 5 => '5', 6 => '6',
            7 => '7', 8 => '8', 9 => '9', 10 => 'T',
            11 => 'J', 12 => 'Q', 13 => 'K', 14 => 'A',
            _ => '?',
        }
    }

    /// Parses an uppercase rank character. Lowercase letters are accepted for
    /// T, J, Q, K and A so descriptors like "aks" still read naturally.
    pub fn from_symbol(c: char) -> Option<Rank> {
        let r = match c.to_ascii_uppercase() {
            '2' => 2, '3' => 3, '4' => 4, '5' => 5, '6' => 6,
            '7' => 7, '8' => 8, '9' => 9, 'T' => 10,
            'J' => 11, 'Q' => 12, 'K' => 13, 'A' => 14,
            _ => return None,
        };
        Some(Rank(r))
    }

    /// Zero-based index used by the integer encoding (deuce = 0, ace = 12).
    pub fn index(self) -> usize {
        (self.0 - 2) as usize
    }

    pub fn is_valid(self) -> bool {
        (2..=14).contains(&self.0)
    }
}

impl TryFrom<u8> for Rank {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self> {
        let rank = Rank(value);
        if !rank.is_valid() {
            return Err(EngineError::InvalidCard(format!("rank {value}")));
        }
        Ok(rank)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One of the 52 physical cards. Ordered by rank, then suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = EngineError;

    /// Exactly two characters: rank from `23456789TJQKA`, suit from `hdcs`.
    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let (r, su) = match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(su), None) => (r, su),
            _ => return Err(EngineError::InvalidCard(s.to_string())),
        };
        // The token format is strict; only the canonical uppercase ranks count.
        if r.is_ascii_lowercase() {
            return Err(EngineError::InvalidCard(s.to_string()));
        }
        let rank = Rank::from_symbol(r).ok_or_else(|| EngineError::InvalidCard(s.to_string()))?;
        let suit = Suit::from_symbol(su).ok_or_else(|| EngineError::InvalidCard(s.to_string()))?;
        Ok(Card { rank, suit })
    }
}

/// A player's two hole cards. The higher card is always stored first, so two
/// combos holding the same cards compare equal regardless of input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "[Card; 2]")]
pub struct Combo([Card; 2]);

impl Combo {
    pub fn new(a: Card, b: Card) -> Result<Self> {
        if a == b {
            return Err(EngineError::DuplicateCard(a.to_string()));
        }
        Ok(if a > b { Combo([a, b]) } else { Combo([b, a]) })
    }

    /// Parse two card tokens, e.g. `Combo::parse("As", "Kd")`.
    pub fn parse(a: &str, b: &str) -> Result<Self> {
        Combo::new(a.parse()?, b.parse()?)
    }

    pub fn cards(&self) -> [Card; 2] {
        self.0
    }

    pub fn high(&self) -> Card {
        self.0[0]
    }

    pub fn low(&self) -> Card {
        self.0[1]
    }

    pub fn contains(&self, card: Card) -> bool {
        self.0[0] == card || self.0[1] == card
    }

    pub fn collides_with(&self, cards: &[Card]) -> bool {
        cards.iter().any(|&c| self.contains(c))
    }

    pub fn is_pair(&self) -> bool {
        self.0[0].rank == self.0[1].rank
    }

    pub fn is_suited(&self) -> bool {
        self.0[0].suit == self.0[1].suit
    }
}

impl TryFrom<[Card; 2]> for Combo {
    type Error = EngineError;

    fn try_from([a, b]: [Card; 2]) -> Result<Self> {
        Combo::new(a, b)
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0], self.0[1])
    }
}

impl FromStr for Combo {
    type Err = EngineError;

    /// Four characters, two card tokens back to back (e.g. "AsKd").
    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 4 || !s.is_ascii() {
            return Err(EngineError::InvalidCard(s.to_string()));
        }
        Combo::parse(&s[..2], &s[2..])
    }
}

// ---------------------------------------------------------------------------
// Equity results
// ---------------------------------------------------------------------------

/// Win / draw fractions for one contender, with `equity = win + draw / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equity {
    pub win: f64,
    pub draw: f64,
    pub equity: f64,
}

impl Equity {
    /// Build from raw counters. `total` must be non-zero.
    pub fn from_counts(wins: u64, ties: u64, total: u64) -> Self {
        let n = total as f64;
        Equity {
            win: wins as f64 / n,
            draw: ties as f64 / n,
            equity: (wins as f64 + ties as f64 * 0.5) / n,
        }
    }

    /// Fraction of outcomes the contender loses outright.
    pub fn lose(&self) -> f64 {
        (1.0 - self.win - self.draw).max(0.0)
    }
}

/// Which way a hand-vs-range request was actually computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationMode {
    Exact,
    Approximate,
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationMode::Exact       => write!(f, "exact"),
            CalculationMode::Approximate => write!(f, "approximate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeAction {
    Raise,
    Call,
    Fold,
}

impl RangeAction {
    pub const ALL: [RangeAction; 3] = [RangeAction::Raise, RangeAction::Call, RangeAction::Fold];
}

impl fmt::Display for RangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeAction::Raise => write!(f, "raise"),
            RangeAction::Call  => write!(f, "call"),
            RangeAction::Fold  => write!(f, "fold"),
        }
    }
}

/// Descriptor tokens grouped by the action taken with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PokerRange {
    pub raise: Vec<String>,
    pub call: Vec<String>,
    pub fold: Vec<String>,
}

impl PokerRange {
    pub fn bucket(&self, action: RangeAction) -> &[String] {
        match action {
            RangeAction::Raise => &self.raise,
            RangeAction::Call  => &self.call,
            RangeAction::Fold  => &self.fold,
        }
    }

    pub fn hand_count(&self) -> usize {
        self.raise.len() + self.call.len() + self.fold.len()
    }
}

/// Combo and descriptor counts for a [`PokerRange`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeStats {
    pub total_combos: usize,
    pub total_hands: usize,
    pub combos_by_action: BTreeMap<RangeAction, usize>,
    pub hands_by_action: BTreeMap<RangeAction, usize>,
}

/// Problems found by `PokerRange::validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RangeValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Combos of the selected buckets, from `PokerRange::breakdown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeBreakdown {
    /// Sum of the per-action counts; a combo listed under two actions counts twice.
    pub total_combos: usize,
    pub by_action: BTreeMap<RangeAction, BTreeSet<Combo>>,
    pub included_actions: Vec<RangeAction>,
    pub excluded_actions: Vec<RangeAction>,
}

// ---------------------------------------------------------------------------
// Multi-way showdown results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandEvaluation {
    pub hand_index: usize,
    pub score: u16,
    pub hand_rank: String,
    pub hand_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoWinsResult {
    /// Every contender sharing the best score, in input order.
    pub winning_indices: Vec<usize>,
    pub is_tie: bool,
    pub evaluations: Vec<HandEvaluation>,
    pub winning_hand_rank: String,
    pub winning_hand_description: String,
}

/// Hand-vs-range equity together with how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedEquity {
    pub equity: Equity,
    pub mode: CalculationMode,
    /// Opposing combos left after removing conflicts with known cards.
    pub combos_considered: usize,
    pub range_stats: RangeStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_tokens_parse_and_display() {
        let card: Card = "Td".parse().unwrap();
        assert_eq!(card, Card::new(Rank(10), Suit::Diamonds));
        assert_eq!(card.to_string(), "Td");
    }

    #[test]
    fn malformed_card_tokens_are_rejected() {
        for bad in ["", "A", "Ahh", "1h", "Ax", "ah", "AH", "10h"] {
            assert!(
                matches!(bad.parse::<Card>(), Err(EngineError::InvalidCard(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn combo_order_is_normalised() {
        let a = Combo::parse("Kd", "As").unwrap();
        let b = Combo::parse("As", "Kd").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.high().to_string(), "As");
        assert_eq!("KdAs".parse::<Combo>().unwrap(), a);
    }

    #[test]
    fn combo_rejects_identical_cards() {
        assert_eq!(
            Combo::parse("7h", "7h"),
            Err(EngineError::DuplicateCard("7h".into()))
        );
    }

    #[test]
    fn deserialised_combo_keeps_distinct_cards() {
        let king = r#"{"rank":13,"suit":"Spades"}"#;
        let pair = format!("[{king},{king}]");
        let err = serde_json::from_str::<Combo>(&pair).unwrap_err();
        assert!(err.to_string().contains("Ks"), "{err}");

        let json = serde_json::to_string(&Combo::parse("Kd", "As").unwrap()).unwrap();
        let combo: Combo = serde_json::from_str(&json).unwrap();
        assert_eq!(combo.to_string(), "AsKd");

        // Reversed input order still comes back normalised.
        let reversed = r#"[{"rank":13,"suit":"Diamonds"},{"rank":14,"suit":"Spades"}]"#;
        assert_eq!(serde_json::from_str::<Combo>(reversed).unwrap(), combo);
    }

    #[test]
    fn out_of_range_rank_does_not_deserialise() {
        assert!(serde_json::from_str::<Rank>("1").is_err());
        assert!(serde_json::from_str::<Rank>("15").is_err());
        assert_eq!(serde_json::from_str::<Rank>("10").unwrap(), Rank(10));
        assert!(serde_json::from_str::<Card>(r#"{"rank":0,"suit":"Hearts"}"#).is_err());
    }

    #[test]
    fn equity_from_counts_counts_ties_as_half() {
        let eq = Equity::from_counts(6, 2, 10);
        assert!((eq.win - 0.6).abs() < 1e-12);
        assert!((eq.draw - 0.2).abs() < 1e-12);
        assert!((eq.equity - 0.7).abs() < 1e-12);
        assert!((eq.lose() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn who_wins_result_serialises_in_camel_case() {
        let result = WhoWinsResult {
            winning_indices: vec![0, 2],
            is_tie: true,
            evaluations: vec![],
            winning_hand_rank: "Flush".into(),
            winning_hand_description: "Flush".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["winningIndices"], serde_json::json!([0, 2]));
        assert_eq!(json["isTie"], serde_json::json!(true));
    }

    #[test]
    fn poker_range_deserialises_with_missing_buckets() {
        let range: PokerRange = serde_json::from_str(r#"{"raise":["AA","KK"]}"#).unwrap();
        assert_eq!(range.raise.len(), 2);
        assert!(range.call.is_empty() && range.fold.is_empty());
        assert_eq!(range.hand_count(), 2);
    }
}
