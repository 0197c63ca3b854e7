use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::equity_engine::{
    codec::{decode, dense_index, encode_all},
    combinations::IndexCursor,
    error::{EngineError, Result},
    lookup::{
        LookupTable, MAX_FLUSH, MAX_FOUR_OF_A_KIND, MAX_FULL_HOUSE, MAX_HIGH_CARD, MAX_PAIR,
        MAX_STRAIGHT, MAX_STRAIGHT_FLUSH, MAX_THREE_OF_A_KIND, MAX_TWO_PAIR,
    },
    models::Card,
};

/// Strength of the best five-card hand. Lower is stronger; equal scores tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandScore(pub u16);

impl HandScore {
    pub fn value(self) -> u16 {
        self.0
    }

    pub fn category(self) -> HandCategory {
        HandCategory::from_score(self.0)
    }

    /// True if this hand wins outright against `other`.
    pub fn beats(self, other: HandScore) -> bool {
        self.0 < other.0
    }
}

/// The nine poker hand categories, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandCategory {
    StraightFlush,
    FourOfAKind,
    FullHouse,
    Flush,
    Straight,
    ThreeOfAKind,
    TwoPair,
    Pair,
    HighCard,
}

impl HandCategory {
    pub const ALL: [HandCategory; 9] = [
        HandCategory::StraightFlush,
        HandCategory::FourOfAKind,
        HandCategory::FullHouse,
        HandCategory::Flush,
        HandCategory::Straight,
        HandCategory::ThreeOfAKind,
        HandCategory::TwoPair,
        HandCategory::Pair,
        HandCategory::HighCard,
    ];

    pub fn from_score(score: u16) -> HandCategory {
        match score {
            s if s <= MAX_STRAIGHT_FLUSH  => HandCategory::StraightFlush,
            s if s <= MAX_FOUR_OF_A_KIND  => HandCategory::FourOfAKind,
            s if s <= MAX_FULL_HOUSE      => HandCategory::FullHouse,
            s if s <= MAX_FLUSH           => HandCategory::Flush,
            s if s <= MAX_STRAIGHT        => HandCategory::Straight,
            s if s <= MAX_THREE_OF_A_KIND => HandCategory::ThreeOfAKind,
            s if s <= MAX_TWO_PAIR        => HandCategory::TwoPair,
            s if s <= MAX_PAIR            => HandCategory::Pair,
            _ => HandCategory::HighCard,
        }
    }

    /// Inclusive block of scores belonging to this category.
    pub fn score_range(self) -> RangeInclusive<u16> {
        match self {
            HandCategory::StraightFlush => 1..=MAX_STRAIGHT_FLUSH,
            HandCategory::FourOfAKind   => MAX_STRAIGHT_FLUSH + 1..=MAX_FOUR_OF_A_KIND,
            HandCategory::FullHouse     => MAX_FOUR_OF_A_KIND + 1..=MAX_FULL_HOUSE,
            HandCategory::Flush         => MAX_FULL_HOUSE + 1..=MAX_FLUSH,
            HandCategory::Straight      => MAX_FLUSH + 1..=MAX_STRAIGHT,
            HandCategory::ThreeOfAKind  => MAX_STRAIGHT + 1..=MAX_THREE_OF_A_KIND,
            HandCategory::TwoPair       => MAX_THREE_OF_A_KIND + 1..=MAX_TWO_PAIR,
            HandCategory::Pair          => MAX_TWO_PAIR + 1..=MAX_PAIR,
            HandCategory::HighCard      => MAX_PAIR + 1..=MAX_HIGH_CARD,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::FourOfAKind   => "Four of a Kind",
            HandCategory::FullHouse     => "Full House",
            HandCategory::Flush         => "Flush",
            HandCategory::Straight      => "Straight",
            HandCategory::ThreeOfAKind  => "Three of a Kind",
            HandCategory::TwoPair       => "Two Pair",
            HandCategory::Pair          => "Pair",
            HandCategory::HighCard      => "High Card",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[inline]
fn score_five(table: &LookupTable, h: &[u32; 5]) -> u16 {
    let rank_bits = ((h[0] | h[1] | h[2] | h[3] | h[4]) >> 16) as usize;
    if h[0] & h[1] & h[2] & h[3] & h[4] & 0xF000 != 0 {
        return table.flush(rank_bits);
    }
    match table.unique5(rank_bits) {
        0 => {
            let product = h.iter().fold(1u32, |acc, c| acc * (c & 0xFF));
            debug_assert!(table.paired(product).is_some(), "unscorable hand {h:x?}");
            table.paired(product).unwrap_or(u16::MAX)
        }
        score => score,
    }
}

/// The five cards left after removing positions `a` and `b` (pass the same
/// index twice to remove one card from a six-card hand).
#[inline]
fn five_without(cards: &[u32], a: usize, b: usize) -> [u32; 5] {
    let mut hand = [0u32; 5];
    let mut k = 0;
    for (idx, &c) in cards.iter().enumerate() {
        if idx != a && idx != b {
            hand[k] = c;
            k += 1;
        }
    }
    hand
}

/// Best score over every five-card subset, for already validated cards.
///
/// Equity loops call this directly after validating their inputs once.
pub(crate) fn score_unchecked(cards: &[u32]) -> u16 {
    let table = LookupTable::get();
    match cards.len() {
        5 => score_five(table, &[cards[0], cards[1], cards[2], cards[3], cards[4]]),
        6 => (0..6)
            .map(|i| score_five(table, &five_without(cards, i, i)))
            .min()
            .unwrap_or(u16::MAX),
        7 => (0..7)
            .flat_map(|i| ((i + 1)..7).map(move |j| (i, j)))
            .map(|(i, j)| score_five(table, &five_without(cards, i, j)))
            .min()
            .unwrap_or(u16::MAX),
        n => {
            let mut best = u16::MAX;
            if let Ok(mut cursor) = IndexCursor::new(n, 5) {
                while let Some(idx) = cursor.advance() {
                    let hand = [cards[idx[0]], cards[idx[1]], cards[idx[2]], cards[idx[3]], cards[idx[4]]];
                    best = best.min(score_five(table, &hand));
                }
            }
            best
        }
    }
}

/// Reject malformed encodings and repeated cards. Returns the 52-bit mask of
/// the cards seen.
pub(crate) fn validate(cards: &[u32]) -> Result<u64> {
    let mut seen = 0u64;
    for &c in cards {
        let card = decode(c)?;
        let bit = 1u64 << dense_index(c);
        if seen & bit != 0 {
            return Err(EngineError::DuplicateCard(card.to_string()));
        }
        seen |= bit;
    }
    Ok(seen)
}

/// Score the best five-card hand from `cards` (board and hole cards
/// together). Needs at least five distinct, validly encoded cards.
pub fn evaluate(cards: &[u32]) -> Result<HandScore> {
    if cards.len() < 5 {
        return Err(EngineError::InsufficientCards(cards.len()));
    }
    validate(cards)?;
    Ok(HandScore(score_unchecked(cards)))
}

/// [`evaluate`] over a board and a player's hole cards.
pub fn evaluate_hand(board: &[Card], hole: &[Card]) -> Result<HandScore> {
    let mut cards = encode_all(board)?;
    cards.extend(encode_all(hole)?);
    evaluate(&cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equity_engine::codec::{card_to_int, ALL_CARDS};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn ints(tokens: &[&str]) -> Vec<u32> {
        tokens.iter().map(|t| card_to_int(t).unwrap()).collect()
    }

    fn score(tokens: &[&str]) -> u16 {
        evaluate(&ints(tokens)).unwrap().value()
    }

    /// Straightforward classifier used to cross-check the table scores.
    fn naive_category(hand: &[u32]) -> HandCategory {
        let mut counts = [0u8; 13];
        let mut bits = 0u32;
        for &c in hand {
            counts[((c >> 8) & 0xF) as usize] += 1;
            bits |= c >> 16;
        }
        let flush = hand.iter().fold(0xF000, |acc, c| acc & c) != 0;
        let straight = crate::equity_engine::lookup::STRAIGHTS.contains(&(bits as u16));
        let mut shape: Vec<u8> = counts.iter().copied().filter(|&n| n > 0).collect();
        shape.sort_unstable_by(|a, b| b.cmp(a));
        match (flush, straight, shape.as_slice()) {
            (true, true, _) => HandCategory::StraightFlush,
            (_, _, [4, ..]) => HandCategory::FourOfAKind,
            (_, _, [3, 2]) => HandCategory::FullHouse,
            (true, false, _) => HandCategory::Flush,
            (false, true, _) => HandCategory::Straight,
            (_, _, [3, ..]) => HandCategory::ThreeOfAKind,
            (_, _, [2, 2, ..]) => HandCategory::TwoPair,
            (_, _, [2, ..]) => HandCategory::Pair,
            _ => HandCategory::HighCard,
        }
    }

    #[test]
    fn extreme_hands_have_extreme_scores() {
        assert_eq!(score(&["As", "Ks", "Qs", "Js", "Ts"]), 1);
        assert_eq!(score(&["5d", "4d", "3d", "2d", "Ad"]), MAX_STRAIGHT_FLUSH);
        assert_eq!(score(&["Ac", "Ad", "Ah", "As", "Kd"]), MAX_STRAIGHT_FLUSH + 1);
        assert_eq!(score(&["7c", "5d", "4h", "3s", "2d"]), MAX_HIGH_CARD);
    }

    #[test]
    fn wheel_is_the_lowest_straight() {
        let wheel = score(&["5d", "4c", "3h", "2s", "Ad"]);
        let six_high = score(&["6d", "5c", "4h", "3s", "2d"]);
        assert_eq!(wheel, MAX_STRAIGHT);
        assert!(six_high < wheel);
    }

    #[test]
    fn kickers_break_ties_within_a_category() {
        let ak = score(&["As", "Ad", "Kh", "7c", "3d"]);
        let aq = score(&["Ac", "Ah", "Qh", "7d", "3s"]);
        assert!(ak < aq);
        assert_eq!(
            score(&["As", "Ad", "Kh", "7c", "3d"]),
            score(&["Ah", "Ac", "Ks", "7d", "3c"]),
            "suits must not matter without a flush"
        );
    }

    #[test]
    fn random_hands_match_naive_classifier() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = ALL_CARDS.to_vec();
        for _ in 0..20_000 {
            deck.shuffle(&mut rng);
            let hand = &deck[..5];
            let s = evaluate(hand).unwrap();
            assert_eq!(s.category(), naive_category(hand), "hand {hand:x?} scored {}", s.value());
            assert!(s.category().score_range().contains(&s.value()));
        }
    }

    #[test]
    fn higher_categories_always_score_better() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut deck = ALL_CARDS.to_vec();
        let mut samples: Vec<HandScore> = Vec::new();
        for _ in 0..5_000 {
            deck.shuffle(&mut rng);
            samples.push(evaluate(&deck[..7]).unwrap());
        }
        for a in &samples {
            for b in samples.iter().take(200) {
                if a.category() < b.category() {
                    assert!(a.beats(*b), "{a:?} ({}) should beat {b:?} ({})", a.category(), b.category());
                }
            }
        }
    }

    #[test]
    fn category_ranges_partition_all_scores() {
        let mut total = 0usize;
        for (i, cat) in HandCategory::ALL.iter().enumerate() {
            let range = cat.score_range();
            total += range.clone().count();
            assert_eq!(HandCategory::from_score(*range.start()), *cat);
            assert_eq!(HandCategory::from_score(*range.end()), *cat);
            if let Some(next) = HandCategory::ALL.get(i + 1) {
                assert_eq!(*range.end() + 1, *next.score_range().start());
            }
        }
        assert_eq!(total, MAX_HIGH_CARD as usize);
    }

    #[test]
    fn seven_cards_pick_the_best_five() {
        // Board pairs the hole card and also completes a flush: flush wins.
        let s = evaluate(&ints(&["Ah", "9h", "4h", "2c", "2d", "Kh", "2h"])).unwrap();
        assert_eq!(s.category(), HandCategory::Flush);
        let s = evaluate(&ints(&["Ah", "9h", "4s", "2c", "2d", "Ks", "2h"])).unwrap();
        assert_eq!(s.category(), HandCategory::ThreeOfAKind);
    }

    #[test]
    fn too_few_cards_fail_fast() {
        assert_eq!(
            evaluate(&ints(&["As", "Ks", "Qs", "Js"])),
            Err(EngineError::InsufficientCards(4))
        );
        assert_eq!(evaluate(&[]), Err(EngineError::InsufficientCards(0)));
    }

    #[test]
    fn duplicate_and_invalid_cards_are_rejected() {
        assert_eq!(
            evaluate(&ints(&["As", "Ks", "Qs", "Js", "As"])),
            Err(EngineError::DuplicateCard("As".into()))
        );
        let mut cards = ints(&["As", "Ks", "Qs", "Js"]);
        cards.push(12345);
        assert!(matches!(evaluate(&cards), Err(EngineError::InvalidCard(_))));
    }

    #[test]
    fn evaluate_hand_combines_board_and_hole_cards() {
        let board: Vec<Card> = ["Ac", "2h", "3s"].iter().map(|t| t.parse().unwrap()).collect();
        let hole: Vec<Card> = ["As", "Ah"].iter().map(|t| t.parse().unwrap()).collect();
        let s = evaluate_hand(&board, &hole).unwrap();
        assert_eq!(s.category(), HandCategory::ThreeOfAKind);
    }
}
