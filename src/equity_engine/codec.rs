//! Card Codec: `"Ah"` <-> packed 32-bit integer.
//!
//! Each card packs four fields used by the evaluator:
//!
//! ```text
//! xxxbbbbb bbbbbbbb shdc rrrr xxpppppp
//! b = one bit per rank (deuce = bit 16 .. ace = bit 28)
//! s/h/d/c = one bit per suit (spades = bit 12 .. clubs = bit 15)
//! r = rank index 0..=12
//! p = prime for the rank (deuce = 2 .. ace = 41)
//! ```
//!
//! ANDing the suit nibbles of five cards detects a flush, ORing the rank bits
//! yields the rank pattern, and multiplying the primes gives a signature that
//! is unique per rank multiset.

use crate::equity_engine::{
    error::{EngineError, Result},
    models::{Card, Rank, Suit},
};

pub const PRIMES: [u32; 13] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

/// Suit order inside the suit nibble: spades, hearts, diamonds, clubs.
const SUIT_ORDER: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

const fn pack(rank_index: usize, suit_index: usize) -> u32 {
    let r = rank_index as u32;
    (1u32 << (r + 16)) | ((1u32 << suit_index as u32) << 12) | (r << 8) | PRIMES[rank_index]
}

const fn build_all_cards() -> [u32; 52] {
    let mut out = [0u32; 52];
    let mut r = 0;
    while r < 13 {
        let mut s = 0;
        while s < 4 {
            out[r * 4 + s] = pack(r, s);
            s += 1;
        }
        r += 1;
    }
    out
}

/// All 52 encoded cards, deuces first, suits ordered s, h, d, c.
pub const ALL_CARDS: [u32; 52] = build_all_cards();

fn suit_index(suit: Suit) -> usize {
    match suit {
        Suit::Spades   => 0,
        Suit::Hearts   => 1,
        Suit::Diamonds => 2,
        Suit::Clubs    => 3,
    }
}

/// Encode a card. Total over valid cards.
pub fn encode(card: Card) -> Result<u32> {
    if !card.rank.is_valid() {
        return Err(EngineError::InvalidCard(card.to_string()));
    }
    Ok(pack(card.rank.index(), suit_index(card.suit)))
}

/// Decode a packed integer, rejecting anything outside the 52 encodings.
pub fn decode(value: u32) -> Result<Card> {
    let invalid = || EngineError::InvalidCard(format!("{value:#x}"));
    let rank_index = ((value >> 8) & 0xF) as usize;
    if rank_index > 12 {
        return Err(invalid());
    }
    let suit = match (value >> 12) & 0xF {
        0x1 => SUIT_ORDER[0],
        0x2 => SUIT_ORDER[1],
        0x4 => SUIT_ORDER[2],
        0x8 => SUIT_ORDER[3],
        _ => return Err(invalid()),
    };
    let card = Card::new(Rank(rank_index as u8 + 2), suit);
    if pack(rank_index, suit_index(suit)) != value {
        return Err(invalid());
    }
    Ok(card)
}

/// Dense position `0..52` of a valid encoding, matching [`ALL_CARDS`] order.
#[inline]
pub fn dense_index(value: u32) -> usize {
    (((value >> 8) & 0xF) * 4 + ((value >> 12) & 0xF).trailing_zeros()) as usize
}

pub fn card_to_int(token: &str) -> Result<u32> {
    encode(token.parse()?)
}

pub fn int_to_card(value: u32) -> Result<String> {
    decode(value).map(|c| c.to_string())
}

pub fn parse_cards(tokens: &[&str]) -> Result<Vec<Card>> {
    tokens.iter().map(|t| t.parse()).collect()
}

pub fn encode_all(cards: &[Card]) -> Result<Vec<u32>> {
    cards.iter().map(|&c| encode(c)).collect()
}
