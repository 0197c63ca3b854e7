//! One-time lookup tables behind the hand evaluator, and the score boundary
//! of every hand category.
//!
//! Scores run from 1 (royal flush) to 7462 (7-5-4-3-2 offsuit), one score
//! per distinct 5-card hand strength. Each category occupies a contiguous
//! block whose size is the number of distinct hands in it, so the
//! boundaries below are sums of category sizes rather than tuned constants.

use std::sync::OnceLock;

use crate::equity_engine::{codec::PRIMES, combinations::combinations};

const fn choose(n: u16, k: u16) -> u16 {
    let mut acc = 1u32;
    let mut i = 0;
    while i < k {
        acc = acc * (n - i) as u32 / (i + 1) as u32;
        i += 1;
    }
    acc as u16
}

/// Five-bit rank patterns of the ten straights, best first. Bit 0 is the deuce.
pub const STRAIGHTS: [u16; 10] = [
    0b1_1111_0000_0000, // A K Q J T
    0b0_1111_1000_0000,
    0b0_0111_1100_0000,
    0b0_0011_1110_0000,
    0b0_0001_1111_0000,
    0b0_0000_1111_1000,
    0b0_0000_0111_1100,
    0b0_0000_0011_1110,
    0b0_0000_0001_1111, // 6 5 4 3 2
    0b1_0000_0000_1111, // 5 4 3 2 A
];

const STRAIGHT_FLUSH_HANDS: u16 = STRAIGHTS.len() as u16;
const FOUR_OF_A_KIND_HANDS: u16 = 13 * 12;
const FULL_HOUSE_HANDS: u16 = 13 * 12;
const FLUSH_HANDS: u16 = choose(13, 5) - STRAIGHTS.len() as u16;
const STRAIGHT_HANDS: u16 = STRAIGHTS.len() as u16;
const THREE_OF_A_KIND_HANDS: u16 = 13 * choose(12, 2);
const TWO_PAIR_HANDS: u16 = choose(13, 2) * 11;
const PAIR_HANDS: u16 = 13 * choose(12, 3);
const HIGH_CARD_HANDS: u16 = choose(13, 5) - STRAIGHTS.len() as u16;

pub const MAX_STRAIGHT_FLUSH: u16 = STRAIGHT_FLUSH_HANDS;
pub const MAX_FOUR_OF_A_KIND: u16 = MAX_STRAIGHT_FLUSH + FOUR_OF_A_KIND_HANDS;
pub const MAX_FULL_HOUSE: u16 = MAX_FOUR_OF_A_KIND + FULL_HOUSE_HANDS;
pub const MAX_FLUSH: u16 = MAX_FULL_HOUSE + FLUSH_HANDS;
pub const MAX_STRAIGHT: u16 = MAX_FLUSH + STRAIGHT_HANDS;
pub const MAX_THREE_OF_A_KIND: u16 = MAX_STRAIGHT + THREE_OF_A_KIND_HANDS;
pub const MAX_TWO_PAIR: u16 = MAX_THREE_OF_A_KIND + TWO_PAIR_HANDS;
pub const MAX_PAIR: u16 = MAX_TWO_PAIR + PAIR_HANDS;
pub const MAX_HIGH_CARD: u16 = MAX_PAIR + HIGH_CARD_HANDS;

/// Flush and rank-pattern tables indexed by the 13-bit OR of rank bits, plus
/// a sorted (prime product, score) list for hands holding a repeated rank.
pub struct LookupTable {
    flush: Vec<u16>,
    unique5: Vec<u16>,
    products: Vec<(u32, u16)>,
}

impl LookupTable {
    /// The process-wide table, built on first use.
    pub fn get() -> &'static LookupTable {
        static TABLE: OnceLock<LookupTable> = OnceLock::new();
        TABLE.get_or_init(LookupTable::build)
    }

    fn build() -> Self {
        let mut flush = vec![0u16; 1 << 13];
        let mut unique5 = vec![0u16; 1 << 13];

        for (i, &bits) in STRAIGHTS.iter().enumerate() {
            flush[bits as usize] = 1 + i as u16;
            unique5[bits as usize] = MAX_FLUSH + 1 + i as u16;
        }

        // Numeric order of five-bit patterns is high-card order.
        let mut high_cards: Vec<u16> = (0u16..1 << 13)
            .filter(|b| b.count_ones() == 5 && !STRAIGHTS.contains(b))
            .collect();
        high_cards.sort_unstable_by(|a, b| b.cmp(a));
        for (i, &bits) in high_cards.iter().enumerate() {
            flush[bits as usize] = MAX_FULL_HOUSE + 1 + i as u16;
            unique5[bits as usize] = MAX_PAIR + 1 + i as u16;
        }

        let products = Self::build_products();
        log::trace!(
            "built evaluator tables: {} rank patterns, {} paired signatures",
            high_cards.len() + STRAIGHTS.len(),
            products.len()
        );
        LookupTable { flush, unique5, products }
    }

    fn build_products() -> Vec<(u32, u16)> {
        let p = |r: usize| PRIMES[r];
        let desc: Vec<usize> = (0..13).rev().collect();
        let without = |skip: &[usize]| -> Vec<usize> {
            desc.iter().copied().filter(|r| !skip.contains(r)).collect()
        };
        let mut out = Vec::with_capacity(4888);

        let mut score = MAX_STRAIGHT_FLUSH + 1;
        for &quad in &desc {
            for kicker in without(&[quad]) {
                out.push((p(quad).pow(4) * p(kicker), score));
                score += 1;
            }
        }

        score = MAX_FOUR_OF_A_KIND + 1;
        for &trips in &desc {
            for pair in without(&[trips]) {
                out.push((p(trips).pow(3) * p(pair).pow(2), score));
                score += 1;
            }
        }

        score = MAX_STRAIGHT + 1;
        for &trips in &desc {
            let kickers = without(&[trips]);
            for ks in combinations(&kickers, 2).into_iter().flatten() {
                out.push((p(trips).pow(3) * p(ks[0]) * p(ks[1]), score));
                score += 1;
            }
        }

        score = MAX_THREE_OF_A_KIND + 1;
        for pairs in combinations(&desc, 2).into_iter().flatten() {
            let (hi, lo) = (pairs[0], pairs[1]);
            for kicker in without(&[hi, lo]) {
                out.push((p(hi).pow(2) * p(lo).pow(2) * p(kicker), score));
                score += 1;
            }
        }

        score = MAX_TWO_PAIR + 1;
        for &pair in &desc {
            let kickers = without(&[pair]);
            for ks in combinations(&kickers, 3).into_iter().flatten() {
                out.push((p(pair).pow(2) * p(ks[0]) * p(ks[1]) * p(ks[2]), score));
                score += 1;
            }
        }

        out.sort_unstable_by_key(|&(product, _)| product);
        out
    }

    /// Score of a five-card flush with the given rank pattern.
    #[inline]
    pub fn flush(&self, rank_bits: usize) -> u16 {
        self.flush[rank_bits]
    }

    /// Score of five distinct unsuited ranks; zero if a rank repeats.
    #[inline]
    pub fn unique5(&self, rank_bits: usize) -> u16 {
        self.unique5[rank_bits]
    }

    /// Score of a hand with a repeated rank, keyed by its prime product.
    #[inline]
    pub fn paired(&self, product: u32) -> Option<u16> {
        self.products
            .binary_search_by_key(&product, |&(p, _)| p)
            .ok()
            .map(|i| self.products[i].1)
    }
}
