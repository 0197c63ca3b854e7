use rand::Rng;

use crate::equity_engine::codec::ALL_CARDS;

/// The encoded cards still unseen once known cards are removed.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<u32>,
}

impl Deck {
    /// Every card whose dense index is not set in `used` (see
    /// [`dense_index`](crate::equity_engine::codec::dense_index)), in table order.
    pub fn without(used: u64) -> Self {
        let cards = ALL_CARDS
            .iter()
            .enumerate()
            .filter(|(i, _)| used & (1u64 << i) == 0)
            .map(|(_, &c)| c)
            .collect();
        Deck { cards }
    }

    pub fn cards(&self) -> &[u32] {
        &self.cards
    }

    /// Remaining cards available.
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Draw `k` distinct cards uniformly at random.
    ///
    /// Runs the first `k` steps of a Fisher-Yates shuffle and returns the
    /// shuffled prefix; the rest of the deck is left in arbitrary order.
    pub fn draw<R: Rng>(&mut self, rng: &mut R, k: usize) -> &[u32] {
        assert!(k <= self.cards.len(), "Deck exhausted");
        for i in 0..k {
            let j = rng.gen_range(i..self.cards.len());
            self.cards.swap(i, j);
        }
        &self.cards[..k]
    }
}
