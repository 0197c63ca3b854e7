//! Exact and Monte Carlo equity for hand-vs-hand and hand-vs-range matchups.
//!
//! Exact mode walks every completion of the board. The completion space is
//! split by the first completion card and, for ranges, by opposing combo;
//! each part counts wins and ties on its own and the counts are summed at
//! the end, so results are identical however rayon schedules the work.
//!
//! Monte Carlo mode draws the opposing combo and the completion uniformly at
//! random. Simulations are split into fixed-size chunks, each seeded from a
//! master RNG, so a fixed seed reproduces the same result on any pool size.

use std::ops::Add;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::equity_engine::{
    cancel::Deadline,
    codec::{dense_index, encode, encode_all},
    combinations::IndexCursor,
    deck::Deck,
    error::{EngineError, Result},
    evaluator::{score_unchecked, validate},
    models::{Card, Combo, Equity},
};

/// Completions enumerated between deadline checks.
const CHECK_INTERVAL: usize = 4096;
/// Samples drawn between deadline checks.
const SAMPLE_CHECK_INTERVAL: usize = 1024;
/// Samples per independently seeded Monte Carlo chunk.
const CHUNK_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    wins: u64,
    ties: u64,
    total: u64,
}

impl Tally {
    #[inline]
    fn record(&mut self, hero: u16, villain: u16) {
        if hero < villain {
            self.wins += 1;
        } else if hero == villain {
            self.ties += 1;
        }
        self.total += 1;
    }

    fn into_equity(self) -> Equity {
        Equity::from_counts(self.wins, self.ties, self.total)
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally {
            wins: self.wins + other.wins,
            ties: self.ties + other.ties,
            total: self.total + other.total,
        }
    }
}

/// Hero cards, board and the mask of every card they use.
struct Known {
    hero: [u32; 2],
    board: Vec<u32>,
    used: u64,
}

impl Known {
    fn new(hero: &Combo, board: &[Card]) -> Result<Self> {
        if board.len() > 5 {
            return Err(EngineError::BoardTooLarge(board.len()));
        }
        let [a, b] = hero.cards();
        let hero = [encode(a)?, encode(b)?];
        let board = encode_all(board)?;
        let mut all = board.clone();
        all.extend_from_slice(&hero);
        let used = validate(&all)?;
        Ok(Known { hero, board, used })
    }

    fn missing(&self) -> usize {
        5 - self.board.len()
    }

    /// Seven-card hands (board, completion slots, hole cards) for both players.
    fn hands(&self, villain: [u32; 2]) -> ([u32; 7], [u32; 7]) {
        let mut hero = [0u32; 7];
        let mut opp = [0u32; 7];
        hero[..self.board.len()].copy_from_slice(&self.board);
        opp[..self.board.len()].copy_from_slice(&self.board);
        hero[5..].copy_from_slice(&self.hero);
        opp[5..].copy_from_slice(&villain);
        (hero, opp)
    }
}

#[derive(Debug, Clone, Copy)]
struct Opponent {
    cards: [u32; 2],
    mask: u64,
}

impl Opponent {
    fn new(combo: &Combo) -> Result<Self> {
        let [a, b] = combo.cards();
        if a == b {
            return Err(EngineError::DuplicateCard(a.to_string()));
        }
        let cards = [encode(a)?, encode(b)?];
        let mask = (1u64 << dense_index(cards[0])) | (1u64 << dense_index(cards[1]));
        Ok(Opponent { cards, mask })
    }
}

/// Opponent for a single known villain hand; any shared card is an error.
fn single_opponent(known: &Known, villain: &Combo) -> Result<Opponent> {
    let opp = Opponent::new(villain)?;
    for (card, value) in villain.cards().iter().zip(opp.cards) {
        if known.used & (1u64 << dense_index(value)) != 0 {
            return Err(EngineError::DuplicateCard(card.to_string()));
        }
    }
    Ok(opp)
}

/// Opponents from a range, skipping combos that collide with known cards.
fn usable_opponents(known: &Known, villains: &[Combo]) -> Result<Vec<Opponent>> {
    let mut out = Vec::with_capacity(villains.len());
    for combo in villains {
        let opp = Opponent::new(combo)?;
        if opp.mask & known.used == 0 {
            out.push(opp);
        }
    }
    log::debug!("{} of {} opposing combos survive card removal", out.len(), villains.len());
    if out.is_empty() {
        return Err(EngineError::EmptyRange);
    }
    Ok(out)
}

/// Every board completion for one opposing combo.
fn enumerate_matchup(known: &Known, opp: Opponent, deadline: &Deadline) -> Result<Tally> {
    let (hero7, opp7) = known.hands(opp.cards);
    let missing = known.missing();
    if missing == 0 {
        let mut tally = Tally::default();
        tally.record(score_unchecked(&hero7), score_unchecked(&opp7));
        return Ok(tally);
    }

    let deck = Deck::without(known.used | opp.mask);
    let cards = deck.cards();
    let start = known.board.len();

    (0..=cards.len() - missing)
        .into_par_iter()
        .map(|first| -> Result<Tally> {
            deadline.check()?;
            let rest = &cards[first + 1..];
            let mut cursor = IndexCursor::new(rest.len(), missing - 1)?;
            let (mut hero, mut villain) = (hero7, opp7);
            hero[start] = cards[first];
            villain[start] = cards[first];

            let mut tally = Tally::default();
            let mut since_check = 0;
            while let Some(idx) = cursor.advance() {
                for (slot, &i) in idx.iter().enumerate() {
                    hero[start + 1 + slot] = rest[i];
                    villain[start + 1 + slot] = rest[i];
                }
                tally.record(score_unchecked(&hero), score_unchecked(&villain));
                since_check += 1;
                if since_check == CHECK_INTERVAL {
                    deadline.check()?;
                    since_check = 0;
                }
            }
            Ok(tally)
        })
        .try_reduce(Tally::default, |a, b| Ok(a + b))
}

fn enumerate_all(known: &Known, opponents: &[Opponent], deadline: &Deadline) -> Result<Equity> {
    deadline.check()?;
    let tally = opponents
        .par_iter()
        .map(|&opp| enumerate_matchup(known, opp, deadline))
        .try_reduce(Tally::default, |a, b| Ok(a + b))?;
    log::debug!(
        "enumerated {} showdowns across {} opposing combos",
        tally.total,
        opponents.len()
    );
    Ok(tally.into_equity())
}

fn sample_all(
    known: &Known,
    opponents: &[Opponent],
    simulations: usize,
    seed: Option<u64>,
    deadline: &Deadline,
) -> Result<Equity> {
    if simulations == 0 {
        return Err(EngineError::InvalidConfig("simulations must be positive".into()));
    }
    // A complete board leaves nothing to sample.
    if known.missing() == 0 {
        return enumerate_all(known, opponents, deadline);
    }
    deadline.check()?;

    let mut master: StdRng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    };
    let chunks: Vec<(u64, usize)> = (0..simulations)
        .step_by(CHUNK_SIZE)
        .map(|start| (master.gen(), CHUNK_SIZE.min(simulations - start)))
        .collect();
    let missing = known.missing();
    let start = known.board.len();

    let tally = chunks
        .into_par_iter()
        .map(|(chunk_seed, size)| -> Result<Tally> {
            let mut rng = StdRng::seed_from_u64(chunk_seed);
            let mut decks: Vec<Deck> = opponents
                .iter()
                .map(|opp| Deck::without(known.used | opp.mask))
                .collect();
            let mut tally = Tally::default();
            for n in 0..size {
                if n % SAMPLE_CHECK_INTERVAL == 0 {
                    deadline.check()?;
                }
                let pick = rng.gen_range(0..opponents.len());
                let (mut hero, mut villain) = known.hands(opponents[pick].cards);
                let completion = decks[pick].draw(&mut rng, missing);
                hero[start..5].copy_from_slice(completion);
                villain[start..5].copy_from_slice(completion);
                tally.record(score_unchecked(&hero), score_unchecked(&villain));
            }
            Ok(tally)
        })
        .try_reduce(Tally::default, |a, b| Ok(a + b))?;
    log::debug!("sampled {} showdowns across {} opposing combos", tally.total, opponents.len());
    Ok(tally.into_equity())
}

/// Exact equity of `hero` against one known hand.
pub fn exact_hand_vs_hand(
    hero: &Combo,
    villain: &Combo,
    board: &[Card],
    deadline: &Deadline,
) -> Result<Equity> {
    let known = Known::new(hero, board)?;
    let opp = single_opponent(&known, villain)?;
    enumerate_all(&known, &[opp], deadline)
}

/// Monte Carlo equity of `hero` against one known hand.
pub fn approximate_hand_vs_hand(
    hero: &Combo,
    villain: &Combo,
    board: &[Card],
    simulations: usize,
    seed: Option<u64>,
    deadline: &Deadline,
) -> Result<Equity> {
    let known = Known::new(hero, board)?;
    let opp = single_opponent(&known, villain)?;
    sample_all(&known, &[opp], simulations, seed, deadline)
}

/// Exact equity of `hero` against every usable combo in `villains`, each
/// weighted by its number of board completions.
pub fn exact_hand_vs_range(
    hero: &Combo,
    villains: &[Combo],
    board: &[Card],
    deadline: &Deadline,
) -> Result<Equity> {
    let known = Known::new(hero, board)?;
    let opponents = usable_opponents(&known, villains)?;
    enumerate_all(&known, &opponents, deadline)
}

/// Monte Carlo equity of `hero` against a uniformly drawn usable combo.
pub fn approximate_hand_vs_range(
    hero: &Combo,
    villains: &[Combo],
    board: &[Card],
    simulations: usize,
    seed: Option<u64>,
    deadline: &Deadline,
) -> Result<Equity> {
    let known = Known::new(hero, board)?;
    let opponents = usable_opponents(&known, villains)?;
    sample_all(&known, &opponents, simulations, seed, deadline)
}

pub fn calculate_hand_vs_hand_equity(hero: &Combo, villain: &Combo, board: &[Card]) -> Result<Equity> {
    exact_hand_vs_hand(hero, villain, board, &Deadline::none())
}

pub fn approximate_hand_vs_hand_equity(
    hero: &Combo,
    villain: &Combo,
    board: &[Card],
    simulations: usize,
    seed: Option<u64>,
) -> Result<Equity> {
    approximate_hand_vs_hand(hero, villain, board, simulations, seed, &Deadline::none())
}

pub fn calculate_hand_range_equity(hero: &Combo, villains: &[Combo], board: &[Card]) -> Result<Equity> {
    exact_hand_vs_range(hero, villains, board, &Deadline::none())
}

pub fn approximate_hand_range_equity(
    hero: &Combo,
    villains: &[Combo],
    board: &[Card],
    simulations: usize,
    seed: Option<u64>,
) -> Result<Equity> {
    approximate_hand_vs_range(hero, villains, board, simulations, seed, &Deadline::none())
}
