//! # poker_equity
//!
//! Texas Hold'em hand evaluation and equity calculation.
//!
//! The library scores 5 to 7 card hands with precomputed lookup tables,
//! expands range notation into concrete two-card combos, and computes how
//! often a hand wins or ties against another hand, a range, or a whole table
//! of known hands.
//!
//! ## How it works
//!
//! 1. Cards are packed into 32-bit integers (rank bit, suit bit, rank index
//!    and a prime per rank) so a five-card hand scores with a couple of table
//!    lookups.
//! 2. Equity is either enumerated over every board completion (exact) or
//!    estimated from random completions (approximate). Exact work is split
//!    across rayon workers; sampling runs in independently seeded chunks.
//! 3. [`EquityCalculator`] picks the mode for hand-vs-range requests, bounds
//!    each request with a deadline and reports timeouts and cancellation as
//!    errors instead of partial numbers.
//!
//! ## Key features
//!
//! - **Deterministic**: exact results are identical on every run and pool
//!   size; pass a seed to reproduce an approximate result.
//! - **Range notation**: pairs, suited/offsuit classes, `+` ladders and the
//!   `X` wildcard, grouped into raise/call/fold buckets by [`PokerRange`].
//! - **Typed errors**: every failure is an [`EngineError`] variant.
//!
//! ## Quick start
//!
//! ```rust
//! use poker_equity::{
//!     calculate_hand_vs_hand_equity, parse_cards, Combo, EquityCalculator, EquityConfig,
//!     PokerRange,
//! };
//!
//! let hero: Combo = "AsAh".parse().unwrap();
//! let villain: Combo = "KsKd".parse().unwrap();
//! let board = parse_cards(&["Kc", "7h", "2s", "9d"]).unwrap();
//!
//! // Exact: the set of kings loses only to the two aces left in the deck.
//! let eq = calculate_hand_vs_hand_equity(&hero, &villain, &board).unwrap();
//! assert!((eq.win - 2.0 / 44.0).abs() < 1e-12);
//!
//! // Against a range, with the mode picked by the calculator:
//! let calc = EquityCalculator::new(EquityConfig::default().with_seed(42)).unwrap();
//! let range = PokerRange { raise: vec!["QQ+".into(), "AKs".into()], ..Default::default() };
//! let detailed = calc.detailed_hand_vs_range(&hero, &range, &board, true).unwrap();
//! println!("{:.3} ({}, {} combos)", detailed.equity.equity, detailed.mode, detailed.combos_considered);
//! ```

pub mod equity_engine;

// Convenience re-exports so callers can use `poker_equity::evaluate`
// directly without reaching into `equity_engine::`.
pub use equity_engine::{
    approximate_hand_range_equity, approximate_hand_vs_hand_equity, calculate_hand_range_equity,
    calculate_hand_vs_hand_equity, card_to_int, combo_to_descriptor, descriptor_to_combos,
    evaluate, evaluate_hand, evaluate_multiple_hands, int_to_card, parse_cards,
    CalculationMode, CancelToken, Card, Combo, Deadline, DetailedEquity, EngineError, Equity,
    EquityCalculator, EquityConfig, HandCategory, HandScore, PokerRange, RangeAction,
    WhoWinsResult,
};
