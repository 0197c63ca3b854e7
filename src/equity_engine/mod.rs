//! Core equity engine: card encoding, hand scoring, range expansion and
//! win/tie probabilities.
//!
//! ## Module overview
//!
//! | Module         | Purpose |
//! |----------------|---------|
//! | `models`       | Shared types: cards, combos, ranges, equity and showdown results |
//! | `error`        | `EngineError`, one variant per failure callers can branch on |
//! | `codec`        | Packed 32-bit card integers and token parsing |
//! | `combinations` | Lazy k-subset enumeration over slices and index ranges |
//! | `lookup`       | One-time evaluator tables and the category score boundaries |
//! | `evaluator`    | Best-five-card score for 5, 6, 7 (or more) cards |
//! | `deck`         | Remaining cards after exclusions, partial Fisher-Yates draws |
//! | `range`        | Descriptor expansion ("AKs", "TT+", "AXs") and range utilities |
//! | `cancel`       | Deadlines and cancellation tokens checked by the hot loops |
//! | `equity`       | Exact and Monte Carlo hand-vs-hand / hand-vs-range equity |
//! | `multiway`     | Who wins a showdown between any number of known hands |
//! | `config`       | `EquityConfig`: simulation count, mode threshold, timeouts, threads |
//! | `calculator`   | `EquityCalculator`: mode selection, deadlines and thread pool in one place |

pub mod calculator;
pub mod cancel;
pub mod codec;
pub mod combinations;
pub mod config;
pub mod deck;
pub mod equity;
pub mod error;
pub mod evaluator;
pub mod lookup;
pub mod models;
pub mod multiway;
pub mod range;

// Re-export the public API surface so callers can use
// `equity_engine::calculate_hand_vs_hand_equity` without reaching into sub-modules.
pub use calculator::EquityCalculator;
pub use cancel::{CancelToken, Deadline};
pub use codec::{card_to_int, int_to_card, parse_cards, ALL_CARDS};
pub use combinations::{binomial, combinations, Combinations};
pub use config::EquityConfig;
pub use equity::{
    approximate_hand_range_equity, approximate_hand_vs_hand_equity, calculate_hand_range_equity,
    calculate_hand_vs_hand_equity,
};
pub use error::{EngineError, Result};
pub use evaluator::{evaluate, evaluate_hand, HandCategory, HandScore};
pub use models::{
    CalculationMode, Card, Combo, DetailedEquity, Equity, HandEvaluation, PokerRange, Rank,
    RangeAction, RangeBreakdown, RangeStats, RangeValidation, Suit, WhoWinsResult,
};
pub use multiway::{evaluate_multiple_hands, hand_pot_share, is_hand_winner};
pub use range::{
    combo_to_descriptor, descriptor_to_combos, expand_descriptor, hand_matrix,
    parse_descriptor_list, HandClass, Shape,
};
