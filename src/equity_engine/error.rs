use std::time::Duration;

/// Every failure the engine reports. Callers branch on the variant; the
/// engine never retries and never substitutes a guessed value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// Malformed card token or an integer outside the 52 encoded cards.
    #[error("invalid card: {0:?}")]
    InvalidCard(String),
    /// The same physical card appears twice in one evaluation.
    #[error("duplicate card: {0}")]
    DuplicateCard(String),
    #[error("insufficient cards: need at least 5 to evaluate, got {0}")]
    InsufficientCards(usize),
    #[error("invalid arity: cannot choose {k} elements from a set of {n}")]
    InvalidArity { k: usize, n: usize },
    #[error("invalid range descriptor: {0:?}")]
    InvalidDescriptor(String),
    #[error("empty range: no combos remain after removing conflicts with known cards")]
    EmptyRange,
    #[error("calculation timed out after {0:?}")]
    CalculationTimeout(Duration),
    #[error("calculation cancelled")]
    Cancelled,
    #[error("at least one hand must be provided")]
    NoHands,
    #[error("board has {0} cards, at most 5 allowed")]
    BoardTooLarge(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
