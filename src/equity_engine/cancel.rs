//! Cooperative cancellation for long-running equity calculations.
//!
//! Enumeration and sampling loops call [`Deadline::check`] at regular
//! intervals; once the deadline passes or the token fires, the calculation
//! unwinds with an error and no partial result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::equity_engine::error::{EngineError, Result};

/// Shared flag a caller can set from another thread to abandon a calculation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
    limit: Option<Duration>,
    token: CancelToken,
}

impl Deadline {
    /// Never expires; can still be cancelled through [`Deadline::token`].
    pub fn none() -> Self {
        Self::default()
    }

    /// Expires `limit` from now.
    pub fn after(limit: Duration) -> Self {
        Deadline {
            expires_at: Instant::now().checked_add(limit),
            limit: Some(limit),
            token: CancelToken::new(),
        }
    }

    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        match (self.expires_at, self.limit) {
            (Some(at), Some(limit)) if Instant::now() >= at => {
                Err(EngineError::CalculationTimeout(limit))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_deadline_passes() {
        assert_eq!(Deadline::none().check(), Ok(()));
        assert_eq!(Deadline::after(Duration::from_secs(60)).check(), Ok(()));
    }

    #[test]
    fn elapsed_deadline_reports_timeout() {
        let d = Deadline::after(Duration::ZERO);
        assert_eq!(d.check(), Err(EngineError::CalculationTimeout(Duration::ZERO)));
    }

    #[test]
    fn token_cancels_across_clones() {
        let token = CancelToken::new();
        let d = Deadline::after(Duration::from_secs(60)).with_token(token.clone());
        let worker_copy = d.clone();
        token.cancel();
        assert_eq!(worker_copy.check(), Err(EngineError::Cancelled));
    }
}
