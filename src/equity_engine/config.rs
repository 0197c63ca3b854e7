use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::equity_engine::error::{EngineError, Result};

/// Tunables for [`EquityCalculator`](crate::equity_engine::calculator::EquityCalculator).
///
/// Deserialises from camelCase JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquityConfig {
    /// Monte Carlo samples per approximate calculation.
    pub simulations: usize,
    /// Hand-vs-range requests with more opposing combos than this are sampled
    /// instead of enumerated.
    pub monte_carlo_threshold: usize,
    pub exact_timeout_ms: u64,
    pub approximate_timeout_ms: u64,
    /// Worker threads; `None` uses rayon's global pool.
    pub threads: Option<usize>,
    /// Fixed seed for reproducible sampling; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EquityConfig {
    fn default() -> Self {
        EquityConfig {
            simulations: 100_000,
            monte_carlo_threshold: 2,
            exact_timeout_ms: 60_000,
            approximate_timeout_ms: 30_000,
            threads: None,
            seed: None,
        }
    }
}

impl EquityConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EquityConfig =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.simulations == 0 {
            return Err(EngineError::InvalidConfig("simulations must be positive".into()));
        }
        if self.threads == Some(0) {
            return Err(EngineError::InvalidConfig("threads must be positive".into()));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.monte_carlo_threshold = threshold;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn exact_timeout(&self) -> Duration {
        Duration::from_millis(self.exact_timeout_ms)
    }

    pub fn approximate_timeout(&self) -> Duration {
        Duration::from_millis(self.approximate_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EquityConfig::default();
        assert_eq!(c.simulations, 100_000);
        assert_eq!(c.monte_carlo_threshold, 2);
        assert_eq!(c.exact_timeout(), Duration::from_secs(60));
        assert_eq!(c.approximate_timeout(), Duration::from_secs(30));
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = EquityConfig::from_json(r#"{"simulations": 5000, "seed": 7}"#).unwrap();
        assert_eq!(c.simulations, 5000);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.monte_carlo_threshold, 2);
        assert_eq!(c.threads, None);
    }

    #[test]
    fn camel_case_keys() {
        let c = EquityConfig::from_json(r#"{"monteCarloThreshold": 40, "exactTimeoutMs": 10}"#).unwrap();
        assert_eq!(c.monte_carlo_threshold, 40);
        assert_eq!(c.exact_timeout(), Duration::from_millis(10));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EquityConfig::from_json(r#"{"simulations": 0}"#),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(matches!(
            EquityConfig::from_json(r#"{"threads": 0}"#),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(matches!(
            EquityConfig::from_json("not json"),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn builders_chain() {
        let c = EquityConfig::default().with_seed(1).with_simulations(10).with_threshold(0).with_threads(2);
        assert_eq!((c.seed, c.simulations, c.monte_carlo_threshold, c.threads), (Some(1), 10, 0, Some(2)));
    }
}
