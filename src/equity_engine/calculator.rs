use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::equity_engine::{
    cancel::{CancelToken, Deadline},
    codec::encode_all,
    config::EquityConfig,
    equity,
    error::{EngineError, Result},
    evaluator::validate,
    models::{CalculationMode, Card, Combo, DetailedEquity, Equity, PokerRange, WhoWinsResult},
    multiway::evaluate_multiple_hands,
    range::remove_conflicts,
};

/// Entry point for callers holding a config: picks the mode, applies the
/// mode's deadline and runs on the configured pool.
pub struct EquityCalculator {
    config: EquityConfig,
    pool: Option<ThreadPool>,
    token: CancelToken,
}

impl EquityCalculator {
    pub fn new(config: EquityConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.threads {
            Some(threads) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("equity-worker-{i}"))
                    .build()
                    .map_err(|e| EngineError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        Ok(EquityCalculator { config, pool, token: CancelToken::new() })
    }

    /// Share `token` with every calculation. Cancelling it aborts whatever is
    /// running and fails every later call.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    pub fn config(&self) -> &EquityConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.token
    }

    /// Sampling whenever exact is not requested or the range is wider than
    /// the configured threshold.
    pub fn select_mode(&self, combos: usize, use_exact: bool) -> CalculationMode {
        if !use_exact || combos > self.config.monte_carlo_threshold {
            CalculationMode::Approximate
        } else {
            CalculationMode::Exact
        }
    }

    fn deadline(&self, mode: CalculationMode) -> Deadline {
        let limit = match mode {
            CalculationMode::Exact       => self.config.exact_timeout(),
            CalculationMode::Approximate => self.config.approximate_timeout(),
        };
        Deadline::after(limit).with_token(self.token.clone())
    }

    fn run<T, F>(&self, job: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(job),
            None       => job(),
        }
    }

    pub fn hand_vs_hand(
        &self,
        hero: &Combo,
        villain: &Combo,
        board: &[Card],
        mode: CalculationMode,
    ) -> Result<Equity> {
        let deadline = self.deadline(mode);
        let started = Instant::now();
        let result = self.run(|| match mode {
            CalculationMode::Exact => equity::exact_hand_vs_hand(hero, villain, board, &deadline),
            CalculationMode::Approximate => equity::approximate_hand_vs_hand(
                hero,
                villain,
                board,
                self.config.simulations,
                self.config.seed,
                &deadline,
            ),
        });
        report("hand-vs-hand", mode, started, result)
    }

    pub fn hand_vs_range(
        &self,
        hero: &Combo,
        range: &PokerRange,
        board: &[Card],
        use_exact: bool,
    ) -> Result<Equity> {
        Ok(self.detailed_hand_vs_range(hero, range, board, use_exact)?.equity)
    }

    /// Equity against every combo in every bucket of `range`, together with
    /// the mode used and the range's statistics.
    pub fn detailed_hand_vs_range(
        &self,
        hero: &Combo,
        range: &PokerRange,
        board: &[Card],
        use_exact: bool,
    ) -> Result<DetailedEquity> {
        if board.len() > 5 {
            return Err(EngineError::BoardTooLarge(board.len()));
        }
        let known: Vec<Card> = hero.cards().into_iter().chain(board.iter().copied()).collect();
        validate(&encode_all(&known)?)?;

        let range_stats = range.stats()?;
        let villains = remove_conflicts(range.combos()?, &known);
        log::debug!(
            "range {:?}: {} combos, {} after card removal",
            range.descriptor(),
            range_stats.total_combos,
            villains.len()
        );
        if villains.is_empty() {
            log::warn!("no opposing combos left after removing {} known cards", known.len());
            return Err(EngineError::EmptyRange);
        }

        let mode = self.select_mode(villains.len(), use_exact);
        log::debug!("{} opposing combos, using {mode} mode", villains.len());
        let deadline = self.deadline(mode);
        let started = Instant::now();
        let result = self.run(|| match mode {
            CalculationMode::Exact => equity::exact_hand_vs_range(hero, &villains, board, &deadline),
            CalculationMode::Approximate => equity::approximate_hand_vs_range(
                hero,
                &villains,
                board,
                self.config.simulations,
                self.config.seed,
                &deadline,
            ),
        });
        let equity = report("hand-vs-range", mode, started, result)?;

        Ok(DetailedEquity {
            equity,
            mode,
            combos_considered: villains.len(),
            range_stats,
        })
    }

    pub fn who_wins(&self, hands: &[Combo], board: &[Card]) -> Result<WhoWinsResult> {
        evaluate_multiple_hands(hands, board)
    }
}

fn report(what: &str, mode: CalculationMode, started: Instant, result: Result<Equity>) -> Result<Equity> {
    match &result {
        Ok(eq) => log::info!(
            "{what} ({mode}): equity {:.4} in {:?}",
            eq.equity,
            started.elapsed()
        ),
        Err(EngineError::CalculationTimeout(limit)) => {
            log::warn!("{what} ({mode}) abandoned after {limit:?}")
        }
        Err(EngineError::Cancelled) => log::warn!("{what} ({mode}) cancelled"),
        Err(_) => {}
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equity_engine::codec::parse_cards;

    fn combo(s: &str) -> Combo {
        s.parse().unwrap()
    }

    fn calculator(config: EquityConfig) -> EquityCalculator {
        EquityCalculator::new(config).unwrap()
    }

    #[test]
    fn mode_policy_follows_threshold() {
        let calc = calculator(EquityConfig::default());
        assert_eq!(calc.select_mode(2, true), CalculationMode::Exact);
        assert_eq!(calc.select_mode(3, true), CalculationMode::Approximate);
        assert_eq!(calc.select_mode(1, false), CalculationMode::Approximate);

        let wide = calculator(EquityConfig::default().with_threshold(100));
        assert_eq!(wide.select_mode(50, true), CalculationMode::Exact);
    }

    #[test]
    fn narrow_range_is_enumerated_and_wide_range_sampled() {
        let calc = calculator(EquityConfig::default().with_simulations(10_000).with_seed(3));
        let board = parse_cards(&["2c", "7d", "9h", "Js"]).unwrap();
        let hero = combo("AsAh");

        // The hero's aces block two of the four suited combos.
        let narrow = PokerRange { call: vec!["AKs".into()], ..Default::default() };
        let detailed = calc.detailed_hand_vs_range(&hero, &narrow, &board, true).unwrap();
        assert_eq!(detailed.mode, CalculationMode::Exact);
        assert_eq!(detailed.combos_considered, 2);
        assert_eq!(detailed.range_stats.total_combos, 4);

        let wide = PokerRange { raise: vec!["KK".into()], ..Default::default() };
        let detailed = calc.detailed_hand_vs_range(&hero, &wide, &board, true).unwrap();
        assert_eq!(detailed.mode, CalculationMode::Approximate);
        assert_eq!(detailed.combos_considered, 6);
        assert!(detailed.equity.equity > 0.9);
    }

    #[test]
    fn range_equity_matches_direct_enumeration() {
        let calc = calculator(EquityConfig::default());
        let board = parse_cards(&["Qs", "Td", "4c"]).unwrap();
        let range = PokerRange { raise: vec!["AKs".into()], ..Default::default() };
        let hero = combo("QhQd");
        let via_calc = calc.hand_vs_range(&hero, &range, &board, true).unwrap();
        let villains: Vec<Combo> = range.combos().unwrap().into_iter().collect();
        let direct = equity::calculate_hand_range_equity(&hero, &villains, &board).unwrap();
        assert_eq!(via_calc, direct);
    }

    #[test]
    fn blocked_range_is_empty() {
        let calc = calculator(EquityConfig::default());
        let board = parse_cards(&["Ad", "Ac", "7h"]).unwrap();
        let range = PokerRange { raise: vec!["AA".into()], ..Default::default() };
        assert_eq!(
            calc.hand_vs_range(&combo("AsAh"), &range, &board, true),
            Err(EngineError::EmptyRange)
        );
    }

    #[test]
    fn invalid_descriptor_surfaces() {
        let calc = calculator(EquityConfig::default());
        let range = PokerRange { raise: vec!["AZs".into()], ..Default::default() };
        assert_eq!(
            calc.hand_vs_range(&combo("AsAh"), &range, &[], true),
            Err(EngineError::InvalidDescriptor("AZs".into()))
        );
    }

    #[test]
    fn hero_board_overlap_is_rejected_before_filtering() {
        let calc = calculator(EquityConfig::default());
        let board = parse_cards(&["As", "7d", "2c"]).unwrap();
        let range = PokerRange { raise: vec!["KK".into()], ..Default::default() };
        assert_eq!(
            calc.hand_vs_range(&combo("AsAh"), &range, &board, true),
            Err(EngineError::DuplicateCard("As".into()))
        );
    }

    #[test]
    fn seeded_config_is_reproducible_on_any_pool() {
        let board = parse_cards(&["8c", "9c", "2d"]).unwrap();
        let base = EquityConfig::default().with_seed(11).with_simulations(20_000);
        let one = calculator(base.clone().with_threads(1));
        let four = calculator(base.with_threads(4));
        let (hero, villain) = (combo("AcKc"), combo("QhQs"));
        assert_eq!(
            one.hand_vs_hand(&hero, &villain, &board, CalculationMode::Approximate).unwrap(),
            four.hand_vs_hand(&hero, &villain, &board, CalculationMode::Approximate).unwrap()
        );
    }

    #[test]
    fn zero_timeout_fails_without_result() {
        let mut config = EquityConfig::default();
        config.exact_timeout_ms = 0;
        let calc = calculator(config);
        assert!(matches!(
            calc.hand_vs_hand(&combo("AsAd"), &combo("KsKd"), &[], CalculationMode::Exact),
            Err(EngineError::CalculationTimeout(_))
        ));
    }

    #[test]
    fn cancelled_calculator_refuses_work() {
        let token = CancelToken::new();
        let calc = calculator(EquityConfig::default()).with_cancel_token(token.clone());
        token.cancel();
        assert_eq!(
            calc.hand_vs_hand(&combo("AsAd"), &combo("KsKd"), &[], CalculationMode::Approximate),
            Err(EngineError::Cancelled)
        );
    }

    #[test]
    fn zero_threads_is_a_config_error() {
        let config = EquityConfig { threads: Some(0), ..Default::default() };
        assert!(matches!(EquityCalculator::new(config), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn who_wins_delegates_to_showdown() {
        let calc = calculator(EquityConfig::default());
        let board = parse_cards(&["Ah", "Kd", "7c", "7s", "2h"]).unwrap();
        let result = calc.who_wins(&[combo("AsAd"), combo("KsKh")], &board).unwrap();
        assert_eq!(result.winning_indices, vec![0]);
    }
}
