//! Counterfactual Regret Minimization solver.
//!
//! This module implements the CFR engine over any tree implementing
//! [`GameNode`], with two traversal variants:
//! - **Exhaustive CFR**: exact expectation at chance nodes, strategies held
//!   fixed during the sweep and updated in a separate pass
//! - **Chance-sampling CFR**: one sampled chance outcome per iteration,
//!   strategies updated inline
//!
//! Regrets for both players are accumulated in the same sweep. All utilities
//! are from the point of view of [`Player::A`].

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cfr::config::{CFRConfig, CFRStats};
use crate::cfr::error::SolverError;
use crate::cfr::game::{GameNode, Player};
use crate::cfr::storage::{EquilibriumExport, RegretStorage};

/// The main CFR solver.
///
/// The solver borrows an immutable game tree and owns every mutable table:
/// current strategy, cumulative regret, cumulative strategy and the derived
/// equilibrium.
///
/// # Type Parameters
/// - `N`: the node type of the game tree
/// - `R`: the random source used by chance sampling
///
/// # Example
/// ```
/// use cfr_solver::cfr::{CFRConfig, CFRSolver};
/// use cfr_solver::games::kuhn::KuhnNode;
///
/// let root = KuhnNode::new();
/// let mut solver = CFRSolver::new(&root, CFRConfig::vanilla()).unwrap();
/// solver.run(100).unwrap();
/// solver.compute_equilibrium().unwrap();
/// let value = solver.value_of_game().unwrap();
/// assert!(value.is_finite());
/// assert_eq!(solver.iteration(), 100);
/// ```
pub struct CFRSolver<'a, N: GameNode, R: Rng = StdRng> {
    /// Root of the game tree.
    root: &'a N,

    /// Configuration for the solver.
    config: CFRConfig,

    /// Strategy, regret and equilibrium tables.
    storage: RegretStorage<N::Action>,

    /// Current iteration count.
    iteration: u64,

    /// Statistics tracking.
    stats: CFRStats,

    /// Random number generator for chance sampling.
    rng: R,
}

impl<'a, N: GameNode> CFRSolver<'a, N, StdRng> {
    /// Create a new CFR solver over the tree rooted at `root`.
    ///
    /// Chance sampling draws from a `StdRng` seeded with `config.seed`, or
    /// from system entropy when no seed is set.
    ///
    /// # Errors
    /// Invalid configuration, or a tree that breaks the [`GameNode`]
    /// contract.
    pub fn new(root: &'a N, config: CFRConfig) -> Result<Self, SolverError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self::with_rng(root, config, rng)
    }
}

impl<'a, N: GameNode, R: Rng> CFRSolver<'a, N, R> {
    /// Create a solver that samples chance outcomes from `rng`.
    ///
    /// Builds the storage with one walk over the whole tree.
    pub fn with_rng(root: &'a N, config: CFRConfig, rng: R) -> Result<Self, SolverError> {
        config.validate()?;

        let storage = RegretStorage::build(root)?;
        log::debug!(
            "registered {} information sets ({} decision)",
            storage.num_info_sets(),
            storage.num_decision_info_sets()
        );

        let stats = CFRStats {
            info_sets: storage.num_decision_info_sets(),
            ..CFRStats::new()
        };

        Ok(Self {
            root,
            config,
            storage,
            iteration: 0,
            stats,
            rng,
        })
    }

    /// Run a single CFR iteration.
    ///
    /// Exhaustive mode sweeps the whole tree with fixed strategies and then
    /// applies regret matching to every decision information set. Chance
    /// sampling sweeps one sampled deal and updates strategies on the way.
    pub fn run_iteration(&mut self) -> Result<(), SolverError> {
        self.iteration += 1;

        let root = self.root;
        self.utility(root, 1.0, 1.0)?;

        // Strategies must stay fixed for the whole exhaustive sweep
        if !self.config.chance_sampling {
            self.storage.update_strategies();
        }

        Ok(())
    }

    /// Run `iterations` CFR iterations.
    ///
    /// # Returns
    /// Statistics accumulated over the solver's lifetime.
    ///
    /// # Errors
    /// [`SolverError::NoIterations`] for zero iterations; any contract
    /// violation raised by the tree.
    pub fn run(&mut self, iterations: u64) -> Result<&CFRStats, SolverError> {
        self.run_with_callback(iterations, u64::MAX, |_| {})
    }

    /// Run with a callback for progress tracking.
    ///
    /// # Arguments
    /// * `iterations` - Number of iterations to run
    /// * `callback_interval` - How often to call the callback
    /// * `callback` - Function called every `callback_interval` iterations
    pub fn run_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<&CFRStats, SolverError>
    where
        F: FnMut(&CFRStats),
    {
        if iterations == 0 {
            return Err(SolverError::NoIterations);
        }

        log::info!(
            "running {} {} iterations from iteration {}",
            iterations,
            self.variant_name(),
            self.iteration
        );

        let start_time = Instant::now();
        let previous_elapsed = self.stats.elapsed_seconds;
        let callback_interval = callback_interval.max(1);

        for i in 0..iterations {
            self.run_iteration()?;

            let done = i + 1;
            let report = done % callback_interval == 0;
            let should_log = self
                .config
                .log_interval
                .is_some_and(|interval| done % interval == 0);

            if report || should_log {
                self.refresh_stats(previous_elapsed + start_time.elapsed().as_secs_f64());
            }
            if report {
                callback(&self.stats);
            }
            if should_log {
                log::info!(
                    "iteration {} ({:.0} it/s)",
                    self.iteration,
                    self.stats.iterations_per_second
                );
            }
        }

        self.refresh_stats(previous_elapsed + start_time.elapsed().as_secs_f64());
        log::info!(
            "finished at iteration {} in {:.2}s",
            self.iteration,
            self.stats.elapsed_seconds
        );

        Ok(&self.stats)
    }

    fn refresh_stats(&mut self, elapsed_seconds: f64) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.storage.num_decision_info_sets();
        self.stats.elapsed_seconds = elapsed_seconds;
        self.stats.update_rate();
    }

    fn variant_name(&self) -> &'static str {
        if self.config.chance_sampling {
            "chance-sampling"
        } else {
            "exhaustive"
        }
    }

    /// Counterfactual utility of `node` to player A.
    ///
    /// `reach_a` and `reach_b` are the probabilities each player's own
    /// strategy contributes to reaching `node`.
    fn utility(&mut self, node: &'a N, reach_a: f64, reach_b: f64) -> Result<f64, SolverError> {
        if node.is_terminal() {
            return Ok(node.evaluation()?);
        }

        if node.is_chance() {
            if self.config.chance_sampling {
                let child = node.sample_one_child(&mut self.rng)?;
                return self.utility(child, reach_a, reach_b);
            }

            let mut value = 0.0;
            for action in node.actions() {
                let probability = node.chance_probability(action)?;
                value += probability * self.utility(node.play(action)?, reach_a, reach_b)?;
            }
            return Ok(value);
        }

        let info_set = node.information_set();
        let mover = node.acting_player();
        // Copied because the recursion below borrows the storage mutably
        let strategy = self.storage.slots(info_set)?.strategy.clone();
        let actions = node.actions();

        let mut child_values = Vec::with_capacity(actions.len());
        let mut value = 0.0;
        for (action, &probability) in actions.iter().zip(&strategy) {
            let (child_reach_a, child_reach_b) = match mover {
                Player::A => (reach_a * probability, reach_b),
                _ => (reach_a, reach_b * probability),
            };
            let child_value = self.utility(node.play(action)?, child_reach_a, child_reach_b)?;
            value += probability * child_value;
            child_values.push(child_value);
        }

        // Regret is weighted by how often the opponent lets us get here,
        // the average strategy by how often we do.
        let (cfr_reach, own_reach) = match mover {
            Player::A => (reach_b, reach_a),
            _ => (reach_a, reach_b),
        };

        let slots = self.storage.slots_mut(info_set)?;
        for (i, &child_value) in child_values.iter().enumerate() {
            slots.regrets[i] += mover.sign() * cfr_reach * (child_value - value);
            slots.strategy_sums[i] += own_reach * strategy[i];
        }

        // One visit per information set per sampled iteration, so nothing
        // later in this sweep reads the updated strategy.
        if self.config.chance_sampling {
            slots.regret_match();
        }

        Ok(value)
    }

    /// Rebuild the equilibrium map with one walk over the tree.
    ///
    /// Chance information sets get the chance distribution; decision
    /// information sets get the normalized cumulative strategy. Idempotent.
    pub fn compute_equilibrium(&mut self) -> Result<(), SolverError> {
        let root = self.root;
        self.equilibrium_rec(root)?;
        self.storage.mark_equilibrium_computed();
        Ok(())
    }

    fn equilibrium_rec(&mut self, node: &'a N) -> Result<(), SolverError> {
        if node.is_terminal() {
            return Ok(());
        }

        let info_set = node.information_set();
        let probabilities = if node.is_chance() {
            node.actions()
                .iter()
                .map(|a| node.chance_probability(a))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.storage
                .average_strategy(info_set)
                .ok_or_else(|| SolverError::UnknownInfoSet(info_set.to_string()))?
        };
        self.storage.set_equilibrium(info_set, probabilities);

        for action in node.actions() {
            self.equilibrium_rec(node.play(action)?)?;
        }
        Ok(())
    }

    /// Expected payoff to player A when both players follow the
    /// equilibrium.
    ///
    /// # Errors
    /// [`SolverError::EquilibriumNotComputed`] if
    /// [`CFRSolver::compute_equilibrium`] has never run.
    pub fn value_of_game(&self) -> Result<f64, SolverError> {
        if !self.storage.equilibrium_computed() {
            return Err(SolverError::EquilibriumNotComputed);
        }
        self.value_rec(self.root)
    }

    fn value_rec(&self, node: &N) -> Result<f64, SolverError> {
        if node.is_terminal() {
            return Ok(node.evaluation()?);
        }

        let info_set = node.information_set();
        let probabilities = self
            .storage
            .equilibrium_row(info_set)
            .ok_or(SolverError::EquilibriumNotComputed)?;

        let mut value = 0.0;
        for (action, &probability) in node.actions().iter().zip(probabilities) {
            value += probability * self.value_rec(node.play(action)?)?;
        }
        Ok(value)
    }

    /// Current strategy probability of `action` at `info_set`.
    pub fn strategy(&self, info_set: &str, action: &N::Action) -> Option<f64> {
        self.storage.strategy(info_set, action)
    }

    /// Cumulative regret of `action` at `info_set`.
    pub fn cumulative_regret(&self, info_set: &str, action: &N::Action) -> Option<f64> {
        self.storage.cumulative_regret(info_set, action)
    }

    /// Cumulative strategy weight of `action` at `info_set`.
    pub fn cumulative_strategy(&self, info_set: &str, action: &N::Action) -> Option<f64> {
        self.storage.cumulative_strategy(info_set, action)
    }

    /// Equilibrium probability of `action` at `info_set`, once computed.
    pub fn equilibrium(&self, info_set: &str, action: &N::Action) -> Option<f64> {
        self.storage.equilibrium(info_set, action)
    }

    /// Get the average strategy for an information set.
    ///
    /// This returns the time-averaged strategy which converges to Nash
    /// equilibrium, without rebuilding the whole equilibrium map.
    pub fn average_strategy(&self, info_set: &str) -> Option<Vec<f64>> {
        self.storage.average_strategy(info_set)
    }

    /// Export the equilibrium with named actions.
    pub fn export_equilibrium(&self) -> EquilibriumExport {
        self.storage.export_equilibrium()
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Get the number of decision information sets.
    pub fn num_info_sets(&self) -> usize {
        self.storage.num_decision_info_sets()
    }

    /// Get all information set keys, sorted.
    pub fn info_set_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.storage.info_sets().map(str::to_string).collect();
        keys.sort();
        keys
    }

    /// Get current statistics.
    pub fn stats(&self) -> &CFRStats {
        &self.stats
    }

    /// Get reference to the storage for analysis.
    pub fn storage(&self) -> &RegretStorage<N::Action> {
        &self.storage
    }

    /// Get reference to the root of the game tree.
    pub fn root(&self) -> &'a N {
        self.root
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &CFRConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::{Card, KuhnAction, KuhnNode};

    const GAME_VALUE: f64 = -1.0 / 18.0;

    fn solver(root: &KuhnNode, config: CFRConfig) -> CFRSolver<'_, KuhnNode> {
        CFRSolver::new(root, config).unwrap()
    }

    fn rows(solver: &CFRSolver<'_, KuhnNode>) -> Vec<(String, Vec<f64>, Vec<f64>, Vec<f64>)> {
        solver
            .info_set_keys()
            .into_iter()
            .map(|key| {
                let storage = solver.storage();
                let strategy = storage.strategy_row(&key).unwrap().to_vec();
                let regrets = storage.regret_row(&key).unwrap().to_vec();
                let sums = storage.strategy_sum_row(&key).unwrap().to_vec();
                (key, strategy, regrets, sums)
            })
            .collect()
    }

    #[test]
    fn test_new_starts_uniform() {
        let root = KuhnNode::new();
        let solver = solver(&root, CFRConfig::vanilla());

        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.num_info_sets(), 12);
        assert_eq!(solver.stats().info_sets, 12);
        assert_eq!(solver.strategy(".K.", &KuhnAction::Bet), Some(0.5));
        assert_eq!(solver.cumulative_regret(".K.", &KuhnAction::Bet), Some(0.0));
        assert_eq!(solver.cumulative_strategy(".K.", &KuhnAction::Bet), Some(0.0));
        assert_eq!(solver.equilibrium(".K.", &KuhnAction::Bet), None);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let root = KuhnNode::new();
        let result = CFRSolver::new(&root, CFRConfig::vanilla().with_log_interval(0));
        assert!(matches!(result, Err(SolverError::Config(_))));
    }

    #[test]
    fn test_run_zero_iterations_fails() {
        let root = KuhnNode::new();
        let mut solver = solver(&root, CFRConfig::vanilla());
        assert!(matches!(solver.run(0), Err(SolverError::NoIterations)));
        assert_eq!(solver.iteration(), 0);
    }

    #[test]
    fn test_callback_reports_lifetime_iterations() {
        let root = KuhnNode::new();
        let mut solver = solver(&root, CFRConfig::vanilla());
        solver.run(7).unwrap();

        let start = solver.iteration();
        let mut seen = Vec::new();
        let stats = solver
            .run_with_callback(25, 10, |stats| seen.push(stats.iterations))
            .unwrap()
            .clone();

        // Progress relative to the call never passes the requested count
        assert_eq!(seen, vec![17, 27]);
        assert!(seen.iter().all(|&it| it - start <= 25));
        assert_eq!(stats.iterations, 32);
    }

    #[test]
    fn test_first_exhaustive_iteration() {
        // Under uniform play, K facing a bet gains 2 by calling versus 1 by
        // folding in every deal; the regret of calling is positive and
        // the next strategy calls always.
        let root = KuhnNode::new();
        let mut solver = solver(&root, CFRConfig::vanilla());
        solver.run(1).unwrap();

        let call = solver.cumulative_regret(".K.BET", &KuhnAction::Call).unwrap();
        let fold = solver.cumulative_regret(".K.BET", &KuhnAction::Fold).unwrap();
        assert!(call > 0.0);
        assert!(fold < 0.0);
        assert_eq!(solver.strategy(".K.BET", &KuhnAction::Call), Some(1.0));
        assert_eq!(solver.strategy(".K.BET", &KuhnAction::Fold), Some(0.0));

        // Chance information set is never regret matched
        let deal = KuhnAction::Deal(Card::Queen, Card::Jack);
        assert!((solver.strategy(".", &deal).unwrap() - 1.0 / 6.0).abs() < 1e-12);

        // First mover's own reach is 1 at the root, so each action gets 1/2
        // per deal consistent with the card (2 deals per card)
        assert_eq!(solver.cumulative_strategy(".J.", &KuhnAction::Bet), Some(1.0));
        assert_eq!(solver.cumulative_strategy(".J.", &KuhnAction::Check), Some(1.0));
    }

    #[test]
    fn test_strategies_follow_regret_matching() {
        let root = KuhnNode::new();
        let mut solver = solver(&root, CFRConfig::vanilla());
        solver.run(25).unwrap();

        for key in solver.info_set_keys() {
            let storage = solver.storage();
            if storage.kind(&key) != Some(crate::cfr::NodeKind::Decision) {
                continue;
            }
            let regrets = storage.regret_row(&key).unwrap();
            let strategy = storage.strategy_row(&key).unwrap();
            let positive: f64 = regrets.iter().map(|r| r.max(0.0)).sum();

            let total: f64 = strategy.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "{} sums to {}", key, total);

            for (&p, &r) in strategy.iter().zip(regrets) {
                let expected = if positive > 0.0 {
                    r.max(0.0) / positive
                } else {
                    1.0 / regrets.len() as f64
                };
                assert!((p - expected).abs() < 1e-12, "{}: {} != {}", key, p, expected);
            }
        }
    }

    #[test]
    fn test_accumulators_never_reset() {
        let root = KuhnNode::new();
        let mut solver = solver(&root, CFRConfig::vanilla());
        solver.run(10).unwrap();
        let before = rows(&solver);

        solver.run(10).unwrap();
        let after = rows(&solver);

        for ((key, _, _, sums_before), (_, _, _, sums_after)) in before.iter().zip(&after) {
            for (b, a) in sums_before.iter().zip(sums_after) {
                assert!(a >= b, "strategy sum decreased at {}", key);
            }
        }

        // Two runs of 10 match a single run of 20
        let mut fresh = self::solver(&root, CFRConfig::vanilla());
        fresh.run(20).unwrap();
        assert_eq!(rows(&fresh), after);
        assert_eq!(solver.iteration(), 20);
        assert_eq!(solver.stats().iterations, 20);
    }

    #[test]
    fn test_exhaustive_is_deterministic() {
        let root = KuhnNode::new();
        let mut first = solver(&root, CFRConfig::vanilla());
        let mut second = solver(&root, CFRConfig::vanilla());
        first.run(50).unwrap();
        second.run(50).unwrap();
        assert_eq!(rows(&first), rows(&second));
    }

    #[test]
    fn test_sampling_is_seed_deterministic() {
        let root = KuhnNode::new();
        let config = CFRConfig::chance_sampling().with_seed(7);
        let mut first = solver(&root, config.clone());
        let mut second = solver(&root, config);
        first.run(200).unwrap();
        second.run(200).unwrap();
        assert_eq!(rows(&first), rows(&second));

        let mut injected =
            CFRSolver::with_rng(&root, CFRConfig::chance_sampling(), StdRng::seed_from_u64(7))
                .unwrap();
        injected.run(200).unwrap();
        assert_eq!(rows(&injected), rows(&first));
    }

    #[test]
    fn test_sampling_touches_one_deal_per_iteration() {
        let root = KuhnNode::with_dealings(&[(Card::King, Card::Jack)]);
        let mut solver = solver(&root, CFRConfig::chance_sampling().with_seed(1));
        solver.run(1).unwrap();

        // Only the K-vs-J histories exist, so Q information sets are absent
        assert!(!solver.storage().contains(".Q."));
        let bet = solver.cumulative_strategy(".K.", &KuhnAction::Bet).unwrap();
        assert_eq!(bet, 0.5);
        // Inline update: J facing a bet already folds
        assert_eq!(solver.strategy(".J.BET", &KuhnAction::Fold), Some(1.0));
    }

    #[test]
    fn test_value_requires_equilibrium() {
        let root = KuhnNode::new();
        let solver = solver(&root, CFRConfig::vanilla());
        assert!(matches!(
            solver.value_of_game(),
            Err(SolverError::EquilibriumNotComputed)
        ));
    }

    #[test]
    fn test_value_before_iterations_is_uniform() {
        // Under uniform play a deal with showdown sign s is worth
        // 1/2 * (1/2 + s) + 1/2 * (s - 1/4) = 1/8 + s, and s averages to
        // zero over the six deals.
        let root = KuhnNode::new();
        let mut solver = solver(&root, CFRConfig::vanilla());
        solver.compute_equilibrium().unwrap();
        let value = solver.value_of_game().unwrap();
        assert!((value - 0.125).abs() < 1e-12, "value {}", value);
    }

    #[test]
    fn test_compute_equilibrium() {
        let root = KuhnNode::new();
        let mut solver = solver(&root, CFRConfig::vanilla());
        solver.run(100).unwrap();
        solver.compute_equilibrium().unwrap();

        let deal = KuhnAction::Deal(Card::King, Card::Queen);
        assert!((solver.equilibrium(".", &deal).unwrap() - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(solver.storage().equilibrium_row(".K.BET.FOLD"), None);

        for key in [".J.", ".Q.CHECK", ".K.CHECK.BET"] {
            let row = solver.storage().equilibrium_row(key).unwrap();
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert_eq!(row.to_vec(), solver.average_strategy(key).unwrap());
        }

        let value = solver.value_of_game().unwrap();
        solver.compute_equilibrium().unwrap();
        assert_eq!(solver.value_of_game().unwrap(), value);

        let export = solver.export_equilibrium();
        assert_eq!(export.strategies.len(), 13);
        assert!(export.strategies[".K.BET"].contains_key("CALL"));
    }

    #[test]
    fn test_exhaustive_converges() {
        let root = KuhnNode::new();
        let mut solver = solver(&root, CFRConfig::vanilla());
        solver.run(10_000).unwrap();
        solver.compute_equilibrium().unwrap();

        let value = solver.value_of_game().unwrap();
        assert!(
            (value - GAME_VALUE).abs() < 1e-2,
            "value {} should be near {}",
            value,
            GAME_VALUE
        );
    }
}
