//! Storage for CFR strategies, regrets and strategy sums.
//!
//! Every information set of the tree is registered up front by one walk
//! over the tree. Each entry keeps its ordered action list and one dense row
//! per quantity, indexed by action position.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::error::{GameError, SolverError};
use crate::cfr::game::{Action, GameNode};

/// What kind of node registered an information set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A player chooses an action.
    Decision,
    /// Nature chooses an outcome.
    Chance,
    /// The game is over.
    Terminal,
}

impl NodeKind {
    /// Classify a node of a game tree.
    pub fn of<N: GameNode>(node: &N) -> Self {
        if node.is_terminal() {
            NodeKind::Terminal
        } else if node.is_chance() {
            NodeKind::Chance
        } else {
            NodeKind::Decision
        }
    }
}

/// Per-information-set rows, all aligned with `actions`.
#[derive(Debug, Clone)]
pub(crate) struct InfoSetSlots<A> {
    pub(crate) kind: NodeKind,
    pub(crate) actions: Vec<A>,
    /// Current strategy (sigma).
    pub(crate) strategy: Vec<f64>,
    /// Cumulative counterfactual regret.
    pub(crate) regrets: Vec<f64>,
    /// Cumulative reach-weighted strategy.
    pub(crate) strategy_sums: Vec<f64>,
}

impl<A: Action> InfoSetSlots<A> {
    fn new(kind: NodeKind, actions: &[A]) -> Self {
        let n = actions.len();
        Self {
            kind,
            actions: actions.to_vec(),
            strategy: vec![1.0 / n as f64; n],
            regrets: vec![0.0; n],
            strategy_sums: vec![0.0; n],
        }
    }

    fn position(&self, action: &A) -> Option<usize> {
        self.actions.iter().position(|a| a == action)
    }

    /// Recompute the current strategy from cumulative regret.
    pub(crate) fn regret_match(&mut self) {
        regret_match(&self.regrets, &mut self.strategy);
    }
}

/// Regret matching: writes into `out` the strategy proportional to positive
/// regret, or the uniform strategy when no regret is positive.
///
/// `out` must have the same length as `regrets`.
pub fn regret_match(regrets: &[f64], out: &mut [f64]) {
    debug_assert_eq!(regrets.len(), out.len());
    let positive_sum: f64 = regrets.iter().map(|&r| r.max(0.0)).sum();

    if positive_sum > 0.0 {
        for (p, &r) in out.iter_mut().zip(regrets) {
            *p = r.max(0.0) / positive_sum;
        }
    } else {
        let uniform = 1.0 / regrets.len() as f64;
        out.fill(uniform);
    }
}

/// Display form of an action list, e.g. `[BET, CHECK]`.
fn labels<A: Action>(actions: &[A]) -> String {
    let names: Vec<String> = actions.iter().map(ToString::to_string).collect();
    format!("[{}]", names.join(", "))
}

/// Normalize strategy sums into a probability distribution (uniform if the
/// sums are all zero).
fn normalize(sums: &[f64]) -> Vec<f64> {
    let total: f64 = sums.iter().sum();
    if total > 0.0 {
        sums.iter().map(|&x| x / total).collect()
    } else {
        vec![1.0 / sums.len() as f64; sums.len()]
    }
}

/// Strategy, regret and equilibrium tables keyed by information set.
///
/// This struct manages the core data structures used by CFR:
/// - **Strategy**: current regret-matched strategy for each action
/// - **Regrets**: cumulative counterfactual regret for each action
/// - **Strategy sums**: cumulative reach-weighted strategy, averaged into
///   the equilibrium
/// - **Equilibrium**: average strategy, rebuilt on demand by the solver
///
/// Accumulation is addition only; nothing is reset while the storage lives.
#[derive(Debug, Clone)]
pub struct RegretStorage<A> {
    slots: FxHashMap<String, InfoSetSlots<A>>,
    equilibrium: FxHashMap<String, Vec<f64>>,
    equilibrium_computed: bool,
}

impl<A: Action> Default for RegretStorage<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> RegretStorage<A> {
    /// Create new empty storage.
    pub fn new() -> Self {
        Self {
            slots: FxHashMap::default(),
            equilibrium: FxHashMap::default(),
            equilibrium_computed: false,
        }
    }

    /// Build storage for every information set reachable from `root`.
    ///
    /// Current strategies start uniform; regrets and strategy sums start at
    /// zero.
    pub fn build<N: GameNode<Action = A>>(root: &N) -> Result<Self, SolverError> {
        let mut storage = Self::new();
        storage.register_tree(root)?;
        Ok(storage)
    }

    fn register_tree<N: GameNode<Action = A>>(&mut self, node: &N) -> Result<(), SolverError> {
        self.register(node.information_set(), NodeKind::of(node), node.actions())?;
        for action in node.actions() {
            self.register_tree(node.play(action)?)?;
        }
        Ok(())
    }

    /// Register an information set.
    ///
    /// Registering an existing key again is a no-op as long as the kind and
    /// the ordered action list agree.
    pub fn register(
        &mut self,
        info_set: &str,
        kind: NodeKind,
        actions: &[A],
    ) -> Result<(), SolverError> {
        let Some(existing) = self.slots.get(info_set) else {
            self.slots
                .insert(info_set.to_string(), InfoSetSlots::new(kind, actions));
            return Ok(());
        };

        if existing.kind != kind {
            return Err(SolverError::KindMismatch {
                info_set: info_set.to_string(),
                expected: existing.kind,
                found: kind,
            });
        }
        if existing.actions != actions {
            return Err(SolverError::ActionMismatch {
                info_set: info_set.to_string(),
                expected: labels(&existing.actions),
                found: labels(actions),
            });
        }
        Ok(())
    }

    pub(crate) fn slots(&self, info_set: &str) -> Result<&InfoSetSlots<A>, SolverError> {
        self.slots
            .get(info_set)
            .ok_or_else(|| SolverError::UnknownInfoSet(info_set.to_string()))
    }

    pub(crate) fn slots_mut(&mut self, info_set: &str) -> Result<&mut InfoSetSlots<A>, SolverError> {
        self.slots
            .get_mut(info_set)
            .ok_or_else(|| SolverError::UnknownInfoSet(info_set.to_string()))
    }

    fn locate(&self, info_set: &str, action: &A) -> Option<(&InfoSetSlots<A>, usize)> {
        let slots = self.slots.get(info_set)?;
        let i = slots.position(action)?;
        Some((slots, i))
    }

    fn locate_mut(
        &mut self,
        info_set: &str,
        action: &A,
    ) -> Result<(&mut InfoSetSlots<A>, usize), SolverError> {
        let slots = self.slots_mut(info_set)?;
        let i = slots.position(action).ok_or_else(|| GameError::IllegalAction {
            action: action.to_string(),
            info_set: info_set.to_string(),
        })?;
        Ok((slots, i))
    }

    /// Current strategy probability of `action` at `info_set`.
    pub fn strategy(&self, info_set: &str, action: &A) -> Option<f64> {
        self.locate(info_set, action).map(|(s, i)| s.strategy[i])
    }

    /// Cumulative regret of `action` at `info_set`.
    pub fn cumulative_regret(&self, info_set: &str, action: &A) -> Option<f64> {
        self.locate(info_set, action).map(|(s, i)| s.regrets[i])
    }

    /// Cumulative strategy weight of `action` at `info_set`.
    pub fn cumulative_strategy(&self, info_set: &str, action: &A) -> Option<f64> {
        self.locate(info_set, action).map(|(s, i)| s.strategy_sums[i])
    }

    /// Equilibrium probability of `action` at `info_set`.
    ///
    /// `None` until the solver has computed the equilibrium.
    pub fn equilibrium(&self, info_set: &str, action: &A) -> Option<f64> {
        let (_, i) = self.locate(info_set, action)?;
        self.equilibrium.get(info_set).map(|row| row[i])
    }

    /// Ordered actions of an information set.
    pub fn actions(&self, info_set: &str) -> Option<&[A]> {
        self.slots.get(info_set).map(|s| s.actions.as_slice())
    }

    /// The node kind that registered an information set.
    pub fn kind(&self, info_set: &str) -> Option<NodeKind> {
        self.slots.get(info_set).map(|s| s.kind)
    }

    /// Current strategy row, aligned with [`RegretStorage::actions`].
    pub fn strategy_row(&self, info_set: &str) -> Option<&[f64]> {
        self.slots.get(info_set).map(|s| s.strategy.as_slice())
    }

    /// Cumulative regret row.
    pub fn regret_row(&self, info_set: &str) -> Option<&[f64]> {
        self.slots.get(info_set).map(|s| s.regrets.as_slice())
    }

    /// Cumulative strategy row.
    pub fn strategy_sum_row(&self, info_set: &str) -> Option<&[f64]> {
        self.slots.get(info_set).map(|s| s.strategy_sums.as_slice())
    }

    /// Equilibrium row, if computed.
    pub fn equilibrium_row(&self, info_set: &str) -> Option<&[f64]> {
        self.equilibrium.get(info_set).map(Vec::as_slice)
    }

    /// Add `regret` to the cumulative regret of `action` at `info_set`.
    pub fn accumulate_regret(
        &mut self,
        info_set: &str,
        action: &A,
        regret: f64,
    ) -> Result<(), SolverError> {
        let (slots, i) = self.locate_mut(info_set, action)?;
        slots.regrets[i] += regret;
        Ok(())
    }

    /// Add `weight` to the cumulative strategy of `action` at `info_set`.
    pub fn accumulate_strategy(
        &mut self,
        info_set: &str,
        action: &A,
        weight: f64,
    ) -> Result<(), SolverError> {
        let (slots, i) = self.locate_mut(info_set, action)?;
        slots.strategy_sums[i] += weight;
        Ok(())
    }

    /// Recompute the current strategy of one information set by regret
    /// matching.
    pub fn regret_match(&mut self, info_set: &str) -> Result<(), SolverError> {
        self.slots_mut(info_set)?.regret_match();
        Ok(())
    }

    /// Apply regret matching to every decision information set.
    pub fn update_strategies(&mut self) {
        for slots in self.slots.values_mut() {
            if slots.kind == NodeKind::Decision {
                slots.regret_match();
            }
        }
    }

    /// Average strategy of one information set, computed from strategy sums.
    ///
    /// Uniform if nothing has been accumulated yet.
    pub fn average_strategy(&self, info_set: &str) -> Option<Vec<f64>> {
        self.slots.get(info_set).map(|s| normalize(&s.strategy_sums))
    }

    pub(crate) fn set_equilibrium(&mut self, info_set: &str, probabilities: Vec<f64>) {
        self.equilibrium.insert(info_set.to_string(), probabilities);
    }

    pub(crate) fn mark_equilibrium_computed(&mut self) {
        self.equilibrium_computed = true;
    }

    /// Whether the equilibrium map has been populated at least once.
    pub fn equilibrium_computed(&self) -> bool {
        self.equilibrium_computed
    }

    /// Get the number of information sets stored, of every kind.
    pub fn num_info_sets(&self) -> usize {
        self.slots.len()
    }

    /// Get the number of decision information sets.
    pub fn num_decision_info_sets(&self) -> usize {
        self.slots
            .values()
            .filter(|s| s.kind == NodeKind::Decision)
            .count()
    }

    /// Iterate over all information set keys.
    pub fn info_sets(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Check if an info set exists in storage.
    pub fn contains(&self, info_set: &str) -> bool {
        self.slots.contains_key(info_set)
    }

    /// Get total memory usage estimate in bytes.
    pub fn memory_usage(&self) -> usize {
        let rows: usize = self
            .slots
            .iter()
            .map(|(k, s)| {
                k.len()
                    + s.actions.len() * std::mem::size_of::<A>()
                    + 3 * s.strategy.len() * std::mem::size_of::<f64>()
            })
            .sum();

        let equilibrium: usize = self
            .equilibrium
            .iter()
            .map(|(k, v)| k.len() + v.len() * std::mem::size_of::<f64>())
            .sum();

        rows + equilibrium
    }

    /// Export the equilibrium with actions labelled by their display names.
    pub fn export_equilibrium(&self) -> EquilibriumExport {
        let strategies = self
            .equilibrium
            .iter()
            .filter_map(|(key, row)| {
                let slots = self.slots.get(key)?;
                let labelled = slots
                    .actions
                    .iter()
                    .zip(row)
                    .map(|(a, &p)| (a.to_string(), p))
                    .collect();
                Some((key.clone(), labelled))
            })
            .collect();

        EquilibriumExport { strategies }
    }
}

/// Serializable equilibrium: info set -> action name -> probability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumExport {
    /// Probabilities per information set, ordered by key.
    pub strategies: BTreeMap<String, BTreeMap<String, f64>>,
}
