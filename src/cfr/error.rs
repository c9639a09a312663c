//! Error types for the game-tree contract and the solver.

use thiserror::Error;

use crate::cfr::config::ConfigError;
use crate::cfr::storage::NodeKind;

/// Violations of the game-tree contract.
///
/// These signal programmer errors (asking a node for something it cannot
/// provide), never transient conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The action is not in the node's legal action list.
    #[error("action {action} is not legal at information set {info_set:?}")]
    IllegalAction {
        /// Display form of the rejected action.
        action: String,
        /// Information set of the node the action was played at.
        info_set: String,
    },

    /// A payoff was requested from a node that is not terminal.
    #[error("cannot evaluate non-terminal node at information set {0:?}")]
    NotTerminal(String),

    /// A chance-only operation was requested from a non-chance node.
    #[error("node at information set {0:?} is not a chance node")]
    NotChance(String),
}

/// Errors raised by the CFR solver.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The game tree broke its contract.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The solver configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `run` was asked for zero iterations.
    #[error("iteration count must be positive")]
    NoIterations,

    /// No node registered this information set.
    #[error("unknown information set {0:?}")]
    UnknownInfoSet(String),

    /// Two histories in one information set expose different action lists.
    ///
    /// Order matters: rows are aligned with the first registered list.
    #[error("information set {info_set:?} has actions {expected}, found a node with {found}")]
    ActionMismatch {
        /// The offending information set.
        info_set: String,
        /// Actions recorded at first registration.
        expected: String,
        /// Actions of the conflicting node.
        found: String,
    },

    /// Two histories in one information set are different kinds of node.
    #[error("information set {info_set:?} is a {expected:?} set, found a {found:?} node")]
    KindMismatch {
        /// The offending information set.
        info_set: String,
        /// Kind recorded at first registration.
        expected: NodeKind,
        /// Kind of the conflicting node.
        found: NodeKind,
    },

    /// The equilibrium map was read before `compute_equilibrium` ran.
    #[error("equilibrium has not been computed")]
    EquilibriumNotComputed,
}
