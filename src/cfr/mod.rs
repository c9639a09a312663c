//! CFR (Counterfactual Regret Minimization) Solver Module.
//!
//! This module provides a CFR engine for computing approximate Nash
//! equilibria of two-player zero-sum extensive-form games with imperfect
//! information.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies by regret matching
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! # Supported Variants
//!
//! - **Vanilla CFR**: Full tree traversal, exact expectation at chance nodes
//! - **Chance-sampling CFR**: One sampled outcome per chance node per iteration
//!
//! # Usage
//!
//! 1. Build a game tree whose nodes implement the `GameNode` trait
//! 2. Create a `CFRSolver` over its root with a `CFRConfig`
//! 3. Call `run()` to perform iterations
//! 4. Call `compute_equilibrium()`, then read `value_of_game()` or the
//!    per-information-set equilibrium
//!
//! # Example
//!
//! ```ignore
//! use cfr_solver::cfr::{CFRConfig, CFRSolver};
//!
//! let root = MyGame::build_tree();
//! let mut solver = CFRSolver::new(&root, CFRConfig::vanilla())?;
//!
//! let stats = solver.run(10_000)?;
//! println!("Trained {} info sets in {:.2}s", stats.info_sets, stats.elapsed_seconds);
//!
//! solver.compute_equilibrium()?;
//! println!("Value: {:.4}", solver.value_of_game()?);
//! ```
//!
//! # Theory
//!
//! **Counterfactual regret**: the gain from always taking action `a` at an
//! information set, weighted by the opponent's reach probability.
//! ```text
//! Regret(I, a) += Reach_opponent * (Value(I, a) - Value(I))
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! **Convergence**: The own-reach-weighted average strategy converges to a
//! Nash equilibrium.
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Lanctot, M., et al. "Monte Carlo Sampling for Regret Minimization in Extensive Games" (2009)

pub mod config;
pub mod error;
pub mod game;
pub mod solver;
pub mod storage;

// Re-export main types for convenient access
pub use config::{CFRConfig, CFRStats, ConfigError};
pub use error::{GameError, SolverError};
pub use game::{Action, GameNode, Player};
pub use solver::CFRSolver;
pub use storage::{regret_match, EquilibriumExport, NodeKind, RegretStorage};
