//! # CFR Solver
//!
//! Counterfactual Regret Minimization (CFR) for computing approximate Nash
//! equilibria of two-player zero-sum extensive-form games with imperfect
//! information.
//!
//! ## Features
//!
//! - **Generic CFR Engine**: Works with any tree implementing the `GameNode` trait
//! - **Two Variants**: Exhaustive (vanilla) CFR and chance-sampling CFR
//! - **Reproducible**: Chance sampling draws from an injectable, seedable RNG
//! - **Equilibrium Extraction**: Average strategy and the value of the game
//!
//! ## Quick Start
//!
//! ```
//! use cfr_solver::cfr::{CFRConfig, CFRSolver};
//! use cfr_solver::games::kuhn::KuhnNode;
//!
//! let root = KuhnNode::new();
//! let mut solver = CFRSolver::new(&root, CFRConfig::vanilla()).unwrap();
//! solver.run(1_000).unwrap();
//!
//! solver.compute_equilibrium().unwrap();
//! println!("value = {:.4}", solver.value_of_game().unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core CFR algorithm and solver
//! - [`games`]: Game trees (Kuhn Poker) for testing and validation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CFR Solver (Generic)                       │
//! │  - Regret accumulation    - Regret matching                     │
//! │  - Chance sampling        - Equilibrium / game value            │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ walks trees implementing GameNode
//!                               ▼
//!                        ┌─────────────┐
//!                        │ Kuhn Poker  │
//!                        │    tree     │
//!                        └─────────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// This is the core module containing the generic CFR algorithm.
pub mod cfr;

/// Game implementations module.
///
/// Contains game trees like Kuhn Poker for testing and validation.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{CFRConfig, CFRSolver, CFRStats, GameError, GameNode, Player, SolverError};
