//! Game implementations for the CFR solver.
//!
//! Games here build explicit trees whose nodes implement
//! [`GameNode`](crate::cfr::GameNode). They serve as:
//!
//! 1. **Validation**: Games with known Nash equilibria (like Kuhn Poker) verify
//!    that the CFR implementation is correct.
//!
//! 2. **Examples**: Demonstrate how to implement the `GameNode` trait.
//!
//! 3. **Benchmarks**: Provide standardized games for performance testing.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker - A simplified 3-card poker game with known Nash equilibrium

pub mod kuhn;
