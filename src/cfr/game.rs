//! Game-tree contract for the CFR solver.
//!
//! Any game whose tree implements [`GameNode`] can be solved. The tree is
//! built once, owned root to leaves, and only ever read by the solver.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use rand::Rng;

use crate::cfr::error::GameError;

/// Trait for actions that can be taken in a game.
///
/// Actions must be cloneable, comparable, and hashable. The `Display` form
/// is used in error messages and strategy exports.
pub trait Action: Clone + Eq + Hash + Debug + Display {}

impl<T: Clone + Eq + Hash + Debug + Display> Action for T {}

/// Who moves at a node.
///
/// Payoffs are always expressed from the point of view of [`Player::A`];
/// [`Player::B`] receives the negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    /// The reference player.
    A,
    /// The opponent of the reference player.
    B,
    /// Nature.
    Chance,
}

impl Player {
    /// Sign that converts a payoff to A into a payoff to this player.
    ///
    /// `+1` for A, `-1` for B and `0` for chance.
    pub fn sign(self) -> f64 {
        match self {
            Player::A => 1.0,
            Player::B => -1.0,
            Player::Chance => 0.0,
        }
    }

    /// The other decision-maker. Chance has no opponent and maps to itself.
    pub fn opponent(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
            Player::Chance => Player::Chance,
        }
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => write!(f, "A"),
            Player::B => write!(f, "B"),
            Player::Chance => write!(f, "Chance"),
        }
    }
}

/// One history in a game tree: a decision, chance, or terminal node.
///
/// Implementations own their children. Every method is a pure read; the
/// solver never mutates the tree.
///
/// # Example
/// ```ignore
/// impl GameNode for MyNode {
///     type Action = MyAction;
///
///     fn actions(&self) -> &[MyAction] { &self.actions }
///     fn play(&self, action: &MyAction) -> Result<&Self, GameError> { /* ... */ }
///     // ...
/// }
/// ```
pub trait GameNode: Sized {
    /// The type of the actions labelling the edges out of a node.
    type Action: Action;

    /// Whether the game is over at this node.
    ///
    /// Terminal nodes are exactly the nodes without legal actions.
    fn is_terminal(&self) -> bool {
        self.actions().is_empty()
    }

    /// Whether nature moves at this node.
    fn is_chance(&self) -> bool {
        !self.is_terminal() && self.acting_player() == Player::Chance
    }

    /// Legal actions in a fixed order. Empty iff the node is terminal.
    ///
    /// Every node of an information set must return the same list in the
    /// same order; the solver pairs actions with its rows by position and
    /// rejects a tree that breaks this.
    fn actions(&self) -> &[Self::Action];

    /// The child reached by `action`.
    ///
    /// # Errors
    /// [`GameError::IllegalAction`] if `action` is not legal here.
    fn play(&self, action: &Self::Action) -> Result<&Self, GameError>;

    /// Key of the information set this node belongs to.
    ///
    /// Two nodes share a key iff they are indistinguishable to the player
    /// about to act. The key must not encode hidden information.
    fn information_set(&self) -> &str;

    /// The player to move.
    fn acting_player(&self) -> Player;

    /// Payoff to [`Player::A`] at a terminal node.
    ///
    /// # Errors
    /// [`GameError::NotTerminal`] on a non-terminal node.
    fn evaluation(&self) -> Result<f64, GameError>;

    /// Probability that chance selects `action` at this node.
    ///
    /// # Errors
    /// [`GameError::NotChance`] on a non-chance node,
    /// [`GameError::IllegalAction`] if `action` is not one of its outcomes.
    fn chance_probability(&self, action: &Self::Action) -> Result<f64, GameError>;

    /// Draw one child according to the chance distribution.
    ///
    /// # Errors
    /// [`GameError::NotChance`] on a non-chance node.
    fn sample_one_child<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Self, GameError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_sign_flips_perspective() {
        assert_eq!(Player::A.sign(), 1.0);
        assert_eq!(Player::B.sign(), -1.0);
        assert_eq!(Player::Chance.sign(), 0.0);
        assert_eq!(Player::A.sign(), -Player::A.opponent().sign());
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::A.opponent(), Player::B);
        assert_eq!(Player::B.opponent(), Player::A);
        assert_eq!(Player::Chance.opponent(), Player::Chance);
        assert_eq!(Player::B.to_string(), "B");
    }
}
