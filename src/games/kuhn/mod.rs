//! Kuhn Poker game tree for CFR validation.
//!
//! Kuhn Poker is a simplified poker game used to validate CFR implementations
//! because it has a known, mathematically proven Nash equilibrium.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack, Queen, King
//! - 2 players, each antes 1 chip
//! - Chance deals one card to each player (6 equally likely dealings)
//! - Player A acts first: Bet or Check
//! - Player B responds; after Check-Bet, player A calls or folds
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! Chance (deal)
//! └── A
//!     ├── Bet
//!     │   └── B
//!     │       ├── Fold → A wins 1
//!     │       └── Call → Showdown for 2
//!     └── Check
//!         └── B
//!             ├── Bet
//!             │   └── A
//!             │       ├── Call → Showdown for 2
//!             │       └── Fold → B wins 1
//!             └── Check → Showdown for 1
//! ```
//!
//! ## Information Sets
//!
//! Keys read `.<own card>.<action history joined by dots>`; the chance root
//! is `.`. Dealing King to A and Queen to B gives `.K.` at A's first
//! decision and `.Q.BET` for B after A bets.
//!
//! ## Known Nash Equilibrium
//!
//! - **A with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **A with Queen**: Always Check
//! - **A with King**: Bet with probability 3α
//! - **B facing Bet with Jack**: Always Fold
//! - **B facing Bet with Queen**: Call with probability 1/3
//! - **B facing Bet with King**: Always Call
//!
//! **Expected Value**: A's EV = -1/18 ≈ -0.0556

use std::fmt;

use rand::Rng;

use crate::cfr::error::GameError;
use crate::cfr::game::{GameNode, Player};

/// The three cards of the deck, ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Card {
    /// Lowest card.
    Jack,
    /// Middle card.
    Queen,
    /// Highest card.
    King,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Jack => write!(f, "J"),
            Card::Queen => write!(f, "Q"),
            Card::King => write!(f, "K"),
        }
    }
}

/// Actions in Kuhn Poker, including chance's dealings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Chance deals the first card to A and the second to B.
    Deal(Card, Card),
    /// Pass without betting.
    Check,
    /// Put one chip in.
    Bet,
    /// Match a bet.
    Call,
    /// Give up facing a bet.
    Fold,
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Deal(a, b) => write!(f, "{}{}", a, b),
            KuhnAction::Check => write!(f, "CHECK"),
            KuhnAction::Bet => write!(f, "BET"),
            KuhnAction::Call => write!(f, "CALL"),
            KuhnAction::Fold => write!(f, "FOLD"),
        }
    }
}

/// Every ordered dealing of two distinct cards.
pub const DEALINGS: [(Card, Card); 6] = [
    (Card::King, Card::Queen),
    (Card::King, Card::Jack),
    (Card::Queen, Card::King),
    (Card::Queen, Card::Jack),
    (Card::Jack, Card::King),
    (Card::Jack, Card::Queen),
];

/// A node of the Kuhn Poker tree.
///
/// The whole tree is built eagerly by [`KuhnNode::new`]; children are owned
/// and aligned with `actions`.
#[derive(Debug, Clone)]
pub struct KuhnNode {
    to_move: Player,
    cards: Option<(Card, Card)>,
    history: Vec<KuhnAction>,
    actions: Vec<KuhnAction>,
    children: Vec<KuhnNode>,
    info_set: String,
}

impl Default for KuhnNode {
    fn default() -> Self {
        Self::new()
    }
}

impl KuhnNode {
    /// Build the full tree rooted at the dealing chance node.
    pub fn new() -> Self {
        Self::with_dealings(&DEALINGS)
    }

    /// Build a tree whose chance root deals only `dealings`, uniformly.
    pub fn with_dealings(dealings: &[(Card, Card)]) -> Self {
        let actions = dealings
            .iter()
            .map(|&(a, b)| KuhnAction::Deal(a, b))
            .collect();
        let children = dealings
            .iter()
            .map(|&cards| {
                Self::decision(
                    Player::A,
                    Vec::new(),
                    cards,
                    vec![KuhnAction::Bet, KuhnAction::Check],
                )
            })
            .collect();

        Self {
            to_move: Player::Chance,
            cards: None,
            history: Vec::new(),
            actions,
            children,
            info_set: ".".to_string(),
        }
    }

    fn decision(
        to_move: Player,
        history: Vec<KuhnAction>,
        cards: (Card, Card),
        actions: Vec<KuhnAction>,
    ) -> Self {
        let children = actions
            .iter()
            .map(|&action| {
                let mut next = history.clone();
                next.push(action);
                let next_actions = Self::next_actions(&history, action);
                Self::decision(to_move.opponent(), next, cards, next_actions)
            })
            .collect();

        let own_card = match to_move {
            Player::A => cards.0,
            _ => cards.1,
        };
        let public: Vec<String> = history.iter().map(ToString::to_string).collect();
        let info_set = format!(".{}.{}", own_card, public.join("."));

        Self {
            to_move,
            cards: Some(cards),
            history,
            actions,
            children,
            info_set,
        }
    }

    /// Legal actions after `action` is played on top of `history`.
    fn next_actions(history: &[KuhnAction], action: KuhnAction) -> Vec<KuhnAction> {
        match (history.last(), action) {
            (None, KuhnAction::Bet) => vec![KuhnAction::Fold, KuhnAction::Call],
            (None, KuhnAction::Check) => vec![KuhnAction::Bet, KuhnAction::Check],
            (Some(KuhnAction::Check), KuhnAction::Bet) => vec![KuhnAction::Call, KuhnAction::Fold],
            _ => Vec::new(),
        }
    }

    /// Children in action order.
    pub fn children(&self) -> &[KuhnNode] {
        &self.children
    }

    /// Cards of A and B, `None` at the chance root.
    pub fn cards(&self) -> Option<(Card, Card)> {
        self.cards
    }

    /// Public betting history.
    pub fn history(&self) -> &[KuhnAction] {
        &self.history
    }

    /// +1 if A holds the higher card, -1 otherwise.
    fn showdown(&self) -> Result<f64, GameError> {
        let (a, b) = self
            .cards
            .ok_or_else(|| GameError::NotTerminal(self.info_set.clone()))?;
        Ok(if a > b { 1.0 } else { -1.0 })
    }

    fn ensure_chance(&self) -> Result<(), GameError> {
        if self.is_chance() {
            Ok(())
        } else {
            Err(GameError::NotChance(self.info_set.clone()))
        }
    }

    fn illegal(&self, action: &KuhnAction) -> GameError {
        GameError::IllegalAction {
            action: action.to_string(),
            info_set: self.info_set.clone(),
        }
    }
}

impl GameNode for KuhnNode {
    type Action = KuhnAction;

    fn actions(&self) -> &[KuhnAction] {
        &self.actions
    }

    fn play(&self, action: &KuhnAction) -> Result<&Self, GameError> {
        self.actions
            .iter()
            .position(|a| a == action)
            .map(|i| &self.children[i])
            .ok_or_else(|| self.illegal(action))
    }

    fn information_set(&self) -> &str {
        &self.info_set
    }

    fn acting_player(&self) -> Player {
        self.to_move
    }

    fn evaluation(&self) -> Result<f64, GameError> {
        if !self.is_terminal() {
            return Err(GameError::NotTerminal(self.info_set.clone()));
        }

        match self.history.as_slice() {
            // Only the antes change hands
            [.., KuhnAction::Check, KuhnAction::Check] => self.showdown(),
            [.., KuhnAction::Bet, KuhnAction::Call] => Ok(2.0 * self.showdown()?),
            // The player left to move is the bettor
            [.., KuhnAction::Bet, KuhnAction::Fold] => Ok(self.to_move.sign()),
            _ => Err(GameError::NotTerminal(self.info_set.clone())),
        }
    }

    fn chance_probability(&self, action: &KuhnAction) -> Result<f64, GameError> {
        self.ensure_chance()?;
        if !self.actions.contains(action) {
            return Err(self.illegal(action));
        }
        Ok(1.0 / self.actions.len() as f64)
    }

    fn sample_one_child<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Self, GameError> {
        self.ensure_chance()?;
        let i = rng.gen_range(0..self.children.len());
        Ok(&self.children[i])
    }
}
