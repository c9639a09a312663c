//! Integration tests for Kuhn Poker CFR convergence to Nash equilibrium.

use cfr_solver::cfr::{CFRConfig, CFRSolver};
use cfr_solver::games::kuhn::{KuhnAction, KuhnNode};

/// Closed-form value of Kuhn Poker for the first player with a 1-chip ante.
const GAME_VALUE: f64 = -1.0 / 18.0;

fn solve(root: &KuhnNode, config: CFRConfig, iterations: u64) -> CFRSolver<'_, KuhnNode> {
    let mut solver = CFRSolver::new(root, config).unwrap();
    solver.run(iterations).unwrap();
    solver.compute_equilibrium().unwrap();
    solver
}

fn eq(solver: &CFRSolver<'_, KuhnNode>, info_set: &str, action: KuhnAction) -> f64 {
    solver.equilibrium(info_set, &action).unwrap()
}

#[test]
fn exhaustive_cfr_reaches_game_value() {
    let root = KuhnNode::new();
    let solver = solve(&root, CFRConfig::vanilla(), 20_000);

    let value = solver.value_of_game().unwrap();
    assert!(
        (value - GAME_VALUE).abs() < 1e-2,
        "exhaustive CFR value {} should be near {}",
        value,
        GAME_VALUE
    );
}

#[test]
fn chance_sampling_cfr_reaches_game_value() {
    let root = KuhnNode::new();
    let solver = solve(&root, CFRConfig::chance_sampling().with_seed(42), 100_000);

    let value = solver.value_of_game().unwrap();
    assert!(
        (value - GAME_VALUE).abs() < 1e-2,
        "chance-sampling CFR value {} should be near {}",
        value,
        GAME_VALUE
    );
}

/// Known Nash equilibrium properties:
/// - With a King facing a bet, always call
/// - With a Jack facing a bet, always fold
/// - The first player never bets a Queen
/// - The second player calls a bet with a Queen 1/3 of the time
/// - The first player bets a King three times as often as a Jack
#[test]
fn exhaustive_cfr_strategy_properties() {
    let root = KuhnNode::new();
    let solver = solve(&root, CFRConfig::vanilla(), 20_000);

    let king_calls = eq(&solver, ".K.BET", KuhnAction::Call);
    assert!(king_calls > 0.95, "K facing bet calls {:.4}", king_calls);

    let king_calls_late = eq(&solver, ".K.CHECK.BET", KuhnAction::Call);
    assert!(king_calls_late > 0.95, "K after check-bet calls {:.4}", king_calls_late);

    let jack_folds = eq(&solver, ".J.BET", KuhnAction::Fold);
    assert!(jack_folds > 0.95, "J facing bet folds {:.4}", jack_folds);

    let jack_folds_late = eq(&solver, ".J.CHECK.BET", KuhnAction::Fold);
    assert!(jack_folds_late > 0.95, "J after check-bet folds {:.4}", jack_folds_late);

    let queen_checks = eq(&solver, ".Q.", KuhnAction::Check);
    assert!(queen_checks > 0.9, "Q checks {:.4}", queen_checks);

    let queen_calls = eq(&solver, ".Q.BET", KuhnAction::Call);
    assert!(
        (queen_calls - 1.0 / 3.0).abs() < 0.1,
        "Q facing bet calls {:.4}, expected ~1/3",
        queen_calls
    );

    let jack_bets = eq(&solver, ".J.", KuhnAction::Bet);
    let king_bets = eq(&solver, ".K.", KuhnAction::Bet);
    assert!(jack_bets < 0.4, "J bluffs {:.4}", jack_bets);
    assert!(
        (king_bets - 3.0 * jack_bets).abs() < 0.15,
        "K bets {:.4}, J bets {:.4}",
        king_bets,
        jack_bets
    );
}

#[test]
fn equilibrium_rows_are_distributions() {
    let root = KuhnNode::new();
    let solver = solve(&root, CFRConfig::chance_sampling().with_seed(3), 5_000);

    let export = solver.export_equilibrium();
    assert_eq!(export.strategies.len(), 13);
    for (info_set, row) in &export.strategies {
        let total: f64 = row.values().sum();
        assert!((total - 1.0).abs() < 1e-9, "{} sums to {}", info_set, total);
        assert!(row.values().all(|&p| p >= 0.0));
    }
}
