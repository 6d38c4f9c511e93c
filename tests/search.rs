use duelist::combat::core::{Charges, Move, DEFAULT_MOVE};
use duelist::combat::state::{CombatState, ROUND_HORIZON};
use duelist::evaluation::estimate_win_rate;
use duelist::search::{find_best_move, play_out, search, Config, Decision};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Rock deals 15 against an enemy with 4 health and 2 shield.
fn rock_scenario() -> CombatState {
    CombatState::try_from("12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333 1").unwrap()
}

#[test]
fn rock_scenario_any_budget() {
    for iterations in 1..=32 {
        for seed in 0..4 {
            let config = Config::default()
                .with_iterations(iterations)
                .with_seed(seed);
            assert_eq!(
                find_best_move(&rock_scenario(), &config),
                Move::Rock,
                "{iterations} iterations, seed {seed}"
            );
        }
    }
}

#[test]
fn zero_exploration_tries_every_root_move() {
    let config = Config::default()
        .with_iterations(3)
        .with_exploration(0.0)
        .with_seed(9);
    let result = search(&rock_scenario(), &config, &mut config.rng());
    assert_eq!(result.candidates.len(), 3);
    assert!(result
        .candidates
        .iter()
        .all(|candidate| candidate.visits == 1));
}

#[test]
fn rollout_greed_extremes() {
    for greed in [0.0, 1.0] {
        let config = Config::default()
            .with_iterations(300)
            .with_rollout_greed(greed)
            .with_seed(11);
        let result = search(&rock_scenario(), &config, &mut config.rng());
        assert_eq!(
            result
                .candidates
                .iter()
                .map(|candidate| candidate.visits)
                .sum::<u32>(),
            300
        );
        if greed > 0.5 {
            assert_eq!(result.best_move, Move::Rock);
        }
    }
}

#[test]
fn lethal_move_is_short_circuited() {
    let config = Config::default().with_iterations(2000).with_seed(5);
    let result = search(&rock_scenario(), &config, &mut config.rng());
    assert_eq!(result.best_move, Move::Rock);
    assert_eq!(result.decision, Decision::Lethal);
    assert_eq!(result.iterations, 2000);
    assert_eq!(result.candidates.len(), 3);
    // Lethal move is expanded first.
    assert_eq!(result.candidates[0].player_move, Move::Rock);
    let visits: u32 = result
        .candidates
        .iter()
        .map(|candidate| candidate.visits)
        .sum();
    assert_eq!(visits, 2000);
    assert!(result.nodes > 3);
}

#[test]
fn last_charge_is_not_lethal_enough() {
    let mut state = rock_scenario();
    state.player.charges = Charges::new(1, 3, 3);
    let config = Config::default().with_iterations(500).with_seed(6);
    let result = search(&state, &config, &mut config.rng());
    assert_ne!(result.decision, Decision::Lethal);
}

#[test]
fn exhausted_charges_fall_back_to_default_move() {
    let mut state = rock_scenario();
    state.player.charges = Charges::new(0, 0, 0);
    let config = Config::default().with_iterations(100).with_seed(7);
    let result = search(&state, &config, &mut config.rng());
    assert_eq!(result.best_move, DEFAULT_MOVE);
    assert_eq!(result.decision, Decision::Default);
    assert!(result.candidates.is_empty());
}

#[test]
fn terminal_root() {
    let mut state = rock_scenario();
    state.enemy.health = 0;
    let config = Config::default().with_iterations(50).with_seed(8);
    let result = search(&state, &config, &mut config.rng());
    assert_eq!(result.nodes, 1);
    assert_eq!(result.best_move, DEFAULT_MOVE);
}

#[test]
fn search_picks_legal_move() {
    let state = CombatState::try_from(
        "7/30 0/8 6:2,3:6,4:3 202 25/30 4/8 7:1,2:5,5:3 123 9",
    )
    .unwrap();
    let config = Config::default().with_iterations(3000).with_seed(9);
    let m = find_best_move(&state, &config);
    assert!(state.player.charges.legal_moves().contains(&m), "{m}");
    assert_ne!(m, Move::Paper);
}

#[test]
fn playouts_respect_horizon() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    // Nobody deals damage: every combat runs into the horizon.
    let state = CombatState::try_from("5/5 0/0 0:1,0:1,0:1 333 5/5 0/0 0:1,0:1,0:1 333").unwrap();
    for _ in 0..32 {
        let end = play_out(&state, 0.8, &mut rng);
        assert_eq!(end.round, ROUND_HORIZON);
        assert!(end.reward().abs() < f32::EPSILON);
    }
}

#[test]
fn win_rate_estimate() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let easy = estimate_win_rate(&rock_scenario(), 500, &mut rng);
    assert!(easy.value() > 0.9, "{easy}");

    let hopeless = CombatState::try_from("1/30 0/0 1:0,1:0,1:0 333 30/30 0/0 9:0,9:0,9:0 333")
        .unwrap();
    let hopeless = estimate_win_rate(&hopeless, 500, &mut rng);
    assert!(hopeless.value() < 0.1, "{hopeless}");
}
