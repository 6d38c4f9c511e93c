//! Playouts: the combat is played to the end with a cheap, biased-random
//! policy and the final state tells how good the starting state was.

use log::warn;
use rand::Rng;

use crate::combat::state::CombatState;
use crate::search::policy;

/// Share of player moves chosen by the heuristic policy in a playout, the
/// rest are exploratory.
pub const DEFAULT_ROLLOUT_GREED: f64 = 0.8;

/// Plays the combat from `state` until it is over and returns the terminal
/// state.
///
/// With probability `greed` the player follows the heuristic policy,
/// otherwise it plays a random safe move. The enemy always plays a uniformly
/// random legal move. A side without legal moves plays
/// [`crate::combat::core::DEFAULT_MOVE`].
///
/// The number of rounds is bounded by [`crate::combat::state::ROUND_HORIZON`].
pub fn play_out<R: Rng + ?Sized>(state: &CombatState, greed: f64, rng: &mut R) -> CombatState {
    let greed = if (0.0..=1.0).contains(&greed) {
        greed
    } else {
        warn!("rollout greed {greed} is outside of [0, 1], using {DEFAULT_ROLLOUT_GREED}");
        DEFAULT_ROLLOUT_GREED
    };

    let mut current = *state;
    while !current.is_terminal() {
        let legal = current.player.charges.legal_moves();
        let player_move = if rng.gen_bool(greed) {
            policy::heuristic_move(&current, &legal, rng)
        } else {
            policy::exploratory_move(&current, &legal, rng)
        };
        let enemy_move = policy::random_move(&current.enemy.charges.legal_moves(), rng);
        current = current.apply_round(player_move, enemy_move);
    }
    current
}

/// Estimates `state` with a single playout: 1 if the player wins, 0
/// otherwise.
///
/// This is the primitive that other decision makers (e.g. choosing between
/// loot options) build on: it does not need a search tree.
///
/// ```
/// use duelist::combat::state::CombatState;
/// use duelist::search::simulate;
/// use rand::SeedableRng;
///
/// let state =
///     CombatState::try_from("12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333").unwrap();
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
/// let reward = simulate(&state, &mut rng);
/// assert!(reward == 0.0 || reward == 1.0);
/// ```
pub fn simulate<R: Rng + ?Sized>(state: &CombatState, rng: &mut R) -> f32 {
    play_out(state, DEFAULT_ROLLOUT_GREED, rng).reward()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::combat::core::Charges;
    use crate::combat::state::ROUND_HORIZON;

    fn scenario() -> CombatState {
        CombatState::try_from("12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333").unwrap()
    }

    #[test]
    fn playouts_terminate() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for greed in [0.0, 0.5, 1.0, f64::NAN, 2.0] {
            for _ in 0..64 {
                let end = play_out(&scenario(), greed, &mut rng);
                assert!(end.is_terminal());
                assert!(end.round <= ROUND_HORIZON);
                assert!(end.result().is_some());
            }
        }
    }

    #[test]
    fn terminal_state_is_returned_as_is() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut state = scenario();
        state.enemy.health = 0;
        assert_eq!(play_out(&state, 1.0, &mut rng), state);
        assert!((simulate(&state, &mut rng) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn exhausted_charges_still_terminate() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut state = scenario();
        state.player.charges = Charges::new(0, 0, 0);
        state.enemy.charges = Charges::new(0, 0, 0);
        let end = play_out(&state, 0.8, &mut rng);
        assert!(end.is_terminal());
    }

    #[test]
    fn greedy_player_wins_easy_combat() {
        // Full-charge rock kills the enemy in one blow unless the enemy plays
        // paper, and the greedy policy always goes for it.
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let wins: f32 = (0..200).map(|_| simulate(&scenario(), &mut rng)).sum();
        assert!(wins > 100.0, "{wins}");
    }
}
