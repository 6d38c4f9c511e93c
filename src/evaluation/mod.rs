//! This module implements tree-free [evaluation] of a combat state: the
//! state is played out many times and the share of won playouts estimates the
//! chance to win it.
//!
//! Decision makers that compare outcomes without picking a move (e.g. which
//! loot option makes the next combat easier) are built on top of this.
//!
//! [evaluation]: https://en.wikipedia.org/wiki/Monte_Carlo_method

use std::fmt::Display;

use rand::Rng;

use crate::combat::state::CombatState;
use crate::search::simulate;

/// Share of won playouts in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct WinRate {
    value: f32,
}

impl WinRate {
    #[allow(missing_docs)]
    pub const LOSS: Self = Self { value: 0.0 };
    #[allow(missing_docs)]
    pub const WIN: Self = Self { value: 1.0 };

    #[allow(missing_docs)]
    #[must_use]
    pub const fn value(self) -> f32 {
        self.value
    }
}

impl From<f32> for WinRate {
    /// Clamps `value` into `[0, 1]`, NaN becomes [`WinRate::LOSS`].
    fn from(value: f32) -> Self {
        if value.is_nan() {
            return Self::LOSS;
        }
        Self {
            value: value.clamp(0.0, 1.0),
        }
    }
}

impl Display for WinRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "winrate {:.3}", self.value)
    }
}

/// Plays `state` out `rollouts` times and returns the share of wins. Zero
/// rollouts carry no information and result in [`WinRate::LOSS`].
///
/// ```
/// use duelist::combat::state::CombatState;
/// use duelist::evaluation::estimate_win_rate;
/// use rand::SeedableRng;
///
/// let state =
///     CombatState::try_from("12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333").unwrap();
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
/// let win_rate = estimate_win_rate(&state, 100, &mut rng);
/// assert!(win_rate.value() > 0.5);
/// ```
pub fn estimate_win_rate<R: Rng + ?Sized>(state: &CombatState, rollouts: u32, rng: &mut R) -> WinRate {
    if rollouts == 0 {
        return WinRate::LOSS;
    }
    let wins: f32 = (0..rollouts).map(|_| simulate(state, rng)).sum();
    WinRate::from(wins / rollouts as f32)
}
