//! Hand-tuned strategy knowledge that steers the search: which child to
//! descend into, which move to try next, how to play out a combat and how to
//! rank the root moves at the end.
//!
//! All constants are tuned together. Changing one usually shifts the balance
//! between offense, counter-play and charge conservation.

use std::cmp::Reverse;

use arrayvec::ArrayVec;
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::combat::core::{Move, DEFAULT_MOVE};
use crate::combat::state::CombatState;

/// A move is safe to play while its charge is above this value: playing it
/// still leaves at least one use.
pub const CRITICAL_CHARGE: u8 = 1;
/// Charge at which a move is not critical yet but should be saved.
pub const LOW_CHARGE: u8 = 2;

/// Selection penalty for spending the last use of a move.
pub const CRITICAL_CHARGE_PENALTY: f32 = 0.8;
/// Selection penalty for spending a move that is running low.
pub const LOW_CHARGE_PENALTY: f32 = 0.3;
/// Final decision penalty for spending the last use of a move.
pub const ROOT_CRITICAL_CHARGE_PENALTY: f32 = 0.5;
/// Final decision penalty for spending a move that is running low.
pub const ROOT_LOW_CHARGE_PENALTY: f32 = 0.15;

/// Selection bonus per unit of damage relative to the strongest own move.
pub const OFFENSE_WEIGHT: f32 = 0.1;
/// Extra selection bonus for a safe move that ends the combat.
pub const LETHAL_BONUS: f32 = 0.2;
/// Selection bonus per unit of threat for countering the enemy's strongest
/// attack.
pub const COUNTER_WEIGHT: f32 = 0.1;

/// Health ratio below which a fighter is considered near death.
pub const NEAR_DEATH_RATIO: f32 = 0.3;
/// Offense multiplier while the enemy is near death.
pub const FINISHING_OFFENSE_MULTIPLIER: f32 = 1.2;
/// Counter multiplier while the enemy is near death.
pub const FINISHING_COUNTER_MULTIPLIER: f32 = 0.7;
/// Counter multiplier while the player is near death.
pub const DANGER_COUNTER_MULTIPLIER: f32 = 1.3;

/// Attacks weaker than this are not worth defending against.
pub const MINOR_DAMAGE_THRESHOLD: u32 = 5;
/// Threat multiplier for attacks below [`MINOR_DAMAGE_THRESHOLD`].
pub const MINOR_THREAT_DISCOUNT: f32 = 0.5;

/// Final decision offense weight while the enemy is near death.
pub const ROOT_FINISHING_OFFENSE_WEIGHT: f32 = 0.1;
/// Final decision offense weight otherwise.
pub const ROOT_OFFENSE_WEIGHT: f32 = 0.05;
/// Final decision counter weight while the player is near death.
pub const ROOT_DANGER_COUNTER_WEIGHT: f32 = 0.08;
/// Final decision counter weight otherwise.
pub const ROOT_COUNTER_WEIGHT: f32 = 0.04;
/// Final decision bonus per unit of shield gain relative to the best own
/// shield move, only awarded while the player is near death.
pub const ROOT_SHIELD_WEIGHT: f32 = 0.06;

/// A lethal root move is played right away if its win rate exceeds this.
pub const LETHAL_WIN_RATE_FLOOR: f32 = 0.5;

/// Everything the heuristics need to know about a state, computed once per
/// node instead of once per child.
#[derive(Debug)]
pub(crate) struct Assessment {
    /// Move that beats the enemy's strongest attack.
    pub(crate) counter: Move,
    pub(crate) strongest_enemy_damage: u32,
    pub(crate) max_damage: u32,
    pub(crate) max_shield_gain: u32,
    pub(crate) threat: f32,
    pub(crate) enemy_near_death: bool,
    pub(crate) player_near_death: bool,
}

impl Assessment {
    pub(crate) fn of(state: &CombatState) -> Self {
        let (strongest, strongest_enemy_damage) = state.enemy.arsenal.strongest_attack();
        Self {
            counter: strongest.counter(),
            strongest_enemy_damage,
            max_damage: state.player.arsenal.max_damage(),
            max_shield_gain: state.player.arsenal.max_shield_gain(),
            threat: threat_level(state),
            enemy_near_death: state.enemy.health_ratio() < NEAR_DEATH_RATIO,
            player_near_death: state.player.health_ratio() < NEAR_DEATH_RATIO,
        }
    }
}

/// How dangerous the enemy's strongest attack is relative to what the player
/// can absorb. Weak attacks count half.
#[must_use]
pub fn threat_level(state: &CombatState) -> f32 {
    let (_, damage) = state.enemy.arsenal.strongest_attack();
    let effective_health = state.player.effective_health();
    let threat = if effective_health > 0 {
        damage as f32 / effective_health as f32
    } else {
        1.0
    };
    if damage < MINOR_DAMAGE_THRESHOLD {
        threat * MINOR_THREAT_DISCOUNT
    } else {
        threat
    }
}

/// Returns `true` if playing `m` leaves the player at least one more use of
/// it.
#[must_use]
pub fn is_safe(state: &CombatState, m: Move) -> bool {
    state.player.charges[m] > CRITICAL_CHARGE
}

/// A safe move that ends the combat if it lands.
#[must_use]
pub fn is_safe_lethal(state: &CombatState, m: Move) -> bool {
    is_safe(state, m) && state.is_lethal(m)
}

fn charge_penalty(state: &CombatState, m: Move, critical: f32, low: f32) -> f32 {
    match state.player.charges[m] {
        CRITICAL_CHARGE => critical,
        LOW_CHARGE => low,
        _ => 0.0,
    }
}

fn damage_ratio(state: &CombatState, assessment: &Assessment, m: Move) -> f32 {
    if assessment.max_damage == 0 {
        return 0.0;
    }
    state.player.arsenal[m].damage as f32 / assessment.max_damage as f32
}

/// Upper Confidence Bound for a child. Unvisited children are always
/// preferred.
pub(crate) fn uct(wins: f64, visits: u32, parent_visits: u32, exploration: f32) -> f32 {
    if visits == 0 {
        return f32::INFINITY;
    }
    let exploitation = (wins / f64::from(visits)) as f32;
    let visits = visits as f32;
    let confidence = ((parent_visits.max(1) as f32).ln() / visits).sqrt();
    exploration.mul_add(confidence, exploitation)
}

/// Domain adjustment added to the UCT score of the child reached by `m`:
/// offense and counter-play bonuses minus the charge penalty.
pub(crate) fn selection_bonus(state: &CombatState, assessment: &Assessment, m: Move) -> f32 {
    let mut offense = 0.0;
    if state.player.arsenal[m].damage > 0 {
        offense = OFFENSE_WEIGHT * damage_ratio(state, assessment, m);
        // Lethal blows are only rewarded while the move has uses to spare.
        if is_safe_lethal(state, m) {
            offense += LETHAL_BONUS;
        }
    }

    let mut counter = 0.0;
    if m == assessment.counter {
        counter = COUNTER_WEIGHT * assessment.threat;
    }

    if assessment.enemy_near_death {
        offense *= FINISHING_OFFENSE_MULTIPLIER;
        counter *= FINISHING_COUNTER_MULTIPLIER;
    }
    if assessment.player_near_death {
        counter *= DANGER_COUNTER_MULTIPLIER;
    }

    offense + counter - charge_penalty(state, m, CRITICAL_CHARGE_PENALTY, LOW_CHARGE_PENALTY)
}

/// Score of a root move for the final decision: empirical win rate blended
/// with the strategy bonus, minus the charge penalty.
pub(crate) fn root_score(
    state: &CombatState,
    assessment: &Assessment,
    m: Move,
    win_rate: f32,
) -> f32 {
    let stats = state.player.arsenal[m];
    let mut bonus = 0.0;

    if stats.damage > 0 && assessment.max_damage > 0 {
        let weight = if assessment.enemy_near_death {
            ROOT_FINISHING_OFFENSE_WEIGHT
        } else {
            ROOT_OFFENSE_WEIGHT
        };
        bonus += weight * damage_ratio(state, assessment, m);
    }

    if m == assessment.counter {
        let weight = if assessment.player_near_death {
            ROOT_DANGER_COUNTER_WEIGHT
        } else {
            ROOT_COUNTER_WEIGHT
        };
        bonus += weight * assessment.threat;
    }

    if assessment.player_near_death && assessment.max_shield_gain > 0 {
        bonus += ROOT_SHIELD_WEIGHT * stats.shield_gain as f32 / assessment.max_shield_gain as f32;
    }

    win_rate + bonus
        - charge_penalty(
            state,
            m,
            ROOT_CRITICAL_CHARGE_PENALTY,
            ROOT_LOW_CHARGE_PENALTY,
        )
}

/// Uniformly random move out of `moves`, [`DEFAULT_MOVE`] if there is none.
pub(crate) fn random_move<R: Rng + ?Sized>(moves: &[Move], rng: &mut R) -> Move {
    moves.choose(rng).copied().unwrap_or_else(|| {
        warn!("no legal moves, falling back to {DEFAULT_MOVE}");
        DEFAULT_MOVE
    })
}

/// The candidate with the highest `key`; the earliest one wins the tie.
fn best_by(moves: &[Move], key: impl Fn(Move) -> u32) -> Option<Move> {
    moves.iter().copied().min_by_key(|&m| Reverse(key(m)))
}

/// Picks one of `candidates` for the player the way a careful human would.
///
/// Safe moves (see [`is_safe`]) are preferred; only if there are none the
/// choice is random among all candidates. Among safe moves:
///
/// 1. A lethal blow is taken right away.
/// 2. A nearly dead enemy is finished with the heaviest hit.
/// 3. A nearly dead player counters the enemy's strongest attack or raises the
///    most shield.
/// 4. A harmless enemy is attacked with the heaviest hit.
/// 5. Otherwise the enemy's strongest attack is countered, if that move is
///    safe, or a random safe move is played.
pub(crate) fn heuristic_move<R: Rng + ?Sized>(
    state: &CombatState,
    candidates: &[Move],
    rng: &mut R,
) -> Move {
    let safe: ArrayVec<Move, 3> = candidates
        .iter()
        .copied()
        .filter(|&m| is_safe(state, m))
        .collect();
    if safe.is_empty() {
        return random_move(candidates, rng);
    }

    let lethal: ArrayVec<Move, 3> = safe
        .iter()
        .copied()
        .filter(|&m| state.is_lethal(m))
        .collect();
    if !lethal.is_empty() {
        return random_move(&lethal, rng);
    }

    let assessment = Assessment::of(state);
    let heaviest = || best_by(&safe, |m| state.player.arsenal[m].damage);
    let counter_is_safe = safe.contains(&assessment.counter);

    let choice = if assessment.enemy_near_death {
        heaviest()
    } else if assessment.player_near_death {
        if counter_is_safe {
            Some(assessment.counter)
        } else {
            best_by(&safe, |m| state.player.arsenal[m].shield_gain)
        }
    } else if assessment.strongest_enemy_damage < MINOR_DAMAGE_THRESHOLD {
        heaviest()
    } else if counter_is_safe {
        Some(assessment.counter)
    } else {
        None
    };
    choice.unwrap_or_else(|| random_move(&safe, rng))
}

/// Exploration noise for playouts: any safe move, or any legal move if none
/// is safe.
pub(crate) fn exploratory_move<R: Rng + ?Sized>(
    state: &CombatState,
    legal: &[Move],
    rng: &mut R,
) -> Move {
    let safe: ArrayVec<Move, 3> = legal
        .iter()
        .copied()
        .filter(|&m| is_safe(state, m))
        .collect();
    if safe.is_empty() {
        random_move(legal, rng)
    } else {
        random_move(&safe, rng)
    }
}
