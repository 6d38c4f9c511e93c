//! Provides the full [`CombatState`]: both fighters, their stats, charges and
//! the round counter, together with the round resolution rules.
//!
//! States are plain values: every transition produces an independent successor
//! and search branches never alias each other.

use std::fmt;

use anyhow::{bail, Context};

use crate::combat::core::{Arsenal, Charges, Move, Outcome};

/// Round at which the combat is cut off. It bounds every playout: rounds only
/// advance while the state is not terminal.
pub const ROUND_HORIZON: u32 = 20;

/// Result of the combat from the player's perspective.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Enemy is defeated and the player is still standing.
    Win,
    /// Both sides survived until [`ROUND_HORIZON`].
    Draw,
    /// Player is defeated, including the case when both sides fell in the
    /// same round.
    Loss,
}

/// One side of the combat.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fighter {
    #[allow(missing_docs)]
    pub health: u32,
    /// Absorbs incoming damage before health does.
    pub shield: u32,
    #[allow(missing_docs)]
    pub max_health: u32,
    /// Shield gains are capped at this value.
    pub max_shield: u32,
    #[allow(missing_docs)]
    pub arsenal: Arsenal,
    #[allow(missing_docs)]
    pub charges: Charges,
}

impl Fighter {
    /// Creates a fighter with full health and shield pools.
    #[must_use]
    pub const fn fresh(max_health: u32, max_shield: u32, arsenal: Arsenal, charges: Charges) -> Self {
        Self {
            health: max_health,
            shield: max_shield,
            max_health,
            max_shield,
            arsenal,
            charges,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Health and shield combined: the damage it takes to defeat the fighter.
    #[must_use]
    pub const fn effective_health(&self) -> u32 {
        self.health.saturating_add(self.shield)
    }

    /// Fraction of maximum health left. A fighter without health pool is
    /// considered to be at zero.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    fn gain_shield(&mut self, amount: u32) {
        self.shield = self.shield.saturating_add(amount).min(self.max_shield);
    }

    /// Takes the hit on the shield first, the rest goes to health.
    fn absorb(&mut self, damage: u32) {
        if self.shield >= damage {
            self.shield -= damage;
        } else {
            let remaining = damage - self.shield;
            self.shield = 0;
            self.health = self.health.saturating_sub(remaining);
        }
    }
}

/// State of the combat at the start of a round.
///
/// [`CombatState::try_from()`] reads the compact snapshot notation:
///
/// ```text
/// <player side> <enemy side> [round]
/// side = <health>/<max_health> <shield>/<max_shield> <arsenal> <charges>
/// ```
///
/// where the arsenal is `<damage>:<shield_gain>` for Rock, Paper and Scissor
/// separated by commas and charges are three digits in the same order. The
/// round can be omitted and defaults to 1.
///
/// ```
/// use duelist::combat::core::Move;
/// use duelist::combat::state::CombatState;
///
/// let state =
///     CombatState::try_from("12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333").unwrap();
/// assert_eq!(state.round, 1);
/// assert!(state.is_lethal(Move::Rock));
/// assert_eq!(
///     state.to_string(),
///     "12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333 1"
/// );
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CombatState {
    #[allow(missing_docs)]
    pub player: Fighter,
    #[allow(missing_docs)]
    pub enemy: Fighter,
    /// Current round, starting at 1.
    pub round: u32,
}

impl CombatState {
    /// Creates the state of the first round.
    #[must_use]
    pub const fn new(player: Fighter, enemy: Fighter) -> Self {
        Self {
            player,
            enemy,
            round: 1,
        }
    }

    /// The combat is over when either side is defeated or the round horizon
    /// is reached.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.player.is_alive() || !self.enemy.is_alive() || self.round >= ROUND_HORIZON
    }

    /// Returns the result of a finished combat or `None` if it is still
    /// going.
    #[must_use]
    pub const fn result(&self) -> Option<GameResult> {
        if !self.player.is_alive() {
            Some(GameResult::Loss)
        } else if !self.enemy.is_alive() {
            Some(GameResult::Win)
        } else if self.round >= ROUND_HORIZON {
            Some(GameResult::Draw)
        } else {
            None
        }
    }

    /// Playout reward: 1 for a win, 0 for anything else (draws and mutual
    /// defeat included).
    #[must_use]
    pub fn reward(&self) -> f32 {
        if self.result() == Some(GameResult::Win) {
            1.0
        } else {
            0.0
        }
    }

    /// Returns `true` if the player's `m` deals more damage than the enemy
    /// has shield and health left, i.e. wins the combat if it lands.
    #[must_use]
    pub fn is_lethal(&self, m: Move) -> bool {
        self.player.arsenal[m].damage > self.enemy.effective_health()
    }

    /// Resolves a round with both sides' moves and returns the successor
    /// state; `self` is left untouched.
    ///
    /// 1. Both sides spend and regain charges.
    /// 2. The winner of the round gains shield and deals damage. On a tie both
    ///    sides do.
    /// 3. The round advances unless the combat is over.
    #[must_use]
    pub fn apply_round(&self, player_move: Move, enemy_move: Move) -> Self {
        let mut next = *self;
        next.player.charges = next.player.charges.apply(player_move);
        next.enemy.charges = next.enemy.charges.apply(enemy_move);

        let player_stats = self.player.arsenal[player_move];
        let enemy_stats = self.enemy.arsenal[enemy_move];

        match Outcome::resolve(player_move, enemy_move) {
            Outcome::Player => {
                next.player.gain_shield(player_stats.shield_gain);
                next.enemy.absorb(player_stats.damage);
            },
            Outcome::Enemy => {
                next.enemy.gain_shield(enemy_stats.shield_gain);
                next.player.absorb(enemy_stats.damage);
            },
            Outcome::Tie => {
                next.player.gain_shield(player_stats.shield_gain);
                next.enemy.gain_shield(enemy_stats.shield_gain);
                next.enemy.absorb(player_stats.damage);
                next.player.absorb(enemy_stats.damage);
            },
        }

        if !next.is_terminal() {
            next.round += 1;
        }
        next
    }
}

/// Parses `<value>/<max>`.
fn parse_pool(input: &str, what: &str) -> anyhow::Result<(u32, u32)> {
    let Some((value, max)) = input.split_once('/') else {
        bail!("{what} should be '<value>/<max>', got '{input}'");
    };
    let value: u32 = value
        .parse()
        .with_context(|| format!("incorrect {what} value in '{input}'"))?;
    let max: u32 = max
        .parse()
        .with_context(|| format!("incorrect max {what} in '{input}'"))?;
    if value > max {
        bail!("{what} {value} exceeds its maximum {max}");
    }
    Ok((value, max))
}

fn parse_fighter(tokens: &[&str], side: &str) -> anyhow::Result<Fighter> {
    let [health, shield, arsenal, charges] = tokens else {
        bail!("{side} side should have 4 fields, got {}", tokens.len());
    };
    let (health, max_health) =
        parse_pool(health, "health").with_context(|| format!("incorrect {side} side"))?;
    let (shield, max_shield) =
        parse_pool(shield, "shield").with_context(|| format!("incorrect {side} side"))?;
    Ok(Fighter {
        health,
        shield,
        max_health,
        max_shield,
        arsenal: Arsenal::try_from(*arsenal).with_context(|| format!("incorrect {side} side"))?,
        charges: Charges::try_from(*charges).with_context(|| format!("incorrect {side} side"))?,
    })
}

impl TryFrom<&str> for CombatState {
    type Error = anyhow::Error;

    fn try_from(input: &str) -> anyhow::Result<Self> {
        const SIDE_FIELDS: usize = 4;

        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.len() != 2 * SIDE_FIELDS && tokens.len() != 2 * SIDE_FIELDS + 1 {
            bail!(
                "incorrect snapshot: expected {} or {} fields, got {}",
                2 * SIDE_FIELDS,
                2 * SIDE_FIELDS + 1,
                tokens.len()
            );
        }
        let player = parse_fighter(&tokens[..SIDE_FIELDS], "player")?;
        let enemy = parse_fighter(&tokens[SIDE_FIELDS..2 * SIDE_FIELDS], "enemy")?;
        let round = match tokens.get(2 * SIDE_FIELDS) {
            Some(round) => {
                let round: u32 = round
                    .parse()
                    .with_context(|| format!("incorrect snapshot: round '{round}'"))?;
                if round == 0 {
                    bail!("incorrect snapshot: rounds start at 1");
                }
                round
            },
            None => 1,
        };
        Ok(Self {
            player,
            enemy,
            round,
        })
    }
}

impl fmt::Display for Fighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {}/{} {} {}",
            self.health, self.max_health, self.shield, self.max_shield, self.arsenal, self.charges
        )
    }
}

impl fmt::Display for CombatState {
    /// Prints the snapshot notation accepted by [`CombatState::try_from()`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.player, self.enemy, self.round)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::combat::core::MoveStats;

    fn state(player: (u32, u32), enemy: (u32, u32)) -> CombatState {
        let player_arsenal = Arsenal::new(
            MoveStats::new(15, 6),
            MoveStats::new(0, 4),
            MoveStats::new(2, 2),
        );
        let enemy_arsenal = Arsenal::new(
            MoveStats::new(4, 0),
            MoveStats::new(0, 4),
            MoveStats::new(2, 2),
        );
        let mut state = CombatState::new(
            Fighter::fresh(12, 6, player_arsenal, Charges::FULL),
            Fighter::fresh(4, 2, enemy_arsenal, Charges::FULL),
        );
        (state.player.health, state.player.shield) = player;
        (state.enemy.health, state.enemy.shield) = enemy;
        state
    }

    #[test]
    fn shield_absorbs_first() {
        let mut fighter = state((12, 3), (4, 2)).player;
        fighter.absorb(5);
        assert_eq!((fighter.health, fighter.shield), (10, 0));
        fighter.absorb(0);
        assert_eq!((fighter.health, fighter.shield), (10, 0));
        fighter.absorb(100);
        assert_eq!((fighter.health, fighter.shield), (0, 0));
    }

    #[test]
    fn shield_gain_is_capped() {
        let mut fighter = state((12, 5), (4, 2)).player;
        fighter.gain_shield(4);
        assert_eq!(fighter.shield, 6);
    }

    #[test]
    fn decisive_round_conserves_damage() {
        // Scissor beats paper: the player deals 2 and gains 2 shield.
        let before = state((12, 1), (20, 1));
        let before = CombatState {
            enemy: Fighter {
                max_health: 20,
                ..before.enemy
            },
            ..before
        };
        let after = before.apply_round(Move::Scissor, Move::Paper);
        let lost = before.enemy.effective_health() - after.enemy.effective_health();
        assert_eq!(lost, 2);
        assert_eq!((after.enemy.health, after.enemy.shield), (19, 0));
        assert_eq!(after.player.shield, 3);
        assert_eq!(after.player.health, 12);
        assert_eq!(after.round, 2);
        assert_eq!(after.player.charges, Charges::new(3, 3, 2));
        assert_eq!(after.enemy.charges, Charges::new(3, 2, 3));
    }

    #[test]
    fn enemy_wins_round() {
        let before = state((12, 3), (4, 2));
        // Enemy rock (4 damage) beats player scissor.
        let after = before.apply_round(Move::Scissor, Move::Rock);
        assert_eq!((after.player.health, after.player.shield), (11, 0));
        assert_eq!((after.enemy.health, after.enemy.shield), (4, 2));
        assert_eq!(after.result(), None);
    }

    #[test]
    fn tie_applies_both_sides() {
        let before = state((12, 6), (4, 0));
        let after = before.apply_round(Move::Rock, Move::Rock);
        assert_eq!((after.enemy.health, after.enemy.shield), (0, 0));
        // Shield is already full: 6 + 6 is capped at 6, then 4 damage lands.
        assert_eq!((after.player.health, after.player.shield), (12, 2));
        assert!(after.is_terminal());
        assert_eq!(after.round, 1);
        assert_eq!(after.result(), Some(GameResult::Win));
        assert!((after.reward() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mutual_defeat_is_a_loss() {
        let mut before = state((3, 0), (4, 0));
        before.player.max_shield = 0;
        let after = before.apply_round(Move::Rock, Move::Rock);
        assert_eq!(after.player.health, 0);
        assert_eq!(after.enemy.health, 0);
        assert_eq!(after.result(), Some(GameResult::Loss));
        assert!(after.reward().abs() < f32::EPSILON);
    }

    #[test]
    fn input_is_not_mutated() {
        let before = state((12, 6), (4, 2));
        let copy = before;
        let _after = before.apply_round(Move::Rock, Move::Scissor);
        assert_eq!(before, copy);
    }

    #[test]
    fn round_stops_at_horizon() {
        let mut state = state((12, 6), (4, 2));
        state.round = ROUND_HORIZON - 1;
        // Paper against paper: no damage on either side.
        let state = state.apply_round(Move::Paper, Move::Paper);
        assert_eq!(state.round, ROUND_HORIZON);
        assert_eq!(state.result(), Some(GameResult::Draw));
        let state = state.apply_round(Move::Rock, Move::Paper);
        assert_eq!(state.round, ROUND_HORIZON);
    }

    #[test]
    fn lethal_moves() {
        let state = state((12, 6), (4, 2));
        assert!(state.is_lethal(Move::Rock));
        assert!(!state.is_lethal(Move::Paper));
        assert!(!state.is_lethal(Move::Scissor));
    }

    #[test]
    fn notation_round_trip() {
        let input = "10/12 0/6 15:6,0:4,2:2 302 4/9 2/2 4:0,0:4,2:2 133 7";
        let state = CombatState::try_from(input).unwrap();
        assert_eq!(state.player.health, 10);
        assert_eq!(state.player.max_health, 12);
        assert_eq!(state.enemy.max_health, 9);
        assert_eq!(state.player.charges, Charges::new(3, 0, 2));
        assert_eq!(state.round, 7);
        assert_eq!(state.to_string(), input);
    }

    #[test]
    fn incorrect_notation() {
        for input in [
            "",
            "12/12 6/6 15:6,0:4,2:2 333",
            "12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333 1 1",
            "13/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333",
            "12/12 7/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333",
            "12/12 6/6 15:6,0:4,2:2 433 4/4 2/2 4:0,0:4,2:2 333",
            "12/12 6/6 15:6,0:4 333 4/4 2/2 4:0,0:4,2:2 333",
            "12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333",
            "12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333 0",
            "12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333 x",
        ] {
            assert!(CombatState::try_from(input).is_err(), "{input}");
        }
    }
}
