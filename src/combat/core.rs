//! Combat primitives commonly used within [`crate::combat`].

use std::cmp::Reverse;
use std::fmt;
use std::ops::Index;

use anyhow::{bail, Context};
use arrayvec::ArrayVec;
use itertools::Itertools;

/// Upper bound of a move's charge. Charges regenerate up to this value and
/// never exceed it.
pub const MAX_CHARGE: u8 = 3;

/// Move played whenever a side has nothing legal to play. This can only
/// happen if the snapshot came with all charges exhausted: a played move
/// always recharges the other two.
pub const DEFAULT_MOVE: Move = Move::Rock;

/// One of the three symmetric choices. The beats-relation is cyclic: Rock
/// beats Scissor, Scissor beats Paper and Paper beats Rock.
///
/// ```
/// use duelist::combat::core::Move;
///
/// assert!(Move::Rock.beats(Move::Scissor));
/// assert_eq!(Move::Scissor.counter(), Move::Rock);
/// assert_eq!(Move::try_from("paper").unwrap(), Move::Paper);
/// assert_eq!(Move::Paper.to_string(), "paper");
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Move {
    Rock,
    Paper,
    Scissor,
}

impl Move {
    /// All moves in their canonical order. Iteration order matters: ties
    /// between equally good moves are resolved in favor of the earlier one.
    pub const ALL: [Self; 3] = [Self::Rock, Self::Paper, Self::Scissor];

    /// Returns `true` if `self` wins against `other`.
    #[must_use]
    pub const fn beats(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissor) | (Self::Scissor, Self::Paper) | (Self::Paper, Self::Rock)
        )
    }

    /// Returns the move that beats `self`.
    #[must_use]
    pub const fn counter(self) -> Self {
        match self {
            Self::Rock => Self::Paper,
            Self::Paper => Self::Scissor,
            Self::Scissor => Self::Rock,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<&str> for Move {
    type Error = anyhow::Error;

    fn try_from(name: &str) -> anyhow::Result<Self> {
        match name {
            "rock" | "r" => Ok(Self::Rock),
            "paper" | "p" => Ok(Self::Paper),
            "scissor" | "scissors" | "s" => Ok(Self::Scissor),
            _ => bail!("move should be one of rock, paper or scissor, got '{name}'"),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rock => "rock",
            Self::Paper => "paper",
            Self::Scissor => "scissor",
        })
    }
}

/// Result of a single round, decided purely by the two chosen moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Outcome {
    Player,
    Enemy,
    Tie,
}

impl Outcome {
    /// Resolves the round under the beats-relation.
    #[must_use]
    pub const fn resolve(player: Move, enemy: Move) -> Self {
        if player.beats(enemy) {
            Self::Player
        } else if enemy.beats(player) {
            Self::Enemy
        } else {
            Self::Tie
        }
    }
}

/// Effect of a single move when it resolves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveStats {
    /// Damage dealt to the opponent, absorbed by their shield first.
    pub damage: u32,
    /// Shield restored to the side that played the move.
    pub shield_gain: u32,
}

impl MoveStats {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(damage: u32, shield_gain: u32) -> Self {
        Self {
            damage,
            shield_gain,
        }
    }
}

impl TryFrom<&str> for MoveStats {
    type Error = anyhow::Error;

    /// Parses `<damage>:<shield_gain>`.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let Some((damage, shield_gain)) = input.split_once(':') else {
            bail!("move stats should be '<damage>:<shield>', got '{input}'");
        };
        Ok(Self {
            damage: damage
                .parse()
                .with_context(|| format!("incorrect damage in '{input}'"))?,
            shield_gain: shield_gain
                .parse()
                .with_context(|| format!("incorrect shield gain in '{input}'"))?,
        })
    }
}

impl fmt::Display for MoveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.damage, self.shield_gain)
    }
}

/// Stats of all three moves for one side. Gear and upgrades change these per
/// side, so the player and the enemy each carry their own.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Arsenal {
    stats: [MoveStats; 3],
}

impl Arsenal {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(rock: MoveStats, paper: MoveStats, scissor: MoveStats) -> Self {
        Self {
            stats: [rock, paper, scissor],
        }
    }

    /// Returns the move with the highest damage and that damage. The earliest
    /// move wins the tie.
    #[must_use]
    pub fn strongest_attack(&self) -> (Move, u32) {
        let strongest = Move::ALL
            .into_iter()
            .min_by_key(|&m| Reverse(self[m].damage))
            .unwrap_or(DEFAULT_MOVE);
        (strongest, self[strongest].damage)
    }

    /// Highest damage over all moves.
    #[must_use]
    pub fn max_damage(&self) -> u32 {
        self.stats.iter().map(|stats| stats.damage).max().unwrap_or(0)
    }

    /// Highest shield gain over all moves.
    #[must_use]
    pub fn max_shield_gain(&self) -> u32 {
        self.stats
            .iter()
            .map(|stats| stats.shield_gain)
            .max()
            .unwrap_or(0)
    }
}

impl Index<Move> for Arsenal {
    type Output = MoveStats;

    fn index(&self, m: Move) -> &Self::Output {
        &self.stats[m.index()]
    }
}

impl TryFrom<&str> for Arsenal {
    type Error = anyhow::Error;

    /// Parses `<rock>,<paper>,<scissor>` where each move is formatted as in
    /// [`MoveStats`].
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = input.split(',').collect();
        let [rock, paper, scissor] = parts.as_slice() else {
            bail!(
                "arsenal should have stats for exactly 3 moves, got {}: '{input}'",
                parts.len()
            );
        };
        Ok(Self::new(
            MoveStats::try_from(*rock)?,
            MoveStats::try_from(*paper)?,
            MoveStats::try_from(*scissor)?,
        ))
    }
}

impl fmt::Display for Arsenal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stats.iter().join(","))
    }
}

/// Remaining uses of each move. A move with zero charge can not be played.
///
/// ```
/// use duelist::combat::core::{Charges, Move};
///
/// let charges = Charges::new(1, 3, 0);
/// assert_eq!(charges.legal_moves().as_slice(), &[Move::Rock, Move::Paper]);
///
/// let charges = charges.apply(Move::Rock);
/// assert_eq!(charges, Charges::new(0, 3, 1));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Charges {
    charges: [u8; 3],
}

impl Charges {
    /// All moves fully charged.
    pub const FULL: Self = Self {
        charges: [MAX_CHARGE; 3],
    };

    /// Creates charges, clamping each value to [`MAX_CHARGE`].
    #[must_use]
    pub fn new(rock: u8, paper: u8, scissor: u8) -> Self {
        Self {
            charges: [rock, paper, scissor].map(|charge| charge.min(MAX_CHARGE)),
        }
    }

    /// Returns all moves with positive charge in canonical order. The result
    /// only depends on the charges.
    #[must_use]
    pub fn legal_moves(&self) -> ArrayVec<Move, 3> {
        Move::ALL
            .into_iter()
            .filter(|&m| self[m] > 0)
            .collect()
    }

    /// Returns the charges after `played` was played: its charge decreases by
    /// one (never below zero) and every other move regains one (never above
    /// [`MAX_CHARGE`]).
    #[must_use]
    pub fn apply(self, played: Move) -> Self {
        let mut charges = self.charges;
        for m in Move::ALL {
            let charge = &mut charges[m.index()];
            *charge = if m == played {
                charge.saturating_sub(1)
            } else {
                charge.saturating_add(1).min(MAX_CHARGE)
            };
        }
        Self { charges }
    }
}

impl Default for Charges {
    fn default() -> Self {
        Self::FULL
    }
}

impl Index<Move> for Charges {
    type Output = u8;

    fn index(&self, m: Move) -> &Self::Output {
        &self.charges[m.index()]
    }
}

impl TryFrom<&str> for Charges {
    type Error = anyhow::Error;

    /// Parses three digits: Rock, Paper and Scissor charges.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        if input.len() != 3 || !input.bytes().all(|c| c.is_ascii_digit()) {
            bail!("charges should be exactly 3 digits, got '{input}'");
        }
        let mut charges = [0; 3];
        for (charge, digit) in charges.iter_mut().zip(input.bytes()) {
            *charge = digit - b'0';
            if *charge > MAX_CHARGE {
                bail!("charge can not exceed {MAX_CHARGE}, got '{input}'");
            }
        }
        Ok(Self { charges })
    }
}

impl fmt::Display for Charges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for charge in self.charges {
            write!(f, "{charge}")?;
        }
        Ok(())
    }
}
