//! Parser for the commands of the line-based engine protocol. It is modelled
//! on [UCI]: one command per line, the first token names the command and the
//! rest are its arguments.
//!
//! [UCI]: https://www.chessprogramming.org/UCI

use anyhow::{bail, Context};

use crate::combat::state::CombatState;

#[derive(Debug, PartialEq)]
pub(super) enum Command {
    Identify,
    IsReady,
    SetOption(EngineOption),
    SetPosition(CombatState),
    Go {
        iterations: Option<u32>,
    },
    Simulate {
        rollouts: Option<u32>,
    },
    Quit,
    /// Command that could not be parsed, with the reason.
    Invalid(String),
    Unknown(String),
}

#[derive(Debug, PartialEq)]
pub(super) enum EngineOption {
    Iterations(u32),
    Seed(u64),
    /// Weight of the exploration term in UCT, non-negative.
    Exploration(f32),
    /// Share of heuristic player moves in playouts, in `[0, 1]`.
    RolloutGreed(f64),
}

fn parse_count<T: std::str::FromStr>(parts: &[&str], keyword: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match parts {
        [] => Ok(None),
        [name, value] if *name == keyword => Ok(Some(
            value
                .parse()
                .with_context(|| format!("incorrect {keyword} '{value}'"))?,
        )),
        _ => bail!("expected `{keyword} <N>`, got '{}'", parts.join(" ")),
    }
}

fn parse_setoption(parts: &[&str]) -> anyhow::Result<EngineOption> {
    let ["name", name, "value", value] = parts else {
        bail!("expected `setoption name <option> value <N>`");
    };
    match *name {
        "Iterations" => Ok(EngineOption::Iterations(
            value
                .parse()
                .with_context(|| format!("incorrect iterations '{value}'"))?,
        )),
        "Seed" => Ok(EngineOption::Seed(
            value
                .parse()
                .with_context(|| format!("incorrect seed '{value}'"))?,
        )),
        "Exploration" => {
            let exploration: f32 = value
                .parse()
                .with_context(|| format!("incorrect exploration '{value}'"))?;
            if !exploration.is_finite() || exploration < 0.0 {
                bail!("exploration should be a non-negative number, got {exploration}");
            }
            Ok(EngineOption::Exploration(exploration))
        },
        "RolloutGreed" => {
            let greed: f64 = value
                .parse()
                .with_context(|| format!("incorrect rollout greed '{value}'"))?;
            if !(0.0..=1.0).contains(&greed) {
                bail!("rollout greed should be in [0, 1], got {greed}");
            }
            Ok(EngineOption::RolloutGreed(greed))
        },
        _ => bail!("unsupported option '{name}'"),
    }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        let Some((&name, args)) = parts.split_first() else {
            return Self::Unknown(input.trim().to_string());
        };

        let parsed = match name {
            "identify" => Ok(Self::Identify),
            "isready" => Ok(Self::IsReady),
            "setoption" => parse_setoption(args).map(Self::SetOption),
            "position" => CombatState::try_from(args.join(" ").as_str()).map(Self::SetPosition),
            "go" => parse_count(args, "iterations").map(|iterations| Self::Go { iterations }),
            "simulate" => parse_count(args, "rollouts").map(|rollouts| Self::Simulate { rollouts }),
            "quit" => Ok(Self::Quit),
            _ => return Self::Unknown(input.trim().to_string()),
        };
        parsed.unwrap_or_else(|e| Self::Invalid(format!("{e:#}")))
    }
}
