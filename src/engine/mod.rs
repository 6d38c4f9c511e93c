//! The engine puts all pieces together: it keeps the current combat state and
//! the search configuration and answers the commands of the line-based
//! protocol (see [`protocol`]) read from the input stream.
//!
//! [`Engine::protocol_loop`] is the "main loop" of the engine which
//! communicates with the environment and executes commands from the input
//! stream.
//!
//! A session usually looks like this:
//!
//! ```text
//! > identify
//! < id name duelist ...
//! < identifyok
//! > position 12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333 1
//! > go iterations 2000
//! < info move rock visits 1980 winrate 0.990 score 1.040
//! < ...
//! < bestmove rock
//! ```

use std::io::{BufRead, Write};

use rand_chacha::ChaCha8Rng;

use crate::combat::state::CombatState;
use crate::engine::protocol::{Command, EngineOption};
use crate::evaluation::estimate_win_rate;
use crate::search::{self, Config};

mod protocol;

/// Number of playouts `simulate` runs unless told otherwise.
const DEFAULT_ROLLOUTS: u32 = 1000;

/// The Engine connects everything together and handles commands sent by the
/// client, including I/O.
pub struct Engine<'a, R: BufRead, W: Write> {
    state: Option<CombatState>,
    config: Config,
    rng: ChaCha8Rng,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Engine<'a, R, W> {
    /// Creates a new instance of the engine without a combat and provided
    /// I/O.
    #[must_use]
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        let config = Config::default();
        Self {
            state: None,
            rng: config.rng(),
            config,
            input,
            output,
        }
    }

    /// Continuously reads the input stream and executes sent commands until
    /// "quit" is sent or the input is closed.
    ///
    /// Malformed and unsupported commands are reported with `info string` and
    /// skipped. Only I/O errors end the loop early.
    pub fn protocol_loop(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Command::Identify => self.handle_identify()?,
                Command::IsReady => self.handle_isready()?,
                Command::SetOption(option) => self.handle_setoption(option)?,
                Command::SetPosition(state) => self.state = Some(state),
                Command::Go { iterations } => self.handle_go(iterations)?,
                Command::Simulate { rollouts } => self.handle_simulate(rollouts)?,
                Command::Quit => break,
                Command::Invalid(reason) => {
                    writeln!(self.output, "info string Invalid command: {reason}")?;
                },
                Command::Unknown(command) => {
                    writeln!(self.output, "info string Unsupported command: {command}")?;
                },
            }
            self.output.flush()?;
        }
        Ok(())
    }

    /// Responds to the `identify` handshake command by identifying the engine
    /// and listing its options.
    fn handle_identify(&mut self) -> anyhow::Result<()> {
        writeln!(
            self.output,
            "id name {} {}",
            env!("CARGO_PKG_NAME"),
            crate::engine_version()
        )?;
        writeln!(self.output, "id author {}", env!("CARGO_PKG_AUTHORS"))?;
        writeln!(
            self.output,
            "option name Iterations type spin default {} min 0 max {}",
            Config::default().iterations,
            u32::MAX
        )?;
        writeln!(self.output, "option name Seed type spin default none")?;
        writeln!(
            self.output,
            "option name Exploration type string default {}",
            Config::default().exploration
        )?;
        writeln!(
            self.output,
            "option name RolloutGreed type string default {}",
            Config::default().rollout_greed
        )?;
        writeln!(self.output, "identifyok")?;
        Ok(())
    }

    /// Syncs with the client by responding with `readyok`.
    fn handle_isready(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "readyok")?;
        Ok(())
    }

    /// Changes the search configuration. Setting the seed restarts the random
    /// number generator so that the following searches are reproducible.
    fn handle_setoption(&mut self, option: EngineOption) -> anyhow::Result<()> {
        match option {
            EngineOption::Iterations(iterations) => self.config.iterations = iterations,
            EngineOption::Seed(seed) => {
                self.config.seed = Some(seed);
                self.rng = self.config.rng();
            },
            EngineOption::Exploration(exploration) => {
                self.config = std::mem::take(&mut self.config).with_exploration(exploration);
            },
            EngineOption::RolloutGreed(greed) => {
                self.config = std::mem::take(&mut self.config).with_rollout_greed(greed);
            },
        }
        Ok(())
    }

    /// Searches the current combat and reports the root moves followed by
    /// `bestmove`.
    fn handle_go(&mut self, iterations: Option<u32>) -> anyhow::Result<()> {
        let Some(state) = self.state else {
            writeln!(self.output, "info string No position, send `position` first")?;
            return Ok(());
        };
        let mut config = self.config.clone();
        if let Some(iterations) = iterations {
            config.iterations = iterations;
        }

        let result = search::search(&state, &config, &mut self.rng);
        for candidate in &result.candidates {
            write!(
                self.output,
                "info move {} visits {} winrate {:.3}",
                candidate.player_move, candidate.visits, candidate.win_rate
            )?;
            if let Some(score) = candidate.score {
                write!(self.output, " score {score:.3}")?;
            }
            writeln!(self.output)?;
        }
        writeln!(
            self.output,
            "info iterations {} nodes {} decision {}",
            result.iterations, result.nodes, result.decision
        )?;
        writeln!(self.output, "bestmove {}", result.best_move)?;
        Ok(())
    }

    /// Estimates the chance to win the current combat without a search.
    fn handle_simulate(&mut self, rollouts: Option<u32>) -> anyhow::Result<()> {
        let Some(state) = self.state else {
            writeln!(self.output, "info string No position, send `position` first")?;
            return Ok(());
        };
        let win_rate = estimate_win_rate(
            &state,
            rollouts.unwrap_or(DEFAULT_ROLLOUTS),
            &mut self.rng,
        );
        writeln!(self.output, "{win_rate}")?;
        Ok(())
    }
}
