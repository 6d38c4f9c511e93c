//! Implements [Monte Carlo Tree Search] (MCTS) algorithm for picking the
//! player move. The enemy move is unknown: the search treats it as a uniformly
//! random choice among the enemy's legal moves.
//!
//! Every iteration goes through four steps:
//!
//! 1. Selection: descend from the root by picking the most promising child
//!    (UCT adjusted by [`policy`] heuristics) while the node is fully
//!    expanded.
//! 2. Expansion: add a child for one of the untried moves.
//! 3. Simulation: play the combat out from the new child ([`play_out`]).
//! 4. Backpropagation: record the result on the path back to the root.
//!
//! The final decision is not simply the most visited child: lethal moves are
//! played right away and the rest are ranked by win rate blended with the
//! strategy bonuses.
//!
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

use std::fmt;
use std::time::Instant;

use arrayvec::ArrayVec;
use log::{debug, trace, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::combat::core::{Move, DEFAULT_MOVE};
use crate::combat::state::CombatState;

pub mod policy;
mod rollout;
mod tree;

pub use rollout::{play_out, simulate, DEFAULT_ROLLOUT_GREED};
use tree::{NodeIndex, Tree, ROOT};

/// Progress is reported once per this many iterations.
const PROGRESS_INTERVAL: u32 = 10_000;

/// Parameters of the search.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Number of search iterations to perform.
    pub iterations: u32,
    /// Weight of the exploration term in UCT.
    pub exploration: f32,
    /// Share of heuristic player moves in playouts.
    pub rollout_greed: f64,
    /// Seed for the random number generator. A seeded search is
    /// reproducible, otherwise the generator is seeded from entropy.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iterations: 100_000,
            exploration: 1.4,
            rollout_greed: DEFAULT_ROLLOUT_GREED,
            seed: None,
        }
    }
}

impl Config {
    #[allow(missing_docs)]
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_exploration(mut self, exploration: f32) -> Self {
        self.exploration = exploration;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_rollout_greed(mut self, rollout_greed: f64) -> Self {
        self.rollout_greed = rollout_greed;
        self
    }

    /// Creates the random number generator for a search with this config.
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

/// The rule that picked the final move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// A safe move that ends the combat and wins most playouts.
    Lethal,
    /// Highest win rate blended with the strategy bonuses.
    Blend,
    /// No child was visited: highest raw win rate.
    RawWinRate,
    /// Nothing was searched: [`DEFAULT_MOVE`].
    Default,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lethal => "lethal",
            Self::Blend => "blend",
            Self::RawWinRate => "winrate",
            Self::Default => "default",
        })
    }
}

/// Search statistics of a root move.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    #[allow(missing_docs)]
    pub player_move: Move,
    #[allow(missing_docs)]
    pub visits: u32,
    #[allow(missing_docs)]
    pub win_rate: f32,
    /// Blended score used by [`Decision::Blend`], `None` for unvisited moves.
    pub score: Option<f32>,
}

/// Outcome of [`search`].
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    #[allow(missing_docs)]
    pub best_move: Move,
    #[allow(missing_docs)]
    pub decision: Decision,
    /// Root moves in the order they were expanded.
    pub candidates: ArrayVec<Candidate, 3>,
    /// Number of performed iterations.
    pub iterations: u32,
    /// Number of nodes in the tree, including the root.
    pub nodes: usize,
}

/// Runs the search from `root` and returns the chosen move together with the
/// statistics behind it. Never fails: degenerate inputs (no iterations, no
/// legal moves) result in [`DEFAULT_MOVE`].
pub fn search<R: Rng + ?Sized>(root: &CombatState, config: &Config, rng: &mut R) -> SearchResult {
    let mut tree = Tree::new(*root);

    for iteration in 1..=config.iterations {
        let mut leaf = select(&tree, config.exploration);
        if !tree[leaf].state.is_terminal() && !tree.is_fully_expanded(leaf) {
            leaf = expand(&mut tree, leaf, rng);
        }
        let reward = play_out(&tree[leaf].state, config.rollout_greed, rng).reward();
        tree.backpropagate(leaf, reward);

        if config.iterations > PROGRESS_INTERVAL && iteration % PROGRESS_INTERVAL == 0 {
            trace!(
                "iteration {iteration}/{}: {} nodes",
                config.iterations,
                tree.len()
            );
        }
    }

    let result = decide(&tree, root, config.iterations);
    log_analysis(root, &result);
    result
}

/// Runs the search with a generator created from `config` and returns only
/// the chosen move.
///
/// ```
/// use duelist::combat::core::Move;
/// use duelist::combat::state::CombatState;
/// use duelist::search::{find_best_move, Config};
///
/// let state =
///     CombatState::try_from("12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333").unwrap();
/// let config = Config::default().with_iterations(200).with_seed(1);
/// assert_eq!(find_best_move(&state, &config), Move::Rock);
/// ```
#[must_use]
pub fn find_best_move(root: &CombatState, config: &Config) -> Move {
    let mut rng = config.rng();
    search(root, config, &mut rng).best_move
}

/// Descends from the root while the current node is fully expanded.
fn select(tree: &Tree, exploration: f32) -> NodeIndex {
    let mut current = ROOT;
    while !tree[current].state.is_terminal() && tree.is_fully_expanded(current) {
        match select_child(tree, current, exploration) {
            Some(child) => current = child,
            // No legal moves at all: the playout continues from here.
            None => break,
        }
    }
    current
}

/// Child of `parent` with the best UCT score adjusted by the strategy bonus.
/// Ties resolve to the child created first.
fn select_child(tree: &Tree, parent: NodeIndex, exploration: f32) -> Option<NodeIndex> {
    let node = &tree[parent];
    let assessment = policy::Assessment::of(&node.state);
    let mut best: Option<(NodeIndex, f32)> = None;
    for &index in &node.children {
        let child = &tree[index];
        let Some(m) = child.player_move else {
            continue;
        };
        let score = policy::uct(child.wins, child.visits, node.visits, exploration)
            + policy::selection_bonus(&node.state, &assessment, m);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

/// Adds a child for one of the untried moves of `parent`, sampling the enemy
/// move uniformly.
fn expand<R: Rng + ?Sized>(tree: &mut Tree, parent: NodeIndex, rng: &mut R) -> NodeIndex {
    let state = tree[parent].state;
    let untried = tree.untried_moves(parent);
    let player_move = policy::heuristic_move(&state, &untried, rng);
    let enemy_move = policy::random_move(&state.enemy.charges.legal_moves(), rng);
    tree.add_child(parent, player_move, state.apply_round(player_move, enemy_move))
}

/// Picks the root move out of the search statistics.
fn decide(tree: &Tree, root: &CombatState, iterations: u32) -> SearchResult {
    let assessment = policy::Assessment::of(root);
    let candidates: ArrayVec<Candidate, 3> = tree
        .root_children()
        .filter_map(|child| {
            let player_move = child.player_move?;
            Some(Candidate {
                player_move,
                visits: child.visits,
                win_rate: child.win_rate(),
                score: child.visited().then(|| {
                    policy::root_score(root, &assessment, player_move, child.win_rate())
                }),
            })
        })
        .collect();

    let (best_move, decision) = pick(root, &candidates);
    SearchResult {
        best_move,
        decision,
        candidates,
        iterations,
        nodes: tree.len(),
    }
}

/// First candidate maximizing `key` among those for which it is defined.
fn first_max(candidates: &[Candidate], key: impl Fn(&Candidate) -> Option<f32>) -> Option<Move> {
    let mut best: Option<(Move, f32)> = None;
    for candidate in candidates {
        let Some(value) = key(candidate) else {
            continue;
        };
        if best.map_or(true, |(_, best_value)| value > best_value) {
            best = Some((candidate.player_move, value));
        }
    }
    best.map(|(m, _)| m)
}

fn pick(root: &CombatState, candidates: &[Candidate]) -> (Move, Decision) {
    let lethal = first_max(candidates, |candidate| {
        (candidate.visits > 0
            && policy::is_safe_lethal(root, candidate.player_move)
            && candidate.win_rate > policy::LETHAL_WIN_RATE_FLOOR)
            .then_some(candidate.win_rate)
    });
    if let Some(m) = lethal {
        return (m, Decision::Lethal);
    }
    if let Some(m) = first_max(candidates, |candidate| candidate.score) {
        return (m, Decision::Blend);
    }
    if let Some(m) = first_max(candidates, |candidate| Some(candidate.win_rate)) {
        return (m, Decision::RawWinRate);
    }
    warn!("search produced no candidates, falling back to {DEFAULT_MOVE}");
    (DEFAULT_MOVE, Decision::Default)
}

fn log_analysis(root: &CombatState, result: &SearchResult) {
    let counter = policy::Assessment::of(root).counter;
    for candidate in &result.candidates {
        debug!(
            "{}: win rate {:.3}, visits {}, charge {}{}",
            candidate.player_move,
            candidate.win_rate,
            candidate.visits,
            root.player.charges[candidate.player_move],
            if candidate.player_move == counter {
                " (counter)"
            } else {
                ""
            }
        );
    }
    debug!(
        "best move {} ({}) after {} iterations, {} nodes",
        result.best_move, result.decision, result.iterations, result.nodes
    );
}

/// Runs search on a small set of combats to provide an estimate of engine's
/// performance. Searches are seeded and the node counts are reproducible.
pub fn bench() {
    let mut total_nodes = 0;
    let timer = Instant::now();

    for (snapshot, iterations) in [
        ("12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333 1", 20_000),
        ("30/30 8/8 6:2,3:6,4:3 333 30/30 8/8 6:2,3:6,4:3 333 1", 40_000),
        ("7/30 0/8 6:2,3:6,4:3 212 25/30 4/8 7:1,2:5,5:3 123 9", 40_000),
    ] {
        let Ok(state) = CombatState::try_from(snapshot) else {
            warn!("incorrect bench snapshot: {snapshot}");
            continue;
        };
        let config = Config::default().with_iterations(iterations).with_seed(0);
        let mut rng = config.rng();
        total_nodes += search(&state, &config, &mut rng).nodes;
    }

    let elapsed = timer.elapsed();

    println!(
        "{} nodes {} nps",
        total_nodes,
        (total_nodes as f64 / elapsed.as_secs_f64()) as u64,
    );
}
