//! Move-selection engine for a rock/paper/scissor combat game where every
//! move has a limited, regenerating number of uses and the opponent's move is
//! unknown.
//!
//! - [`combat`] holds the rules: moves, their stats and charges, and the
//!   round resolution.
//! - [`search`] runs Monte Carlo Tree Search over the combat and picks the
//!   move to play.
//! - [`evaluation`] estimates the chance to win a combat without a search.
//! - [`Engine`] serves all of the above over a line-based text protocol.

pub mod combat;
pub mod evaluation;
pub mod search;

mod engine;
pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Build type and target. Produced by `build.rs`.
const FEATURES: &str = include_str!(concat!(env!("OUT_DIR"), "/features"));

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the engine version and repository on engine
/// startup.
pub fn print_engine_info() {
    println!("Duelist combat engine {}", engine_version());
    println!("<{}>", env!("CARGO_PKG_REPOSITORY"));
}

/// Prints information the build type, features and whether the build is clean
/// on engine startup.
pub fn print_binary_info() {
    println!("Release build: {}", !shadow_rs::is_debug());
    println!("Features: {FEATURES}");
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
