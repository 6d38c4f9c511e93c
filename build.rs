//! Retrieves information about the version of the engine from Git and the build
//! environment. This information is then written to a file in the output
//! directory and can be accessed at runtime by the engine.

use std::path::Path;
use std::{env, fs};

fn generate_file(filename: &str, contents: &str) {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join(filename);
    fs::write(dest_path, contents).unwrap();
}

/// Records the switches that change search behavior or speed in a way that is
/// worth reporting next to the version.
fn generate_build_info() {
    // Build scripts are compiled for the host, so target configuration has to
    // be read from the environment instead of `cfg!`.
    let debug_assertions = env::var_os("CARGO_CFG_DEBUG_ASSERTIONS").is_some();
    let avx2 = env::var("CARGO_CFG_TARGET_FEATURE")
        .map(|features| features.split(',').any(|feature| feature == "avx2"))
        .unwrap_or(false);
    let features = format!(
        "{}debug-assertions {}avx2",
        if debug_assertions { "+" } else { "-" },
        if avx2 { "+" } else { "-" }
    );
    generate_file("features", &features);
}

fn main() -> shadow_rs::SdResult<()> {
    generate_build_info();
    shadow_rs::new()
}
