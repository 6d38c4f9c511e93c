use assert_cmd::Command;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::{contains, is_match};

const BINARY_NAME: &str = "duelist";

const SCENARIO: &str = "12/12 6/6 15:6,0:4,2:2 333 4/4 2/2 4:0,0:4,2:2 333 1";

#[test]
fn identify() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin("identify\n")
            .assert()
            .success()
            .stdout(
                contains("id name duelist")
                    .and(contains("id author"))
                    .and(contains("option name Iterations"))
                    .and(contains("option name Seed"))
                    .and(contains("option name Exploration"))
                    .and(contains("option name RolloutGreed"))
                    .and(contains("identifyok")),
            ),
    );
}

#[test]
fn go() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin(format!(
            "setoption name Seed value 1\nposition {SCENARIO}\nisready\ngo iterations \
             2000\nquit\n"
        ))
        .assert()
        .success()
        .stdout(
            contains("readyok")
                .and(contains("info move rock"))
                .and(contains("info iterations 2000"))
                .and(contains("bestmove rock")),
        ),
    );
}

#[test]
fn simulate() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin(format!("position {SCENARIO}\nsimulate rollouts 100\n"))
            .assert()
            .success()
            .stdout(is_match(r"(?m)^winrate (0|1)\.\d{3}$").unwrap()),
    );
}

#[test]
fn malformed_input() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");

    drop(
        cmd.write_stdin("position 12/12\ngo\njump\nisready\n")
            .assert()
            .success()
            .stdout(
                contains("info string Invalid command")
                    .and(contains("info string No position"))
                    .and(contains("info string Unsupported command: jump"))
                    .and(contains("readyok"))
                    .and(contains("bestmove").not()),
            ),
    );
}

#[test]
#[ignore]
fn bench_output() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("Binary should be built");
    let _ = cmd.arg("bench");

    drop(
        cmd.assert()
            .stdout(is_match(r"(?m)^\d+ nodes \d+ nps$").unwrap())
            .success(),
    );
}
