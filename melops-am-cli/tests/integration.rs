//! Integration tests for mel-am CLI.

use clap::Parser;
use melops_am_cli::cli::{Cli, run_cli};
use std::path::PathBuf;

const MDEF: &str = "\
0.3
4 n_base
2 n_tri
24 n_state_map
18 n_tied_state
12 n_tied_ci_state
4 n_tied_tmat
SIL - - - filler 0 0 1 2 N
AE  - - - n/a    1 3 4 5 N
K   - - - n/a    2 6 7 8 N
T   - - - n/a    3 9 10 11 N
AE  K T i n/a    1 12 13 14 N
AE  T T i n/a    1 15 16 17 N
";

fn model_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mel-am-{name}-{}", std::process::id()));

    // Clean up previous test run
    if dir.exists() {
        std::fs::remove_dir_all(&dir).ok();
    }
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");

    let row = "[[0.5, 0.5, 0.0, 0.0], [0.0, 0.5, 0.5, 0.0], [0.0, 0.0, 0.5, 0.5]]";
    let matrices = vec![row; 4].join(", ");

    std::fs::write(dir.join("mdef"), MDEF).expect("failed to write mdef");
    std::fs::write(
        dir.join("transition_matrices.json"),
        format!(r#"{{"matrices": [{matrices}]}}"#),
    )
    .expect("failed to write transition matrices");

    dir
}

fn run(args: &[&str]) -> eyre::Result<()> {
    run_cli(Cli::parse_from(args))
}

#[test]
fn info_loads_model() {
    let dir = model_dir("info");
    let dir_arg = dir.to_str().unwrap();

    run(&["mel-am", "info", dir_arg, "--source", "path"]).expect("info failed");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn lookup_resolves_composite_and_exact_miss() {
    let dir = model_dir("lookup");
    let dir_arg = dir.to_str().unwrap();

    run(&["mel-am", "lookup", dir_arg, "AE[*,T]"]).expect("composite lookup failed");
    run(&["mel-am", "lookup", dir_arg, "AE[*,T]", "--exact"]).expect("exact miss must not fail");
    run(&["mel-am", "lookup", dir_arg, "K[T,T]", "-p", "-", "--no-composites"])
        .expect("backoff lookup failed");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn lookup_rejects_unknown_phone() {
    let dir = model_dir("unknown");
    let dir_arg = dir.to_str().unwrap();

    let result = run(&["mel-am", "lookup", dir_arg, "ZH[K,T]"]);

    assert!(result.is_err());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn missing_model_is_an_error() {
    let dir = std::env::temp_dir().join("mel-am-no-such-model");
    let dir_arg = dir.to_str().unwrap();

    let result = run(&["mel-am", "info", dir_arg, "--source", "path"]);

    assert!(result.is_err());
}
