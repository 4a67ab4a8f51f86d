//! End-to-end tests driving the compiled binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tourney::GeneratedTournament;

const REQUEST: &str = r#"{
    "name": "Friday Cup",
    "format": "single_elimination",
    "participants": [
        {"id": "ada", "display_name": "Ada", "seed": 1},
        {"id": "bo", "display_name": "Bo", "seed": 2},
        {"id": "cy", "display_name": "Cy", "seed": 3},
        {"id": "di", "display_name": "Di", "seed": 4}
    ]
}"#;

/// Scratch directory unique to one test
fn scratch(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tourney_cli_{}_{test}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tourney_cli"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn generate_into(dir: &Path) -> PathBuf {
    let input = dir.join("request.json");
    let output = dir.join("cup.json");
    fs::write(&input, REQUEST).unwrap();

    let result = run(&[
        "generate",
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    output
}

fn load(path: &Path) -> GeneratedTournament {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("USAGE"));
}

#[test]
fn test_generate_writes_bracket_and_prints_schedule() {
    let dir = scratch("generate");
    let input = dir.join("request.json");
    fs::write(&input, REQUEST).unwrap();

    let output = run(&["generate", "--input", input.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Friday Cup"));
    assert!(stdout.contains("Match schedule"));
    assert!(stdout.contains("No constraint violations"));

    let saved = load(&generate_into(&dir));
    assert_eq!(saved.bracket.matches().len(), 3);
    assert_eq!(saved.schedule.len(), 3);
}

#[test]
fn test_generate_json_is_deterministic() {
    let dir = scratch("json");
    let input = dir.join("request.json");
    fs::write(&input, REQUEST).unwrap();

    let first = run(&["generate", "--input", input.to_str().unwrap(), "--json"]);
    let second = run(&["generate", "--input", input.to_str().unwrap(), "--json"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let parsed: GeneratedTournament = serde_json::from_slice(&first.stdout).unwrap();
    assert_eq!(parsed.name, "Friday Cup");
}

#[test]
fn test_record_until_champion() {
    let dir = scratch("record");
    let path = generate_into(&dir);
    let path_str = path.to_str().unwrap();

    // Ada beats Di, Bo beats Cy, Ada takes the final
    for (match_id, winner) in [("M1", "ada"), ("M2", "bo"), ("M3", "ada")] {
        let version = load(&path).bracket.version().to_string();
        let output = run(&[
            "record", "--bracket", path_str, "--match", match_id, "--winner", winner,
            "--version", &version, "--score", "2:0",
        ]);
        assert!(
            output.status.success(),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let saved = load(&path);
    assert!(saved.bracket.is_complete());
    assert_eq!(saved.bracket.champion().map(|id| id.as_str()), Some("ada"));

    let standings = run(&["standings", "--bracket", path_str]);
    let stdout = String::from_utf8_lossy(&standings.stdout);
    assert!(stdout.contains("Champion: Ada"));
}

#[test]
fn test_record_rejects_unknown_winner_without_writing() {
    let dir = scratch("reject");
    let path = generate_into(&dir);
    let before = fs::read_to_string(&path).unwrap();

    let output = run(&[
        "record",
        "--bracket",
        path.to_str().unwrap(),
        "--match",
        "2",
        "--winner",
        "zed",
        "--version",
        "0",
    ]);
    assert!(!output.status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_unknown_command_fails() {
    let output = run(&["publish"]);
    assert!(!output.status.success());
}
