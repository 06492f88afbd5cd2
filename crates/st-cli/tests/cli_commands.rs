//! Integration tests for the CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn spieltisch() -> Command {
    Command::cargo_bin("spieltisch").unwrap()
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

#[test]
fn roll_sums_with_modifier() {
    spieltisch()
        .args(["roll", "1d6", "1d6", "1d6", "-m", "2", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3d6 +2"))
        .stdout(predicate::str::contains(" = "))
        .stdout(predicate::str::contains("Total:"));
}

#[test]
fn roll_negative_modifier() {
    spieltisch()
        .args(["roll", "1d20", "-m", "-3", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" - 3 = "));
}

#[test]
fn roll_with_extreme_modifier_saturates() {
    spieltisch()
        .args(["roll", "1d20", "-m", "2147483647", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("= 2147483647"));
}

#[test]
fn roll_is_reproducible_with_seed() {
    let first = spieltisch()
        .args(["roll", "1d100", "4dF", "--seed", "99"])
        .output()
        .unwrap();
    let second = spieltisch()
        .args(["roll", "1d100", "4dF", "--seed", "99"])
        .output()
        .unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn roll_listed_shows_no_total() {
    spieltisch()
        .args(["roll", "1d6", "1d6", "--list", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" • "))
        .stdout(predicate::str::contains("Total:").not())
        .stdout(predicate::str::contains(" = ").not());
}

#[test]
fn roll_listed_coin_shows_sides() {
    spieltisch()
        .args(["roll", "coin", "--list", "--seed", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Heads").or(predicate::str::contains("Tails")));
}

#[test]
fn roll_shows_label() {
    spieltisch()
        .args(["roll", "1d20", "-l", "Athletics", "-m", "2", "--seed", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Athletics (2)"));
}

#[test]
fn roll_unknown_command_set_fails() {
    spieltisch()
        .args(["roll", "1d7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command set: 1d7"));
}

#[test]
fn roll_requires_ids() {
    spieltisch().arg("roll").assert().failure();
}

// ---------------------------------------------------------------------------
// dice
// ---------------------------------------------------------------------------

#[test]
fn dice_lists_registry() {
    spieltisch()
        .arg("dice")
        .assert()
        .success()
        .stdout(predicate::str::contains("1d20"))
        .stdout(predicate::str::contains("4dF"))
        .stdout(predicate::str::contains("Heads"))
        .stdout(predicate::str::contains("1 to 100"))
        .stdout(predicate::str::contains("11 command sets"));
}

// ---------------------------------------------------------------------------
// table
// ---------------------------------------------------------------------------

#[test]
fn table_runs_and_stays_in_sync() {
    spieltisch()
        .args(["table", "--players", "2", "--npcs", "1", "--rounds", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("every player in sync"))
        .stdout(predicate::str::contains("Game Master"))
        .stdout(predicate::str::contains("Character #1"))
        .stdout(predicate::str::contains("Player #2"))
        .stdout(predicate::str::contains("4 members (1 NPCs, 2 players)"));
}

#[test]
fn table_without_players() {
    spieltisch()
        .args(["table", "--players", "0", "--npcs", "0", "--rounds", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 members (0 NPCs, 0 players)"));
}

#[test]
fn table_saves_snapshot() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("session.json");
    spieltisch()
        .args(["table", "--players", "1", "--rounds", "1", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot saved"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["gm"]["playerName"], "Game Master");
    assert_eq!(json["gm"]["isGM"], true);
    assert_eq!(json["gm"]["npcs"].as_array().unwrap().len(), 1);
    assert_eq!(json["players"]["peer-1"]["rolls"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_round_trips_saved_table() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("session.json");
    spieltisch()
        .args(["table", "--players", "2", "--npcs", "2", "--rounds", "1", "--out"])
        .arg(&out)
        .assert()
        .success();

    spieltisch()
        .arg("show")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Character #2"))
        .stdout(predicate::str::contains("5 members (2 NPCs, 2 players)"));
}

#[test]
fn show_paused_session() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("paused.json");
    fs::write(
        &file,
        r#"{
  "gm": {
    "id": "gm",
    "playerName": "Game Master",
    "rolls": [],
    "playedDuringTurn": false,
    "private": false,
    "isGM": true,
    "points": "3",
    "npcs": []
  },
  "players": {},
  "goodConfetti": 4,
  "badConfetti": 1,
  "paused": true
}"#,
    )
    .unwrap();

    spieltisch()
        .arg("show")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("paused"))
        .stdout(predicate::str::contains("4 good, 1 bad"));
}

#[test]
fn show_malformed_file_warns_and_shows_default() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("junk.json");
    fs::write(&file, "[1, 2, 3]").unwrap();

    spieltisch()
        .arg("show")
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("not a session snapshot"))
        .stdout(predicate::str::contains("1 members (0 NPCs, 0 players)"));
}

#[test]
fn show_missing_file_fails() {
    spieltisch()
        .args(["show", "/nonexistent/session.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
