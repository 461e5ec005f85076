//! End-to-end tests for the `convo-edit` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A command isolated from user and project configuration.
fn convo_edit(home: &Path) -> Command {
    let config = home.join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "").unwrap();
    }
    let mut cmd = Command::cargo_bin("convo-edit").unwrap();
    cmd.current_dir(home)
        .env_remove("CONVO_EDIT_OUTPUT")
        .env_remove("CONVO_EDIT_JSON")
        .arg("--config")
        .arg(&config);
    cmd
}

#[test]
fn test_check_reports_bad_lines_with_parse_exit_code() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("check")
        .arg(fixture_path("mixed.jsonl"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Failed lines:   2"))
        .stderr(predicate::str::contains("2 of 7 lines failed to parse"));
}

#[test]
fn test_check_clean_file_succeeds() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("check")
        .arg(fixture_path("extra_keys.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversations:  2"));
}

#[test]
fn test_missing_file_exit_code() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .args(["list", "nope.jsonl"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_list_text_output() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("list")
        .arg(fixture_path("mixed.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversations (3 of 3):"))
        .stdout(predicate::str::contains(
            "Conversation 2 (3 messages)  Be terse.",
        ))
        .stderr(predicate::str::contains("2 lines could not be parsed"));
}

#[test]
fn test_list_quiet_hides_parse_warning() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("--quiet")
        .arg("list")
        .arg(fixture_path("mixed.jsonl"))
        .assert()
        .success()
        .stderr(predicate::str::contains("could not be parsed").not());
}

#[test]
fn test_list_json_output() {
    let home = TempDir::new().unwrap();
    let output = convo_edit(home.path())
        .args(["--json", "list", "-Q", "paris"])
        .arg(fixture_path("mixed.jsonl"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let positions: Vec<u64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["position"].as_u64().unwrap())
        .collect();
    assert_eq!(positions, vec![1, 3]);
}

#[test]
fn test_search_count() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .args(["search", "--count"])
        .arg(fixture_path("mixed.jsonl"))
        .arg("PARIS")
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_show_out_of_range_is_usage_error() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("show")
        .arg(fixture_path("mixed.jsonl"))
        .arg("9")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid edit target"));
}

#[test]
fn test_show_prints_messages() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("show")
        .arg(fixture_path("mixed.jsonl"))
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] assistant"))
        .stdout(predicate::str::contains("    Paris."));
}

#[test]
fn test_edit_writes_output_file() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("edited.jsonl");

    convo_edit(home.path())
        .arg("edit")
        .arg(fixture_path("mixed.jsonl"))
        .args(["-c", "1", "-m", "1", "--content", "Paris, of course."])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), 3);
    assert!(written.contains("Paris, of course."));
    assert!(!written.contains("not json at all"));
}

#[test]
fn test_edit_in_place() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("data.jsonl");
    std::fs::copy(fixture_path("extra_keys.jsonl"), &file).unwrap();

    convo_edit(home.path())
        .arg("edit")
        .arg(&file)
        .args(["-c", "2", "-m", "0", "--content", "good evening", "--in-place"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.contains("\"content\":\"good evening\""));
    assert!(written.contains("\"weight\":0.5"));
    assert!(written.contains("\"tags\":[\"a\",\"b\"]"));
}

#[test]
fn test_edit_invalid_message_leaves_file_alone() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("data.jsonl");
    std::fs::copy(fixture_path("extra_keys.jsonl"), &file).unwrap();
    let before = std::fs::read_to_string(&file).unwrap();

    convo_edit(home.path())
        .arg("edit")
        .arg(&file)
        .args(["-c", "1", "-m", "5", "--content", "x", "-i"])
        .assert()
        .code(64);

    assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn test_edit_in_place_refuses_to_drop_bad_lines() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("data.jsonl");
    std::fs::write(
        &file,
        "{\"messages\":[{\"role\":\"user\",\"content\":\"hi\"}]}\n\
         {\"messages\":[{\"role\":\"assistant\",\"content\":null,\"tool_calls\":[]}]}\n\
         not json\n",
    )
    .unwrap();
    let before = std::fs::read_to_string(&file).unwrap();

    convo_edit(home.path())
        .arg("edit")
        .arg(&file)
        .args(["-c", "1", "-m", "0", "--content", "hello", "-i"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--drop-invalid"));

    assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn test_edit_in_place_mixed_fixture_is_refused() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("mixed.jsonl");
    std::fs::copy(fixture_path("mixed.jsonl"), &file).unwrap();
    let before = std::fs::read_to_string(&file).unwrap();

    convo_edit(home.path())
        .arg("edit")
        .arg(&file)
        .args(["-c", "1", "-m", "1", "--content", "Lyon.", "-i"])
        .assert()
        .code(2);

    assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn test_edit_in_place_drop_invalid() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("mixed.jsonl");
    std::fs::copy(fixture_path("mixed.jsonl"), &file).unwrap();

    convo_edit(home.path())
        .arg("edit")
        .arg(&file)
        .args(["-c", "1", "-m", "1", "--content", "Lyon.", "-i", "--drop-invalid"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&file).unwrap();
    assert_eq!(written.lines().count(), 3);
    assert!(written.contains("Lyon."));
    assert!(!written.contains("not json at all"));
}

#[test]
fn test_parse_warning_printed_once() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("list")
        .arg(fixture_path("mixed.jsonl"))
        .assert()
        .success()
        .stderr(predicate::function(|err: &str| {
            err.matches("2 lines could not be parsed").count() == 1
        }));
}

#[test]
fn test_edit_requires_content() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("edit")
        .arg(fixture_path("mixed.jsonl"))
        .args(["-c", "1", "-m", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--content"));
}

#[test]
fn test_export_to_stdout() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .arg("export")
        .arg(fixture_path("mixed.jsonl"))
        .args(["-Q", "terse"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\"messages\":[{\"role\":\"system\""))
        .stdout(predicate::str::ends_with("]}\n"));
}

#[test]
fn test_export_empty_collection_fails() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("empty.jsonl");
    std::fs::write(&file, "\nnot json\n").unwrap();

    convo_edit(home.path())
        .arg("export")
        .arg(&file)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Nothing to export"));
}

#[test]
fn test_export_trailing_newline_to_file() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out.jsonl");

    convo_edit(home.path())
        .arg("export")
        .arg(fixture_path("extra_keys.jsonl"))
        .arg("--out")
        .arg(&out)
        .arg("--trailing-newline")
        .assert()
        .success();

    assert!(std::fs::read_to_string(&out).unwrap().ends_with("]}\n"));
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .args(["config", "set", "display.preview_width", "12"])
        .assert()
        .success();

    convo_edit(home.path())
        .args(["config", "get", "display.preview_width"])
        .assert()
        .success()
        .stdout("12\n");
}

#[test]
fn test_config_unknown_key() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .args(["config", "get", "editor.nope"])
        .assert()
        .failure();
}

#[test]
fn test_strict_config_makes_list_fail() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "[editor]\nstrict = true\n").unwrap();

    convo_edit(home.path())
        .arg("list")
        .arg(fixture_path("mixed.jsonl"))
        .assert()
        .code(2);
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    convo_edit(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("convo-edit"));
}
