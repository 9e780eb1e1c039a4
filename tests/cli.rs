use std::fs;

use predicates::prelude::*;
use tempfile::tempdir;

fn cargo_bin() -> assert_cmd::Command {
  assert_cmd::Command::cargo_bin("textbundler").unwrap()
}

#[test]
fn requires_at_least_one_file() {
  cargo_bin()
    .assert()
    .failure()
    .stderr(predicate::str::contains("FILE"));
}

#[test]
fn help_lists_flags() {
  cargo_bin()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("--process-attachments"))
    .stdout(predicate::str::contains("--git-dates"))
    .stdout(predicate::str::contains("--append"));
}

#[test]
fn missing_file_reports_path_and_fails() {
  let dir = tempdir().unwrap();
  let missing = dir.path().join("missing.md");

  cargo_bin()
    .current_dir(dir.path())
    .arg(&missing)
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("missing.md"));
}

#[test]
fn batch_stops_at_first_failure() {
  let dir = tempdir().unwrap();
  let missing = dir.path().join("missing.md");
  let present = dir.path().join("present.md");
  fs::write(&present, "# Present\n").unwrap();

  cargo_bin()
    .current_dir(dir.path())
    .arg(&missing)
    .arg(&present)
    .assert()
    .failure();

  assert!(!dir.path().join("present.md.textbundle").exists());
}

#[test]
fn unreadable_config_is_rejected() {
  let dir = tempdir().unwrap();
  let present = dir.path().join("present.md");
  fs::write(&present, "# Present\n").unwrap();

  cargo_bin()
    .current_dir(dir.path())
    .arg("--config")
    .arg(dir.path().join("nope.json"))
    .arg(&present)
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to load configuration"))
    .stderr(predicate::str::contains("failed to read file"));

  assert!(!dir.path().join("present.md.textbundle").exists());
}

#[test]
fn malformed_config_reports_the_json_error() {
  let dir = tempdir().unwrap();
  let present = dir.path().join("present.md");
  let config = dir.path().join("broken.json");
  fs::write(&present, "# Present\n").unwrap();
  fs::write(&config, "{ \"version\": }").unwrap();

  cargo_bin()
    .current_dir(dir.path())
    .arg("--config")
    .arg(&config)
    .arg(&present)
    .assert()
    .failure()
    .stderr(predicate::str::contains("broken.json"))
    .stderr(predicate::str::contains("invalid JSON"))
    .stderr(predicate::str::contains("line 1 column"));
}
