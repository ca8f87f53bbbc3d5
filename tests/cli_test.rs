//! Integration test: the modelwire binary loads a directory and prints what it found

use assert_cmd::prelude::*;
use modelwire::utils::test::{model_toml, write_file};
use std::process::Command;
use tempfile::tempdir;

const CONFIG: &str = "connection_string = \"sqlite::memory:\"\nmodels = [\"models/*.toml\"]\n";

/// `models` lists each model with its table and associations.
#[test]
fn test_models_lists_loaded_models() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "modelwire.toml", CONFIG);
    write_file(dir.path(), "models/user.toml", &model_toml("User", &[("has_many", "Post")]));
    write_file(dir.path(), "models/post.toml", &model_toml("Post", &[("belongs_to", "User")]));

    let output = Command::new(assert_cmd::cargo::cargo_bin!("modelwire"))
        .arg("models")
        .arg("--dir")
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Post (posts)\n  belongs_to User [user_id -> id]"));
    assert!(stdout.contains("User (users)\n  has_many Post [user_id -> id]"));
}

/// `schema` prints one CREATE TABLE statement per model.
#[test]
fn test_schema_prints_ddl() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "modelwire.toml", CONFIG);
    write_file(dir.path(), "models/tag.toml", &model_toml("Tag", &[]));

    let output = Command::new(assert_cmd::cargo::cargo_bin!("modelwire"))
        .current_dir(dir.path())
        .arg("schema")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("CREATE TABLE IF NOT EXISTS \"tags\""));
}

/// Without any connection settings the binary fails with an error line.
#[test]
fn test_missing_connection_exits_non_zero() {
    let dir = tempdir().unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("modelwire"))
        .arg("models")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure();
}
