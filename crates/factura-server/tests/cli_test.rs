//! Command-line integration tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `factura` isolated from the caller's key, config and `.env`.
fn factura(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("factura").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("VITE_OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_serve_refuses_to_start_without_api_key() {
    let home = TempDir::new().unwrap();

    factura(&home)
        .args(["serve", "--bind", "127.0.0.1:0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY is not set"));
}

#[test]
fn test_parse_missing_input() {
    let home = TempDir::new().unwrap();

    factura(&home)
        .args(["parse", "does-not-exist.pdf"])
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_parse_reports_unreadable_pdf() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("broken.pdf");
    std::fs::write(&input, b"not a pdf at all").unwrap();

    factura(&home)
        .arg("parse")
        .arg(&input)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", "http://127.0.0.1:9")
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#"{"error":"PDF error"#))
        .stderr(predicate::str::contains("Extraction failed"));
}

#[test]
fn test_config_init_then_show() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("factura.json");

    factura(&home)
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(path.exists());

    factura(&home)
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    factura(&home)
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .env("OPENAI_MODEL", "gpt-4o")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model\": \"gpt-4o\""))
        .stdout(predicate::str::contains("http://localhost:5173"));
}

#[test]
fn test_config_rejects_invalid_override() {
    let home = TempDir::new().unwrap();

    factura(&home)
        .args(["config", "show"])
        .env("FACTURA_STRICT_SCHEMA", "maybe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FACTURA_STRICT_SCHEMA"));
}
