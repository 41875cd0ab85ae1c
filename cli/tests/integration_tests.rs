use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_schema-args");

/// Nested `Config` schema in the shape schemars emits.
fn write_config_schema(dir: &TempDir) -> PathBuf {
    let schema = json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Config",
        "description": "Demo settings",
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": "Your name" },
            "child": { "$ref": "#/$defs/ChildConfig" },
            "tags": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["name", "child"],
        "$defs": {
            "ChildConfig": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "age": { "type": "integer", "format": "int64", "default": 3 },
                    "is_active": { "type": "boolean" }
                },
                "required": ["name", "is_active"]
            }
        }
    });
    write_json(dir, "config.json", &schema)
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).expect("failed to write schema");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to run schema-args")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_prints_table_by_default() {
    let dir = TempDir::new().unwrap();
    let schema = write_config_schema(&dir);

    let output = run(&["inspect", "--schema", path_str(&schema)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Schema: Config  Arguments: 5"));
    assert!(stdout.contains("--enable-child.is-active, --disable-child.is-active"));
    assert!(stdout.contains("\nChildConfig:\n"));
}

#[test]
fn inspect_json_lists_arguments_in_order() {
    let dir = TempDir::new().unwrap();
    let schema = write_config_schema(&dir);

    let output = run(&["inspect", "--schema", path_str(&schema), "--format", "json"]);
    let value = stdout_json(&output);
    let paths: Vec<&str> = value["arguments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|argument| argument["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["name", "child.name", "child.age", "child.is_active", "tags"]);
}

#[test]
fn inspect_applies_config_file() {
    let dir = TempDir::new().unwrap();
    let schema = write_config_schema(&dir);
    let config = dir.path().join("cli.yaml");
    fs::write(
        &config,
        "enable_prefix: \"--\"\ndisable_prefix: \"--no-\"\noverrides:\n  child.name:\n    long: child-name\n",
    )
    .unwrap();

    let output = run(&[
        "inspect",
        "--schema",
        path_str(&schema),
        "--config",
        path_str(&config),
        "--format",
        "json",
    ]);
    let value = stdout_json(&output);
    assert_eq!(value["arguments"][1]["long"], json!("--child-name"));
    assert_eq!(value["arguments"][3]["long"], json!("--child.is-active"));
    assert_eq!(value["arguments"][3]["disable"], json!("--no-child.is-active"));
}

#[test]
fn inspect_reports_collisions() {
    let dir = TempDir::new().unwrap();
    let schema = write_json(
        &dir,
        "clash.json",
        &json!({
            "title": "Clash",
            "type": "object",
            "properties": {
                "is_active": { "type": "string" },
                "is-active": { "type": "string" }
            }
        }),
    );

    let output = run(&["inspect", "--schema", path_str(&schema)]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: flag collision on `--is-active`"), "stderr: {stderr}");
}

#[test]
fn inspect_missing_schema_file_fails() {
    let output = run(&["inspect", "--schema", "/nonexistent/schema.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load schema"));
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_reconstructs_nested_value() {
    let dir = TempDir::new().unwrap();
    let schema = write_config_schema(&dir);

    let output = run(&[
        "parse",
        "--schema",
        path_str(&schema),
        "--",
        "--name",
        "A",
        "--child.name",
        "B",
        "--enable-child.is-active",
        "--tags",
        "x",
        "y",
    ]);
    assert_eq!(
        stdout_json(&output),
        json!({
            "name": "A",
            "child": { "name": "B", "age": 3, "is_active": true },
            "tags": ["x", "y"]
        })
    );
}

#[test]
fn parse_rejects_conflicting_boolean_flags() {
    let dir = TempDir::new().unwrap();
    let schema = write_config_schema(&dir);

    let output = run(&[
        "parse",
        "--schema",
        path_str(&schema),
        "--",
        "--name",
        "A",
        "--child.name",
        "B",
        "--enable-child.is-active",
        "--disable-child.is-active",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("conflicting flags for `child.is_active`"));
}

#[test]
fn parse_usage_errors_exit_with_clap_status() {
    let dir = TempDir::new().unwrap();
    let schema = write_config_schema(&dir);

    let output = run(&["parse", "--schema", path_str(&schema), "--", "--name", "A"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn parse_with_subcommands() {
    let dir = TempDir::new().unwrap();
    let add = write_json(
        &dir,
        "add.json",
        &json!({
            "title": "Add",
            "type": "object",
            "properties": { "integer": { "type": "integer" } },
            "required": ["integer"]
        }),
    );
    let scale = write_json(
        &dir,
        "scale.json",
        &json!({
            "title": "Scale",
            "type": "object",
            "properties": { "integer": { "type": "number", "default": 1.5 } }
        }),
    );
    let add_spec = format!("add={}", path_str(&add));
    let scale_spec = format!("scale={}", path_str(&scale));

    let output = run(&[
        "parse", "--command", &add_spec, "--command", &scale_spec, "--", "scale",
    ]);
    assert_eq!(
        stdout_json(&output),
        json!({ "command": "scale", "value": { "integer": 1.5 } })
    );

    let output = run(&[
        "parse", "--command", &add_spec, "--command", &scale_spec, "--", "add", "-i", "-4",
    ]);
    assert_eq!(
        stdout_json(&output),
        json!({ "command": "add", "value": { "integer": -4 } })
    );
}

#[test]
fn parse_requires_a_schema_source() {
    let output = run(&["parse", "--", "--name", "A"]);
    assert_eq!(output.status.code(), Some(2));
}
