//! CLI tests: run the built `typefilter` binary and check its JSON output.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

// ============================================================================
// Test Infrastructure
// ============================================================================

fn typefilter_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_typefilter"))
}

/// Run the binary in `dir` with a clean configuration environment.
fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(typefilter_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("TYPEFILTER_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run typefilter")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_model(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("desc.json");
    let model = json!({
        "blah": {
            "Blah": {
                "name": "Blah",
                "attrs": { "x": "float64", "y": "int32" },
                "methods": [
                    {
                        "name": "f",
                        "params": [{ "name": "n", "type": "int32" }],
                        "returns": [["vector", "float64", "const"], "&"]
                    },
                    {
                        "name": "g",
                        "params": [{ "name": "a", "type": [["int32", "const"], "&"] }],
                        "returns": "void"
                    }
                ]
            }
        }
    });
    fs::write(&path, serde_json::to_string_pretty(&model).unwrap()).unwrap();
    path
}

// ============================================================================
// filter
// ============================================================================

#[test]
fn filter_dry_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);
    let before = fs::read_to_string(&model).unwrap();

    let output = run(dir.path(), &["filter", "--model", "desc.json", "--skip", "float64"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["config_source"], "cli_flag");
    assert_eq!(json["summary"]["attributes_removed"], 1);
    assert_eq!(json["summary"]["methods_removed"], 1);
    assert!(json.get("written").is_none());
    assert_eq!(fs::read_to_string(&model).unwrap(), before);
}

#[test]
fn filter_writes_output_file() {
    let dir = TempDir::new().unwrap();
    write_model(&dir);

    let output = run(
        dir.path(),
        &[
            "filter",
            "--model",
            "desc.json",
            "--skip-for",
            "Blah=((int32, const), &)",
            "--output",
            "filtered.json",
        ],
    );
    assert!(output.status.success());

    let filtered: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("filtered.json")).unwrap())
            .unwrap();
    let methods = filtered["blah"]["Blah"]["methods"].as_array().unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0]["name"], "f");
    assert_eq!(filtered["blah"]["Blah"]["attrs"]["x"], "float64");
}

#[test]
fn filter_in_place_uses_project_config() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);
    fs::write(
        dir.path().join("typefilter.toml"),
        "[skiptypes]\nBlah = [\"int32\"]\n",
    )
    .unwrap();

    let output = run(dir.path(), &["filter", "--model", "desc.json", "--in-place"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["config_source"], "project_config");
    assert!(json["written"].as_str().unwrap().ends_with("desc.json"));

    let filtered: Value = serde_json::from_str(&fs::read_to_string(&model).unwrap()).unwrap();
    assert_eq!(filtered["blah"]["Blah"]["attrs"], json!({ "x": "float64" }));
    assert_eq!(filtered["blah"]["Blah"]["methods"], json!([]));
}

#[test]
fn filter_without_skiptypes_is_noop() {
    let dir = TempDir::new().unwrap();
    write_model(&dir);

    let output = run(dir.path(), &["filter", "--model", "desc.json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["config_source"], "default");
    assert!(json["skiptypes"].is_null());
    assert_eq!(json["removals"], json!([]));
}

#[test]
fn filter_in_place_without_removals_leaves_file_bytes() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("desc.json");
    let original = r#"{"m": {"K": {"name": "K", "attrs": {}, "methods": [
        {"name": "k", "params": [{"name": "r", "type": "int32", "default": 1}]}
    ]}}}"#;
    fs::write(&model, original).unwrap();

    for args in [
        &["filter", "--model", "desc.json", "--in-place"][..],
        &["filter", "--model", "desc.json", "--in-place", "--skip", "float64"][..],
    ] {
        let output = run(dir.path(), args);
        assert!(output.status.success());
        assert!(stdout_json(&output).get("written").is_none());
        assert_eq!(fs::read_to_string(&model).unwrap(), original);
    }
}

#[test]
fn filter_output_without_skiptypes_preserves_model() {
    let dir = TempDir::new().unwrap();
    let input = json!({
        "m": {
            "K": {
                "name": "K",
                "attrs": {},
                "methods": [
                    { "name": "k", "params": [{ "name": "r", "type": "int32", "default": 1 }] },
                    { "name": "a", "params": [], "returns": "void" }
                ]
            }
        }
    });
    fs::write(dir.path().join("desc.json"), input.to_string()).unwrap();

    let output = run(
        dir.path(),
        &["filter", "--model", "desc.json", "--output", "out.json"],
    );
    assert!(output.status.success());
    let written: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
    assert_eq!(written, input);
}

#[test]
fn filter_duplicate_method_is_input_error() {
    let dir = TempDir::new().unwrap();
    let model = json!({
        "m": {
            "A": {
                "name": "A",
                "attrs": {},
                "methods": [
                    { "name": "f", "params": [], "returns": "int32" },
                    { "name": "f", "params": [], "returns": "float64" }
                ]
            }
        }
    });
    fs::write(dir.path().join("desc.json"), model.to_string()).unwrap();

    let output = run(dir.path(), &["filter", "--model", "desc.json", "--skip", "int32"]);
    assert_eq!(output.status.code(), Some(3));
    let json = stdout_json(&output);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("duplicate method signature"));
}

#[test]
fn filter_bad_config_shape_is_input_error() {
    let dir = TempDir::new().unwrap();
    write_model(&dir);
    fs::write(dir.path().join("bad.toml"), "skiptypes = \"float64\"\n").unwrap();

    let output = run(
        dir.path(),
        &["filter", "--model", "desc.json", "--config", "bad.toml"],
    );
    assert_eq!(output.status.code(), Some(3));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
}

#[test]
fn filter_bad_pattern_is_invalid_arguments() {
    let dir = TempDir::new().unwrap();
    write_model(&dir);

    let output = run(
        dir.path(),
        &["filter", "--model", "desc.json", "--skip", "((int32, const)"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_json(&output)["error"]["code"], 2);
}

#[test]
fn filter_empty_tuple_pattern_is_rejected() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);
    let before = fs::read_to_string(&model).unwrap();

    let output = run(
        dir.path(),
        &["filter", "--model", "desc.json", "--skip", "()", "--in-place"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(fs::read_to_string(&model).unwrap(), before);
}

#[test]
fn filter_missing_model_is_input_error() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["filter", "--model", "nope.json", "--skip", "int32"]);
    assert_eq!(output.status.code(), Some(3));
}

// ============================================================================
// match
// ============================================================================

#[test]
fn match_explains_anywhere_match() {
    let dir = TempDir::new().unwrap();
    let output = run(
        dir.path(),
        &[
            "match",
            "--pattern",
            "float64",
            "--type",
            "((vector, float64, const), &)",
        ],
    );
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["exact"], "no_match");
    assert_eq!(json["anywhere"], true);
    assert_eq!(json["leaves"], json!(["vector", "float64", "const", "&"]));
}
