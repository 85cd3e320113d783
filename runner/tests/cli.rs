//! CLI tests for the `agilemind` binary.
//!
//! Spawns the binary with a shell-script collaborator standing in for the
//! model CLI and checks exit codes and written output.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::Command;

use agilemind::core::trace::{EXHAUSTION_MESSAGE, RunResult};
use agilemind::exit_codes;
use agilemind::io::config::{CollaboratorConfig, RunnerConfig, load_config, write_config};

fn write_script_config(path: &Path, script: &str, max_iterations: u32) {
    let cfg = RunnerConfig {
        max_iterations,
        collaborator: CollaboratorConfig {
            command: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
        },
        ..RunnerConfig::default()
    };
    write_config(path, &cfg).expect("write config");
}

#[test]
fn agents_lists_the_waterfall_pipeline() {
    let output = Command::new(env!("CARGO_BIN_EXE_agilemind"))
        .arg("agents")
        .output()
        .expect("agilemind agents");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let agents: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let names: Vec<&str> = agents
        .as_array()
        .expect("array")
        .iter()
        .map(|agent| agent["name"].as_str().expect("name"))
        .collect();
    assert_eq!(
        names,
        vec!["demand_analyst", "architect", "programmer", "quality_assurance"]
    );
    assert_eq!(agents[3]["handoffs"], serde_json::json!(["programmer"]));
}

#[test]
fn dev_writes_output_and_prints_response() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("agilemind.toml");
    write_script_config(
        &config_path,
        r#"cat >/dev/null; printf '{"content":"requirements ready","handoff":null,"tool_calls":[]}'"#,
        5,
    );
    let out_dir = temp.path().join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_agilemind"))
        .arg("--config")
        .arg(&config_path)
        .args(["dev", "--demand", "a todo app", "--output"])
        .arg(&out_dir)
        .output()
        .expect("agilemind dev");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "requirements ready"
    );
    let written = fs::read_to_string(out_dir.join("output.txt")).expect("output.txt");
    let result: RunResult = serde_json::from_str(&written).expect("parse output");
    assert_eq!(result.agent, "demand_analyst");
    assert_eq!(result.execution_trace.len(), 1);
    assert_eq!(result.execution_trace[0].input, "a todo app");
}

#[test]
fn dev_accepts_an_empty_demand() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("agilemind.toml");
    write_script_config(
        &config_path,
        r#"cat >/dev/null; printf '{"content":"nothing to build","handoff":null,"tool_calls":[]}'"#,
        5,
    );
    let out_dir = temp.path().join("out");

    let status = Command::new(env!("CARGO_BIN_EXE_agilemind"))
        .arg("--config")
        .arg(&config_path)
        .args(["dev", "--demand", "", "--output"])
        .arg(&out_dir)
        .status()
        .expect("agilemind dev");

    assert_eq!(status.code(), Some(exit_codes::OK));
    let written = fs::read_to_string(out_dir.join("output.txt")).expect("output.txt");
    let result: RunResult = serde_json::from_str(&written).expect("parse output");
    assert_eq!(result.execution_trace[0].input, "");
    assert_eq!(result.response, "nothing to build");
}

#[test]
fn dev_exits_with_exhausted_code_when_cap_is_hit() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("agilemind.toml");
    write_script_config(
        &config_path,
        r#"cat >/dev/null; printf '{"content":null,"handoff":null,"tool_calls":[{"tool":"search","result":"nothing"}]}'"#,
        2,
    );
    let out_dir = temp.path().join("out");

    let status = Command::new(env!("CARGO_BIN_EXE_agilemind"))
        .arg("--config")
        .arg(&config_path)
        .args(["dev", "--demand", "x", "--output"])
        .arg(&out_dir)
        .status()
        .expect("agilemind dev");

    assert_eq!(status.code(), Some(exit_codes::EXHAUSTED));
    let written = fs::read_to_string(out_dir.join("output.txt")).expect("output.txt");
    let result: RunResult = serde_json::from_str(&written).expect("parse output");
    assert_eq!(result.response, EXHAUSTION_MESSAGE);
    assert_eq!(result.execution_trace.len(), 2);
}

#[test]
fn dev_fails_on_undeclared_handoff() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("agilemind.toml");
    write_script_config(
        &config_path,
        r#"cat >/dev/null; printf '{"content":null,"handoff":"programmer","tool_calls":[]}'"#,
        5,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_agilemind"))
        .arg("--config")
        .arg(&config_path)
        .args(["dev", "--demand", "x", "--output"])
        .arg(temp.path().join("out"))
        .output()
        .expect("agilemind dev");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not declare"));
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("agilemind.toml");

    let status = Command::new(env!("CARGO_BIN_EXE_agilemind"))
        .arg("init")
        .arg("--config")
        .arg(&config_path)
        .status()
        .expect("agilemind init");
    assert_eq!(status.code(), Some(exit_codes::OK));
    assert_eq!(
        load_config(&config_path).expect("load"),
        RunnerConfig::default()
    );

    fs::write(&config_path, "max_iterations = 3\n").expect("edit config");
    let status = Command::new(env!("CARGO_BIN_EXE_agilemind"))
        .arg("init")
        .arg("--config")
        .arg(&config_path)
        .status()
        .expect("agilemind init again");
    assert_eq!(status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&config_path).expect("load").max_iterations, 3);
}
