use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn network_dir() -> String {
    repo_path("test_data/pypsa/three_bus")
        .to_str()
        .unwrap()
        .to_string()
}

/// The binary with an empty config directory, so a user's copper.toml is ignored.
fn copper(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("copper").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

#[test]
fn plot_prints_figure_json() {
    let home = tempdir().unwrap();
    let output = copper(&home)
        .args(["plot", &network_dir(), "--mode", "net_power"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let figure: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(figure["data"].as_array().unwrap().len(), 15);
    assert_eq!(figure["data"][4]["marker"]["color"][0], -59.5);
    assert_eq!(figure["data"][4]["visible"], true);
    assert_eq!(figure["data"][2]["marker"]["symbol"], "circle");
    assert_eq!(figure["layout"]["mapbox"]["style"], "open-street-map");
}

#[test]
fn plot_selects_the_requested_snapshot() {
    let home = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("curtailment.json");
    copper(&home)
        .args([
            "plot",
            &network_dir(),
            "--mode",
            "curtailment",
            "--technology",
            "wind",
            "--snapshot",
            "2",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    let figure: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let data = figure["data"].as_array().unwrap();
    assert_eq!(data.len(), 6);
    assert_eq!(data[4]["visible"], true);
    assert_eq!(data[0]["visible"], false);
    assert_eq!(figure["layout"]["sliders"][0]["active"], 2);
}

#[test]
fn plot_rejects_unknown_mode() {
    let home = tempdir().unwrap();
    copper(&home)
        .args(["plot", &network_dir(), "--mode", "voltage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown display mode: \"voltage\""));
}

#[test]
fn plot_html_output_writes_dashboard() {
    let home = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("prices.html");
    copper(&home)
        .args([
            "plot",
            &network_dir(),
            "--mode",
            "marginal_price",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<title>Copper Sushi</title>"));
    assert!(html.contains("Marginal price [EUR/MWh]"));
}

#[test]
fn dashboard_uses_config_file() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    let config = work.path().join("copper.toml");
    fs::write(
        &config,
        "[map]\nzoom = 6.0\n\n[dashboard]\ntitle = \"North Sea\"\n",
    )
    .unwrap();
    let out = work.path().join("map.html");
    copper(&home)
        .args([
            "--config",
            config.to_str().unwrap(),
            "dashboard",
            &network_dir(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<title>North Sea</title>"));
    assert!(html.contains("\"zoom\":6.0"));
    assert!(html.contains("\"label\":\"02:00:00\""));
}

#[test]
fn missing_config_file_fails() {
    let home = tempdir().unwrap();
    copper(&home)
        .args(["--config", "/nonexistent/copper.toml", "inspect", &network_dir()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading config"));
}

#[test]
fn snapshot_prints_node_table() {
    let home = tempdir().unwrap();
    copper(&home)
        .args(["snapshot", &network_dir(), "--index", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot 2013-01-01 00:00:00"))
        .stdout(predicate::str::contains("-59.50 MW"))
        .stdout(predicate::str::contains("Combined-Cycle Gas 40.00/476.00"));
}

#[test]
fn snapshot_json_groups_carriers() {
    let home = tempdir().unwrap();
    let output = copper(&home)
        .args([
            "snapshot",
            &network_dir(),
            "--index",
            "1",
            "--format",
            "json",
            "--group-carriers",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["snapshot"], "2013-01-01 02:00:00");
    let wind = &report["nodes"]["1005"]["generators"]["wind"];
    assert!((wind["p"].as_f64().unwrap() - (2.965762 + 0.032157)).abs() < 1e-9);
}

#[test]
fn snapshot_index_out_of_range_fails() {
    let home = tempdir().unwrap();
    copper(&home)
        .args(["snapshot", &network_dir(), "--index", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn inspect_summarizes_network() {
    let home = tempdir().unwrap();
    copper(&home)
        .args(["inspect", &network_dir()])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Buses\s+3").unwrap())
        .stdout(predicate::str::is_match(r"Links\s+1").unwrap())
        .stdout(predicate::str::contains("2013-01-01 02:00:00"))
        .stdout(predicate::str::contains("3/3"));
}

#[test]
fn missing_network_folder_fails() {
    let home = tempdir().unwrap();
    let empty = tempdir().unwrap();
    copper(&home)
        .args(["inspect", empty.path().join("absent").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
