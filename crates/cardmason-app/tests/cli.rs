//! Runs the `cardmason` binary against files in a temporary directory.

use std::path::Path;
use std::process::{Command, Output};

const SESSION: &str = r#"{
    "config": { "header": "Gallery" },
    "viewport": { "width": 200, "height": 400 },
    "items": [
        { "id": "a", "measured": { "width": 100, "height": 100 } },
        { "id": "b", "measured": { "width": 100, "height": 100 } },
        { "id": "c", "measured": { "width": 100, "height": 100 } }
    ],
    "steps": [
        { "at_ms": 0, "action": "pointer", "event": { "type": "mouse_down", "position": { "x": 50, "y": 50 } } },
        { "at_ms": 10, "action": "pointer", "event": { "type": "mouse_move", "position": { "x": 150, "y": 50 } } },
        { "at_ms": 20, "action": "pointer", "event": { "type": "mouse_up", "position": { "x": 150, "y": 50 } } },
        { "at_ms": 30, "action": "scroll", "wrapper_top": 0 }
    ]
}"#;

fn cardmason(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cardmason"))
        .args(args)
        .output()
        .unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn replay_reports_events_and_frame() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "session.json", SESSION);

    let report = stdout_json(&cardmason(&["replay", &script]));
    let events = report["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"]["type"], "rearranged");
    assert_eq!(events[0]["event"]["new_order"], 1);
    assert_eq!(events[1]["event"]["type"], "endline_entered");
    assert_eq!(report["columns"], 2);
    assert_eq!(report["frame"]["header"]["content"], "Gallery");
    assert!(report.get("css").is_none());
}

#[test]
fn replay_writes_svg_and_css() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "session.json", SESSION);
    let svg_path = dir.path().join("final.svg");

    let report = stdout_json(&cardmason(&[
        "replay",
        &script,
        "--css",
        "--svg",
        &svg_path.to_string_lossy(),
    ]));
    let css = report["css"].as_array().unwrap();
    assert!(css.iter().any(|node| node["key"] == "masonry-boundary"));
    assert!(css.iter().any(|node| node["key"] == "b-wrapper"));

    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"id="a-wrapper""#));
}

#[test]
fn replay_rejects_bad_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "session.json", SESSION);
    let config = write(dir.path(), "config.json", r#"{ "gestures": { "drag_threshold": -1 } }"#);

    let output = cardmason(&["replay", &script, "--config", &config]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("drag_threshold"));
}

#[test]
fn layout_prints_positions() {
    let dir = tempfile::tempdir().unwrap();
    let items = write(
        dir.path(),
        "items.json",
        r#"[
            { "id": "a", "measured": { "width": 100, "height": 40 } },
            { "id": "b", "measured": { "width": 100, "height": 60 } },
            { "id": "c", "measured": { "width": 100, "height": 30 } }
        ]"#,
    );

    let layout = stdout_json(&cardmason(&["layout", &items, "--wrapper-width", "200"]));
    assert_eq!(layout["columns"], 2);
    assert_eq!(layout["ids"][2], "c");
    assert_eq!(layout["elements"][2]["x"], 0.0);
    assert_eq!(layout["elements"][2]["y"], 40.0);
    assert_eq!(layout["height"], 70.0);
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let output = cardmason(&["layout", &missing.to_string_lossy(), "--wrapper-width", "300"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: I/O error"));
}
