use std::path::PathBuf;

use camrig_rig_core::{RigState, Simulation, SimulationOptions, SimulationReport};
use camrig_rig_model::scenario::Scenario;
use glam::{Quat, Vec3};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("runner-scenario.json")
}

fn run_fixture() -> SimulationReport {
    let scenario = Scenario::load(&fixture_path()).expect("fixture scenario should load");
    Simulation::new(scenario, SimulationOptions::default())
        .expect("fixture scenario should validate")
        .run()
        .expect("fixture scenario should run")
}

#[test]
fn runner_fixture_event_order() {
    let report = run_fixture();
    let events: Vec<(&str, Option<&str>)> = report
        .events
        .iter()
        .map(|e| (e.event, e.detail.as_deref()))
        .collect();

    assert_eq!(
        events,
        vec![
            ("focus_started", None),
            ("pov_change_started", Some("top")),
            ("pov_change_ended", Some("top")),
            ("focus_point_reached", Some("chest")),
            ("focus_point_reached", Some("gate")),
            ("pov_change_started", Some("run")),
            ("pov_change_ended", Some("run")),
            ("focus_finished", None),
            ("pov_change_started", Some("finish")),
            ("pov_change_ended", Some("finish")),
            ("target_change_finished", Some("finish_line")),
        ]
    );
}

#[test]
fn runner_fixture_settles_on_finish_line() {
    let report = run_fixture();
    let last = report.final_frame().expect("trace should not be empty");

    assert_eq!(last.frame, 240);
    assert_eq!(last.state, RigState::Idle);
    assert_eq!(last.pov, "finish");
    assert_eq!(last.follow.as_deref(), Some("finish_line"));
    assert!((last.fov - 40.0).abs() < 1e-3, "fov={}", last.fov);
    assert!((last.holder.position - Vec3::new(0.0, 0.0, 60.0)).length() < 1e-3);
    // The gate's rotation was only borrowed while focusing.
    assert!(last.holder.rotation.abs_diff_eq(Quat::IDENTITY, 1e-4));
    assert!((last.camera_world.position - Vec3::new(0.0, 2.0, 55.0)).length() < 1e-3);
}

#[test]
fn runner_fixture_is_focusing_between_points() {
    let report = run_fixture();
    let focusing: Vec<f64> = report
        .frames
        .iter()
        .filter(|f| f.state == RigState::Focusing)
        .map(|f| f.time_secs)
        .collect();

    let first = focusing.first().copied().unwrap_or_default();
    let last = focusing.last().copied().unwrap_or_default();
    assert!((first - 1.0).abs() < 0.05, "focus began at {first}");
    assert!(last > 3.5 && last < 4.5, "focus ended at {last}");
    assert!(report
        .frames
        .iter()
        .filter(|f| f.state == RigState::Focusing)
        .all(|f| f.follow.is_none()));
}

#[test]
fn runner_fixture_trace_is_jsonl() {
    let report = run_fixture();
    let mut out = Vec::new();
    report.write_jsonl(&mut out).expect("trace should serialize");
    let text = String::from_utf8(out).expect("trace should be utf-8");

    let records = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("valid JSON line"))
        .collect::<Vec<_>>();

    assert_eq!(records.len(), report.frames.len() + report.events.len());
    assert!(records
        .iter()
        .all(|r| r["kind"] == "frame" || r["kind"] == "event"));
}

#[test]
fn unknown_node_in_script_is_rejected() {
    let content = std::fs::read_to_string(fixture_path()).expect("fixture should be readable");
    let mut value: serde_json::Value = serde_json::from_str(&content).expect("fixture is JSON");
    value["script"][0]["command"]["target"] = serde_json::Value::from("treasure");

    let scenario = Scenario::from_json(&value.to_string()).expect("still a well-formed scenario");
    assert!(Simulation::new(scenario, SimulationOptions::default()).is_err());
}
