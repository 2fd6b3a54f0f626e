//! Write a starter scenario.

use std::path::PathBuf;

use glam::{Quat, Vec3};

use camrig_rig_model::pov::{Pov, PovSelector, PovTable};
use camrig_rig_model::scenario::{NodeSpec, RigCommand, Scenario, ScriptStep};
use camrig_rig_model::settings::RigSettings;

pub fn run(name: String, output: PathBuf, force: bool) -> anyhow::Result<()> {
    let path = output.join(format!("{name}.json"));
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let scenario = starter(&name)?;
    scenario
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write scenario: {e}"))?;

    println!("Created scenario '{}' at {}", name, path.display());
    println!("  POVs: run, finish");
    println!("  Nodes: player (moving), chest, finish_line");
    println!();
    println!("Try:");
    println!("  camrig info {}", path.display());
    println!("  camrig simulate {} -o trace.jsonl", path.display());

    Ok(())
}

fn node(name: &str, position: Vec3, velocity: Vec3) -> NodeSpec {
    NodeSpec {
        name: name.to_string(),
        position,
        rotation: Quat::IDENTITY,
        velocity,
        angular_velocity: Vec3::ZERO,
    }
}

fn starter(name: &str) -> anyhow::Result<Scenario> {
    let povs = PovTable::new(vec![
        Pov::new("run", Vec3::new(0.0, 4.0, -8.0), Quat::from_rotation_x(0.3)),
        Pov::new("finish", Vec3::new(0.0, 2.0, -5.0), Quat::IDENTITY).with_fov(40.0),
    ])?;

    Ok(Scenario {
        name: name.to_string(),
        fps: Some(60),
        duration_secs: 6.0,
        rig: RigSettings::new(povs),
        nodes: vec![
            node("player", Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0)),
            node("chest", Vec3::new(3.0, 1.0, 10.0), Vec3::ZERO),
            node("finish_line", Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO),
        ],
        follow: Some("player".to_string()),
        script: vec![
            ScriptStep {
                at_secs: 1.0,
                command: RigCommand::AddFocusPoint {
                    target: "chest".to_string(),
                    copy_rotation: false,
                    move_duration: 0.8,
                    dwell: 0.5,
                    pov: None,
                },
            },
            ScriptStep {
                at_secs: 4.0,
                command: RigCommand::ChangePov {
                    pov: PovSelector::from("finish"),
                    duration: 0.8,
                    curves: None,
                },
            },
            ScriptStep {
                at_secs: 4.0,
                command: RigCommand::ChangeTarget {
                    target: "finish_line".to_string(),
                    duration: 1.0,
                    delay: 0.2,
                    curves: None,
                },
            },
        ],
    })
}
