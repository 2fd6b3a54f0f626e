//! Validate a scenario file.

use std::path::PathBuf;

use camrig_rig_core::CameraRig;
use camrig_rig_model::scenario::Scenario;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating scenario at: {}", path.display());

    let scenario =
        Scenario::load(&path).map_err(|e| anyhow::anyhow!("Invalid scenario: {e}"))?;
    CameraRig::new(scenario.rig.clone())
        .map_err(|e| anyhow::anyhow!("Rig settings rejected: {e}"))?;

    println!("  Name: {}", scenario.name);
    println!("  Duration: {:.2}s", scenario.duration_secs);
    println!("  POVs: {}", scenario.rig.povs.len());
    println!("  Nodes: {}", scenario.nodes.len());
    println!("  Script steps: {}", scenario.script.len());

    let last_step = scenario
        .script
        .iter()
        .map(|s| s.at_secs)
        .fold(0.0_f64, f64::max);
    if last_step > scenario.duration_secs {
        println!(
            "\nWarning: script runs until {last_step:.2}s but the scenario ends at {:.2}s.",
            scenario.duration_secs
        );
    }

    println!("\nScenario is valid.");
    Ok(())
}
