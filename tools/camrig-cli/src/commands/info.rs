//! Show scenario information.

use std::path::PathBuf;

use camrig_rig_model::scenario::Scenario;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let scenario =
        Scenario::load(&path).map_err(|e| anyhow::anyhow!("Failed to load scenario: {e}"))?;
    let rig = &scenario.rig;

    println!("Scenario: {}", scenario.name);
    match scenario.fps {
        Some(fps) => println!("  Duration: {:.2}s @ {fps}fps", scenario.duration_secs),
        None => println!("  Duration: {:.2}s (default fps)", scenario.duration_secs),
    }
    println!(
        "  Follow: {}",
        scenario.follow.as_deref().unwrap_or("(none)")
    );
    println!();

    println!("POVs:");
    for (i, pov) in rig.povs.iter().enumerate() {
        let p = pov.local_position;
        println!(
            "  [{i}] {:<12} offset=({:.2}, {:.2}, {:.2}) fov={:.1}",
            pov.name, p.x, p.y, p.z, pov.fov
        );
    }
    println!();

    println!("Follow:");
    println!("  Copy rotation: {}", rig.copy_follow_rotation);
    println!(
        "  Lerp: position={} rotation={}",
        rig.follow_position_lerp, rig.follow_rotation_lerp
    );
    println!("  Focus return: {:.2}s", rig.focus_return_duration);
    println!();

    println!("Nodes:");
    for node in &scenario.nodes {
        let p = node.position;
        if node.is_static() {
            println!("  {:<12} at ({:.2}, {:.2}, {:.2})", node.name, p.x, p.y, p.z);
        } else {
            let v = node.velocity;
            println!(
                "  {:<12} at ({:.2}, {:.2}, {:.2}) moving ({:.2}, {:.2}, {:.2})/s",
                node.name, p.x, p.y, p.z, v.x, v.y, v.z
            );
        }
    }
    println!();

    println!("Script:");
    if scenario.script.is_empty() {
        println!("  (empty)");
    }
    for step in scenario.ordered_script() {
        let json = serde_json::to_string(&step.command)?;
        println!("  {:>7.3}s  {json}", step.at_secs);
    }

    Ok(())
}
