//! Run a scenario.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use camrig_common::config::AppConfig;
use camrig_rig_core::{Simulation, SimulationOptions};
use camrig_rig_model::scenario::Scenario;

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    fps: Option<u32>,
    stride: Option<u32>,
) -> anyhow::Result<()> {
    tracing::debug!(path = %path.display(), "loading scenario");
    let mut scenario = Scenario::load(&path)
        .with_context(|| format!("Failed to load scenario {}", path.display()))?;
    if fps.is_some() {
        scenario.fps = fps;
    }

    let mut options = SimulationOptions::from_defaults(&config.simulation);
    if let Some(stride) = stride {
        options.trace_stride = stride;
    }

    let report = Simulation::new(scenario, options)
        .context("Failed to set up simulation")?
        .run()
        .context("Simulation failed")?;

    match output {
        Some(out_path) => {
            let file = File::create(&out_path)
                .with_context(|| format!("Failed to create {}", out_path.display()))?;
            let mut writer = BufWriter::new(file);
            report.write_jsonl(&mut writer)?;
            writer.flush()?;

            println!("Simulated '{}' at {}fps", report.scenario, report.fps);
            println!("  Frames traced: {}", report.frames.len());
            println!("  Events: {}", report.events.len());
            for event in &report.events {
                match &event.detail {
                    Some(detail) => {
                        println!("    {:>7.3}s  {} ({detail})", event.time_secs, event.event)
                    }
                    None => println!("    {:>7.3}s  {}", event.time_secs, event.event),
                }
            }
            if let Some(last) = report.final_frame() {
                let p = last.camera_world.position;
                println!(
                    "  Final: pov={} fov={:.1} camera=({:.2}, {:.2}, {:.2})",
                    last.pov, last.fov, p.x, p.y, p.z
                );
            }
            println!("Trace written to {}", out_path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            report.write_jsonl(&mut lock)?;
            lock.flush()?;
        }
    }

    Ok(())
}
