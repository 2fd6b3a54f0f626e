//! Show or create the app configuration.

use anyhow::Context;
use camrig_common::config::{config_file_path, AppConfig};

pub fn run(init: bool) -> anyhow::Result<()> {
    let path = config_file_path();

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            AppConfig::default()
                .save()
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default config to {}", path.display());
        }
    }

    let status = if path.exists() {
        "present"
    } else {
        "not found, using defaults"
    };
    println!("Config file: {} ({status})", path.display());
    println!("{}", serde_json::to_string_pretty(&AppConfig::load())?);
    Ok(())
}
