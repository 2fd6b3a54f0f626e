//! camrig CLI: run and inspect camera rig scenarios offline.
//!
//! Usage:
//!   camrig simulate <PATH>     Run a scenario and write its trace
//!   camrig validate <PATH>     Check a scenario file
//!   camrig info <PATH>         Show POVs, nodes and the script timeline
//!   camrig init <NAME>         Write a starter scenario
//!   camrig config              Show the active configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "camrig",
    about = "Follow-camera rig simulator for runner games",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and write the per-frame trace as JSON lines
    Simulate {
        /// Path to the scenario file
        path: PathBuf,

        /// Trace output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame rate override
        #[arg(long)]
        fps: Option<u32>,

        /// Keep every N-th frame in the trace
        #[arg(long)]
        stride: Option<u32>,
    },

    /// Validate a scenario file
    Validate {
        /// Path to the scenario file
        path: PathBuf,
    },

    /// Show scenario information
    Info {
        /// Path to the scenario file
        path: PathBuf,
    },

    /// Create a starter scenario
    Init {
        /// Scenario name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the active configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = camrig_common::config::AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    logging.json |= cli.log_json;
    camrig_common::logging::init_logging(&logging)?;

    match cli.command {
        Commands::Simulate {
            path,
            output,
            fps,
            stride,
        } => commands::simulate::run(&config, path, output, fps, stride),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Info { path } => commands::info::run(path),
        Commands::Init {
            name,
            output,
            force,
        } => commands::init::run(name, output, force),
        Commands::Config { init } => commands::config::run(init),
    }
}
