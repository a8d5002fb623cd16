//! Media Composer CLI: layout math and pointer-script replays.
//!
//! Usage:
//!   composer layout [OPTIONS]        Compute one entity's display geometry
//!   composer replay <SCENE>          Replay a pointer script against a scene
//!   composer config                  Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use composer_layout_model::{Dimension, Mask, PositionModeKind, Resolution};

mod commands;

#[derive(Parser)]
#[command(
    name = "composer",
    about = "Interactive media compositing: layout, hit testing, and pointer replay",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/media-composer/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute display geometry for one source and print it as JSON
    Layout {
        /// Container size, e.g. 1280x720
        #[arg(long, value_parser = commands::layout::parse_size, default_value = "1280x720")]
        container: Resolution,

        /// Native source size, e.g. 1920x1080
        #[arg(long, value_parser = commands::layout::parse_size)]
        native: Resolution,

        /// Position mode: contain | cover | fixed
        #[arg(long, default_value = "cover")]
        mode: PositionModeKind,

        /// Mask: none | circle
        #[arg(long, default_value = "none")]
        mask: Mask,

        /// Fixed-mode left offset in pixels
        #[arg(long, allow_hyphen_values = true)]
        x: Option<f64>,

        /// Fixed-mode top offset in pixels
        #[arg(long, allow_hyphen_values = true)]
        y: Option<f64>,

        /// Fixed-mode width: pixels ("320") or percent ("50%")
        #[arg(long)]
        width: Option<Dimension>,

        /// Fixed-mode height: pixels ("240") or percent ("50%")
        #[arg(long)]
        height: Option<Dimension>,
    },

    /// Build a composer from a scene file, feed its pointer script, render
    /// one frame and print the result as JSON
    Replay {
        /// Path to the scene JSON
        scene: PathBuf,

        /// Feed events through the async draw loop in real time
        #[arg(long)]
        realtime: bool,
    },

    /// Print the effective configuration
    Config {
        /// Write it to the standard location
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => composer_common::ComposerConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => composer_common::ComposerConfig::load(),
    };
    composer_common::logging::init_cli_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Layout {
            container,
            native,
            mode,
            mask,
            x,
            y,
            width,
            height,
        } => commands::layout::run(container, native, mode, mask, x, y, width, height),
        Commands::Replay { scene, realtime } => {
            commands::replay::run(config, scene, realtime).await
        }
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
