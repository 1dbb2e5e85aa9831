//! Command line interface.

use cardmason_app::{AppResult, Replay, SessionScript, layout_once, script};
use cardmason_core::MasonryConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cardmason", version, about = "Masonry layout and drag-reorder session tools")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session and print a JSON report
    Replay {
        script: PathBuf,
        /// Write an SVG snapshot of the final frame
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Include the final inline styles in the report
        #[arg(long)]
        css: bool,
        /// Config file overriding the script's config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Lay out an item list once and print the layout as JSON
    Layout {
        items: PathBuf,
        #[arg(long)]
        wrapper_width: f64,
    },
}

pub fn run(cli: Cli) -> AppResult<()> {
    match cli.command {
        Commands::Replay {
            script,
            svg,
            css,
            config,
        } => {
            let mut session = SessionScript::load(&script)?;
            if let Some(path) = config {
                session.config = MasonryConfig::from_json(&std::fs::read_to_string(path)?)?;
            }
            log::info!(
                "Replaying {} steps over {} items",
                session.steps.len(),
                session.items.len()
            );
            let replay = Replay::run(&session);
            if let Some(path) = svg {
                std::fs::write(&path, replay.snapshot()?)?;
                log::info!("Wrote snapshot to {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&replay.report(css)?)?);
        }
        Commands::Layout {
            items,
            wrapper_width,
        } => {
            let items = script::load_items(&items)?;
            let layout = layout_once(&items, wrapper_width)?;
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
    }
    Ok(())
}
