//! pdfsync - live reload and reverse search for PDF previews.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, locate::Click};
use pdfsync::{SyncConfig, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SyncConfig::load(&cli.config)?;

    match cli.command {
        Commands::Watch { pdf } => cli::watch::watch_pdf(&config, &pdf),
        Commands::Locate {
            pdf,
            page,
            x,
            y,
            rotation,
            scale,
            rect,
        } => {
            let click = Click {
                page,
                x,
                y,
                rotation,
                scale,
                rect,
            };
            cli::locate::locate_click(&config, &pdf, click)
        }
    }
}
