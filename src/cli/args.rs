//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use pdfsync::locate::Rect;
use std::path::PathBuf;

/// Live reload and SyncTeX reverse search for PDF previews
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: pdfsync.toml)
    #[arg(short = 'C', long, global = true, default_value = "pdfsync.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch a PDF and reload it whenever it changes
    #[command(visible_alias = "w")]
    Watch {
        /// PDF to watch (may not exist yet)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        pdf: PathBuf,
    },

    /// Map a click on a rendered page back to its source line
    #[command(visible_alias = "l")]
    Locate {
        /// PDF the page belongs to
        #[arg(value_hint = clap::ValueHint::FilePath)]
        pdf: PathBuf,

        /// 1-based page number
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Viewport X of the click, in CSS pixels
        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        /// Viewport Y of the click, in CSS pixels
        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// Page rotation in degrees (multiple of 90)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        rotation: i32,

        /// Zoom factor of the rendered page
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Page raster rectangle in viewport space: LEFT,TOP,RIGHT,BOTTOM
        #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
        rect: Rect,
    },
}

fn parse_rect(value: &str) -> Result<Rect, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid number: {err}"))?;

    let &[left, top, right, bottom] = parts.as_slice() else {
        return Err("expected LEFT,TOP,RIGHT,BOTTOM".into());
    };
    let rect = Rect::new(left, top, right, bottom);
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return Err("rectangle must have positive width and height".into());
    }
    Ok(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rect() {
        let rect = parse_rect("100, 50,900,1250").unwrap();
        assert_eq!(rect, Rect::new(100.0, 50.0, 900.0, 1250.0));
    }

    #[test]
    fn test_parse_rect_rejects() {
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
        assert!(parse_rect("900,50,100,1250").is_err());
        assert!(parse_rect("100,50,900,50").is_err());
    }

    #[test]
    fn test_cli_locate() {
        let cli = Cli::try_parse_from([
            "pdfsync", "-v", "locate", "out.pdf", "--page", "2", "--x", "150", "--y", "1200",
            "--rotation", "90", "--scale", "1.5", "--rect", "100,50,900,1250",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("pdfsync.toml"));
        match cli.command {
            Commands::Locate {
                page, rotation, scale, ..
            } => {
                assert_eq!(page, 2);
                assert_eq!(rotation, 90);
                assert_eq!(scale, 1.5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_page_zero_rejected() {
        let result = Cli::try_parse_from([
            "pdfsync", "locate", "out.pdf", "--page", "0", "--x", "1", "--y", "1", "--rect",
            "0,0,10,10",
        ]);
        assert!(result.is_err());
    }
}
