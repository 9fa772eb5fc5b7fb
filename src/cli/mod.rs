//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod custom;
mod locate;
mod prepare;
mod sheet;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, IconsheetConfig};
use crate::matte::Resample;
use crate::template::DEFAULT_TEMPLATE_ROWS;
use crate::validate::SheetKind;

pub use custom::CustomAction;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// iconsheet - Sprite-sheet icon addressing and custom icon preparation
#[derive(Parser)]
#[command(name = "iconsheet")]
#[command(about = "Locate icons on sprite sheets and prepare custom icons for upload")]
#[command(version)]
pub struct Cli {
    /// Path to iconsheet.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the sheet, cell and pixel rects of an icon number
    Locate {
        /// Icon number
        #[arg(allow_negative_numbers = true)]
        icon: i64,

        /// Display name to print alongside the position
        #[arg(long)]
        name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export positions for a range of icon numbers as CSV
    Positions {
        /// First icon number (inclusive)
        #[arg(allow_negative_numbers = true)]
        start: i64,

        /// Last icon number (inclusive)
        #[arg(allow_negative_numbers = true)]
        end: i64,

        /// Output CSV file (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve an icon number to the asset the game would load
    Lookup {
        /// Icon number
        #[arg(allow_negative_numbers = true)]
        icon: i64,

        /// Resolve the shiny variant
        #[arg(long)]
        shiny: bool,

        /// Consult the custom icon table before sheet geometry
        #[arg(long)]
        custom: bool,

        /// Custom icon table (default: from config)
        #[arg(long)]
        table: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the custom icon table
    Custom {
        #[command(subcommand)]
        action: CustomAction,

        /// Custom icon table (default: from config)
        #[arg(long, global = true)]
        table: Option<PathBuf>,
    },

    /// Prepare an image or a directory of PNGs for upload
    Prepare {
        /// Input image or directory
        input: PathBuf,

        /// Output file or directory.
        /// If omitted: {input}_prepared.png, or {dir}/prepared/ for directories
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Minimum transparent padding around the sprite
        #[arg(long)]
        padding: Option<u32>,

        /// Per-channel background tolerance (0-255)
        #[arg(long)]
        tolerance: Option<u8>,

        /// Background color to remove, as RRGGBB (skips detection)
        #[arg(long)]
        background: Option<String>,

        /// Always write RGBA output instead of indexed color
        #[arg(long)]
        no_optimize: bool,

        /// Filter used when scaling sprites down
        #[arg(long, value_enum)]
        resample: Option<Resample>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a sprite sheet's dimensions, alpha and empty cells
    Validate {
        /// Sheet image
        sheet: PathBuf,

        /// Sheet layout
        #[arg(long, value_enum, default_value_t = SheetKind::Regular)]
        kind: SheetKind,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a blank guide sheet
    Template {
        /// Sheet layout
        #[arg(long, value_enum, default_value_t = SheetKind::Regular)]
        kind: SheetKind,

        /// Number of rows
        #[arg(long, default_value_t = DEFAULT_TEMPLATE_ROWS, value_parser = clap::value_parser!(u32).range(1..=1000))]
        rows: u32,

        /// Output file (default: {kind}_sheet_template.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "iconsheet=debug" } else { "iconsheet=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Load configuration from `--config` or by discovery.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<IconsheetConfig, ExitCode> {
    load_config(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Parse a `RRGGBB` or `#RRGGBB` hex color.
pub(crate) fn parse_hex_color(text: &str) -> Option<[u8; 3]> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Locate { icon, name, json } => {
            locate::run_locate(config_path, icon, name.as_deref(), json)
        }
        Commands::Positions { start, end, output } => {
            locate::run_positions(config_path, start, end, output.as_deref())
        }
        Commands::Lookup { icon, shiny, custom, table, json } => {
            locate::run_lookup(config_path, icon, shiny, custom, table.as_deref(), json)
        }
        Commands::Custom { action, table } => custom::run_custom(config_path, action, table.as_deref()),
        Commands::Prepare {
            input,
            output,
            width,
            height,
            padding,
            tolerance,
            background,
            no_optimize,
            resample,
            json,
        } => prepare::run_prepare(
            config_path,
            &input,
            output.as_deref(),
            width,
            height,
            padding,
            tolerance,
            background.as_deref(),
            no_optimize,
            resample,
            json,
        ),
        Commands::Validate { sheet, kind, json } => sheet::run_validate(&sheet, kind, json),
        Commands::Template { kind, rows, output } => sheet::run_template(kind, rows, output.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("FFFFFF"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("#00ff7f"), Some([0, 255, 127]));
        assert_eq!(parse_hex_color("fff"), None);
        assert_eq!(parse_hex_color("GG0000"), None);
        assert_eq!(parse_hex_color("ééé"), None);
    }

    #[test]
    fn test_negative_icon_parses() {
        let cli = Cli::try_parse_from(["iconsheet", "locate", "-5"]).expect("should parse");
        assert!(matches!(cli.command, Commands::Locate { icon: -5, .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["iconsheet", "custom", "list", "--table", "t.toml", "-v"])
            .expect("should parse");
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Custom { table: Some(_), .. }));
    }
}
