//! Command-line argument parsing for Tellurion.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Tellurion command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "tellurion", about = "Earth-Moon orrery")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of stars in the starfield.
    #[arg(long)]
    pub star_count: Option<u32>,

    /// Starfield RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip texture downloads and use fallback materials.
    #[arg(long)]
    pub offline: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Parse CLI arguments from the process environment.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(count) = args.star_count {
            self.sky.star_count = count;
        }
        if let Some(seed) = args.seed {
            self.sky.seed = seed;
        }
        if args.offline {
            self.textures.offline = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
