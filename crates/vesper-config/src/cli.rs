//! Command-line overrides.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line arguments. Values given here win over `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "vesper", about = "UI batching and LOD selection demo")]
pub struct CliArgs {
    /// Log filter (error, warn, info, debug, trace, or full directives).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Hard vertex limit per batch accessor.
    #[arg(long)]
    pub max_vertices: Option<u32>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Config directory (overrides the platform default).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(max) = args.max_vertices {
            self.batch.max_vertices_per_accessor = max;
        }
    }
}
