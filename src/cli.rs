//! CLI argument parsing.
use clap::Parser;
use std::path::PathBuf;

pub mod run;

/// Runs one update job against a local workspace fixture.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long)]
    /// Job definition (JSON).
    pub job: PathBuf,

    #[arg(long)]
    /// Workspace fixture with parsed dependencies and registry data (TOML).
    pub workspace: PathBuf,

    #[arg(long)]
    /// Write the run report here instead of printing it.
    pub out_file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    /// Forward pull request operations to the service instead of only
    /// logging them.
    pub no_dry_run: bool,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    pub fn dry_run(&self) -> bool {
        !self.no_dry_run
    }
}
