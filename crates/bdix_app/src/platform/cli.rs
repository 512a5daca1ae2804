use std::path::PathBuf;

use bdix_core::{Category, OpenTarget};
use bdix_engine::DEFAULT_EXPORT_FILENAME;
use clap::Parser;
use engine_logging::LogDestination;

/// Check which BDIX servers answer from this network.
///
/// Press Enter while a run is in progress to stop it.
#[derive(Debug, Parser)]
#[command(name = "bdix-tester", version, about, long_about = None)]
pub struct Cli {
    /// Server category to test (FTP or TV).
    #[arg(short, long)]
    pub category: Option<Category>,

    /// URL of the server-list document.
    #[arg(long, value_name = "URL")]
    pub source_url: Option<String>,

    /// Per-server probe timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Number of probes in flight at once.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Save reachable servers after the run, one per line.
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = DEFAULT_EXPORT_FILENAME
    )]
    pub save: Option<PathBuf>,

    /// List reachable servers after the run.
    #[arg(long)]
    pub show: bool,

    /// Open a reachable server in the browser after the run: its number in
    /// the listing, or `all`.
    #[arg(long, value_name = "N|all")]
    pub open: Option<OpenTarget>,

    /// RON configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log destination: off, terminal, file or both.
    #[arg(long, value_name = "DEST")]
    pub log: Option<LogDestination>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}
