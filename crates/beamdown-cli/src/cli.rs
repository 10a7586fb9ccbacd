use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "beamdown")]
#[command(about = "Simulated download progress for the beamdown landing page")]
#[command(after_help = "Run '<command> --help' for detailed options on each command.")]
pub struct Cli {
    /// Override the configuration directory for this invocation
    #[arg(long, global = true, value_name = "PATH")]
    pub config_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one simulated download
    Download(DownloadArgs),
    /// List the configured platforms and their sizes
    Platforms,
}

#[derive(Args, Clone, Debug)]
pub struct DownloadArgs {
    /// Platform to download (unknown platforms use the default entry)
    pub platform: Option<String>,
    /// Seed the rate sampler for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
    /// Override the tick interval in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,
    /// Skip the confirmation prompt when cancelling
    #[arg(long, short = 'y')]
    pub yes: bool,
    /// Hide the interactive progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,
}
