mod cli;
mod context;
mod download;
mod platforms;
mod render;

use beamdown_core::config;
use clap::Parser;
use eyre::Result;

use crate::cli::{Cli, Commands};
use crate::context::AppContext;
use crate::download::run_download;
use crate::platforms::run_platforms;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Some(dir) = &cli.config_dir {
        config::set_config_dir(dir);
    }
    let ctx = AppContext::load()?;

    match &cli.command {
        Commands::Download(args) => run_download(&ctx, args).await?,
        Commands::Platforms => run_platforms(&ctx)?,
    }

    Ok(())
}
