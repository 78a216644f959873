mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polymask::AppConfig;

#[derive(Parser)]
#[command(name = "polymask", about = "Polygon mask annotation tool")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ./workspace/setting.json, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an image with its masks to a PNG
    Render(commands::render::RenderArgs),
    /// Rasterize a polygon and append it to the image's masks
    AddMask(commands::add_mask::AddMaskArgs),
    /// List the masks saved for an image
    List(commands::list::ListArgs),
    /// Rewrite every set mask value in a mask file
    ConvertMask(commands::convert::ConvertArgs),
    /// Split a multi-image mask file into one file per image
    Split(commands::split::SplitArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::discover(cli.config.as_deref()).context("Failed to load settings")?;

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let result = match &cli.command {
        Commands::Render(args) => commands::render::run(args, &config),
        Commands::AddMask(args) => commands::add_mask::run(args, &config),
        Commands::List(args) => commands::list::run(args, &config),
        Commands::ConvertMask(args) => commands::convert::run(args),
        Commands::Split(args) => commands::split::run(args),
    };
    if let Err(e) = &result {
        log::error!("{:#}", e);
    }
    result
}
