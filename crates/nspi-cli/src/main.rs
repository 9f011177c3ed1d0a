mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nspi", about = "Cloud filling for multi-band satellite imagery")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show raster or mask metadata
    Info(commands::info::InfoArgs),
    /// Fill cloud regions from a clear reference image
    Fill(commands::fill::FillArgs),
    /// Number the connected regions of a binary cloud mask
    Label(commands::label::LabelArgs),
    /// Print or save a default fill config (TOML)
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Fill(args) => commands::fill::run(args),
        Commands::Label(args) => commands::label::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
