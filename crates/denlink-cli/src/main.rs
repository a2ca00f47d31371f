//! CLI for envelope-density report extraction and OPC UA export.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, diagnose, export, setup};

/// Extract envelope-density report data from PDF and push it to an OPC UA
/// server, with a CSV mirror of the same data
#[derive(Parser)]
#[command(name = "denlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full export: PDF → CSV + OPC UA
    Export(export::ExportArgs),

    /// Diagnose the OPC UA server connection
    Diagnose,

    /// First-time setup: certificate store bootstrap and connection test
    Setup,

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command; non-zero codes are non-fatal outcomes (fatal errors
    // come back as Err and exit 1).
    let code = match cli.command {
        Commands::Export(args) => export::run(args, cli.config.as_deref()).await?,
        Commands::Diagnose => diagnose::run(cli.config.as_deref()).await?,
        Commands::Setup => setup::run(cli.config.as_deref()).await?,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await?,
    };

    if code != 0 {
        std::process::exit(i32::from(code));
    }
    Ok(())
}
