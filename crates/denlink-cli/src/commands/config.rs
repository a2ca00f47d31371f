//! Config command - manage configuration.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use denlink_core::models::config::DenlinkConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<u8> {
    match args.command {
        ConfigCommand::Show => show_config(config_path),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Path => {
            println!("{}", resolved_path(config_path).display());
            Ok(0)
        }
    }
}

fn resolved_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

fn show_config(config_path: Option<&str>) -> anyhow::Result<u8> {
    let path = resolved_path(config_path);

    let config = if path.exists() {
        DenlinkConfig::from_file(&path)?
    } else {
        println!(
            "{} no config file at {}, showing defaults",
            style("ℹ").blue(),
            path.display()
        );
        DenlinkConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(0)
}

fn init_config(args: InitArgs) -> anyhow::Result<u8> {
    let path = args.output.unwrap_or_else(default_config_path);

    if path.exists() && !args.force {
        anyhow::bail!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    DenlinkConfig::default().save(&path)?;
    println!("{} wrote default config to {}", style("✓").green(), path.display());
    Ok(0)
}
