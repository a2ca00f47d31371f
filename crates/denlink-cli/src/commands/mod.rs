//! CLI subcommands.

pub mod config;
pub mod diagnose;
pub mod export;
pub mod setup;

use std::path::{Path, PathBuf};

use anyhow::Context;

use denlink_core::models::config::DenlinkConfig;

/// Default config location under the platform config directory.
pub(crate) fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("denlink")
        .join("config.json")
}

/// Load the configuration. An explicit `--config` path must exist; the
/// default location is created with defaults on first run.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<DenlinkConfig> {
    match config_path {
        Some(path) => DenlinkConfig::from_file(Path::new(path))
            .with_context(|| format!("failed to load config from {path}")),
        None => {
            let path = default_config_path();
            DenlinkConfig::load_or_init(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
    }
}
