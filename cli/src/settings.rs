//! Search configuration from an optional TOML file plus command-line
//! overrides. Keys match [`SearchConfig`] field names; missing keys take
//! their defaults.

use std::path::Path;

use recipe_path_core::SearchConfig;

use crate::error::CliError;

pub fn load_config(path: Option<&Path>) -> Result<SearchConfig, CliError> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&raw).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), ?config, "search config loaded");
    Ok(config)
}

/// Flags win over file values.
pub fn apply_overrides(mut config: SearchConfig, workers: Option<usize>, no_cache: bool) -> SearchConfig {
    if let Some(workers) = workers {
        config.max_workers = workers;
    }
    if no_cache {
        config.bfs_cache = false;
    }
    config
}
