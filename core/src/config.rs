//! Search tuning knobs.
//!
//! Each setting has a default and an inclusive range. Values are read from
//! TOML by the CLI and checked once by [`SearchConfig::validate`] when an
//! engine is created.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Concurrency cap for the multi-path orchestrator.
    pub max_workers: usize,
    /// Attempt budget multiplier for the orchestrator.
    pub attempts_per_path: usize,
    /// Worker pool size for DFS alternative-path generation.
    pub alternative_workers: usize,
    /// Recursion guard for the DFS creatability analysis.
    pub creatable_depth_limit: usize,
    /// Recursion guard for the DFS path builder.
    pub build_depth_limit: usize,
    /// Memoize BFS results per target.
    pub bfs_cache: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_workers: 10,
            attempts_per_path: 3,
            alternative_workers: 8,
            creatable_depth_limit: 500,
            build_depth_limit: 500,
            bfs_cache: true,
        }
    }
}

fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return Err(SearchError::InvalidConfig(format!(
            "{name} = {value} is outside {min}..={max}"
        )));
    }
    Ok(())
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("max_workers", self.max_workers, 1, 256)?;
        check_range("attempts_per_path", self.attempts_per_path, 1, 64)?;
        check_range("alternative_workers", self.alternative_workers, 1, 256)?;
        check_range("creatable_depth_limit", self.creatable_depth_limit, 1, 10_000)?;
        check_range("build_depth_limit", self.build_depth_limit, 1, 10_000)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.creatable_depth_limit, 500);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = SearchConfig {
            max_workers: 0,
            ..SearchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_workers"), "{err}");

        let config = SearchConfig {
            build_depth_limit: 20_000,
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(SearchError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_input_uses_defaults() {
        let config: SearchConfig = serde_json::from_str(r#"{"max_workers": 4}"#).unwrap();
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.attempts_per_path, 3);
        assert!(config.bfs_cache);
    }
}
