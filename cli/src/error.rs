use std::path::PathBuf;

use recipe_path_core::SearchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed recipe file {path}: {source}")]
    Recipes {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot encode report: {0}")]
    Report(#[from] serde_json::Error),

    #[error(transparent)]
    Search(#[from] SearchError),
}
