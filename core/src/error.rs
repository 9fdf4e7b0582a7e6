//! Typed search errors.
//!
//! Every public search operation returns `Result<_, SearchError>`. A target
//! that cannot be reached is an ordinary `NotFound`, never a panic.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A search was requested before the recipe graph was built.
    #[error("recipe graph not initialized: call build_graph() first")]
    GraphNotInitialized,

    /// The frontier or recursion was exhausted without producing the target.
    #[error("no path to element '{target}' found ({nodes_visited} nodes visited)")]
    NotFound { target: String, nodes_visited: usize },

    /// Rejected before any search started.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Merged recipes could not be ordered into a valid path. Indicates a
    /// data or algorithm defect rather than an unreachable target.
    #[error("inconsistent reconstruction for '{target}': {detail}")]
    InconsistentReconstruction { target: String, detail: String },

    /// The search observed its cancellation token.
    #[error("search cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    pub(crate) fn not_found(target: &str, nodes_visited: usize) -> Self {
        Self::NotFound {
            target: target.to_string(),
            nodes_visited,
        }
    }

    /// Work performed before the failure, when the search got that far.
    pub fn nodes_visited(&self) -> usize {
        match self {
            Self::NotFound { nodes_visited, .. } => *nodes_visited,
            _ => 0,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
