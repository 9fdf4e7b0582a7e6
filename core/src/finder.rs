use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::{Result, SearchError};
use crate::path::Path;

/// A single found path and the work it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub path: Path,
    /// Elements dequeued (BFS/BDS) or builder calls made (DFS). Zero for
    /// base elements and cache hits.
    pub nodes_visited: usize,
}

impl SearchOutcome {
    pub(crate) fn empty() -> Self {
        Self {
            path: Vec::new(),
            nodes_visited: 0,
        }
    }
}

/// The search strategy behind a single-path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bfs,
    Dfs,
    Bds,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Bds => "bds",
        })
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            "bds" => Ok(Algorithm::Bds),
            other => Err(SearchError::InvalidRequest(format!(
                "unknown algorithm '{other}' (expected bfs, dfs or bds)"
            ))),
        }
    }
}

/// Capability shared by the three single-path strategies. The multi-path
/// orchestrator is generic over it.
///
/// Variant 0 is the canonical deterministic search. Higher variants bias
/// the search toward a different final recipe so that concurrent workers
/// tend to find distinct solutions.
pub trait SinglePathFinder: Sync {
    fn algorithm(&self) -> Algorithm;

    fn find_variant(&self, target: &str, variant: usize, cancel: &CancelToken)
        -> Result<SearchOutcome>;

    /// Number of meaningfully different variants for `target`.
    fn variant_count(&self, target: &str) -> usize;

    /// True when variant `v` past `variant_count` repeats an earlier one,
    /// so retrying it cannot produce anything new.
    fn variants_repeat(&self) -> bool {
        false
    }

    fn find_path(&self, target: &str) -> Result<SearchOutcome> {
        self.find_variant(target, 0, &CancelToken::new())
    }
}
