//! Runs one search request against an engine and shapes the JSON report.
//!
//! Search failures are reported inside the document (`pathFound: false`,
//! `error`) rather than as process errors, so callers always get JSON.

use std::time::Instant;

use clap::ValueEnum;
use recipe_path_core::{Algorithm, GraphStats, MultiPathResult, Recipe, SearchEngine, SearchError, SearchOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One path from the chosen strategy
    Shortest,
    /// Up to --max distinct paths from concurrent workers
    Multiple,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub target: String,
    pub algorithm: Algorithm,
    pub mode: Mode,
    pub max: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub search_target: String,
    pub algorithm: Algorithm,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_recipes: Option<usize>,
    pub path_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Recipe>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<Vec<Recipe>>>,
    pub nodes_visited: usize,
    pub duration_millis: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    #[serde(flatten)]
    pub graph: GraphStats,
    pub load_time_ms: f64,
}

enum Found {
    Single(SearchOutcome),
    Multiple(MultiPathResult),
}

fn execute(engine: &SearchEngine, request: &SearchRequest) -> Result<Found, SearchError> {
    let graph = engine.graph()?;
    if !graph.contains_element(&request.target) {
        return Err(SearchError::InvalidRequest(format!(
            "element '{}' not found in recipe data",
            request.target
        )));
    }

    let target = request.target.as_str();
    match request.mode {
        Mode::Shortest => {
            let outcome = match request.algorithm {
                Algorithm::Bfs => engine.find_shortest_path(target),
                Algorithm::Dfs => engine.find_path(target),
                Algorithm::Bds => engine.find_meeting_path(target),
            }?;
            Ok(Found::Single(outcome))
        }
        Mode::Multiple => {
            let max = request.max.ok_or_else(|| {
                SearchError::InvalidRequest("--max is required in multiple mode".to_string())
            })?;
            let result = engine.find_multiple_paths(target, max, request.algorithm)?;
            Ok(Found::Multiple(result))
        }
    }
}

pub fn run_search(engine: &SearchEngine, request: &SearchRequest) -> SearchReport {
    let start = Instant::now();
    let mut report = SearchReport {
        search_target: request.target.clone(),
        algorithm: request.algorithm,
        mode: request.mode,
        max_recipes: match request.mode {
            Mode::Multiple => request.max,
            Mode::Shortest => None,
        },
        path_found: false,
        path: None,
        paths: None,
        nodes_visited: 0,
        duration_millis: 0,
        error: None,
    };

    match execute(engine, request) {
        Ok(Found::Single(outcome)) => {
            report.path_found = true;
            report.nodes_visited = outcome.nodes_visited;
            report.path = Some(outcome.path);
        }
        Ok(Found::Multiple(result)) => {
            report.path_found = !result.paths.is_empty();
            report.nodes_visited = result.nodes_visited;
            report.paths = Some(result.paths);
        }
        Err(err) => {
            tracing::info!(element = %request.target, %err, "search failed");
            report.nodes_visited = err.nodes_visited();
            report.error = Some(err.to_string());
        }
    }

    report.duration_millis = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    report
}
