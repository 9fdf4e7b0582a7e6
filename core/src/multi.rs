use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::cancel::CancelToken;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::finder::SinglePathFinder;
use crate::graph::is_base_element;
use crate::path::{path_identifier, Path};

/// Distinct paths found for one target, shortest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPathResult {
    pub paths: Vec<Path>,
    /// Total work across every attempt, accepted or not.
    pub nodes_visited: usize,
}

#[derive(Default)]
struct Accepted {
    paths: Vec<Path>,
    ids: HashSet<String>,
}

/// Runs a single-path strategy on a bounded pool of worker threads and
/// collects distinct solutions.
///
/// Workers draw variant numbers from a shared counter, so the canonical
/// search (variant 0) always runs and later variants push toward other
/// final recipes. A path is accepted when it is non-empty, its canonical
/// identifier is new, and fewer than `max_paths` are held; reaching the cap
/// cancels the remaining work.
#[derive(Debug, Clone)]
pub struct MultiPathOrchestrator {
    max_workers: usize,
    attempts_per_path: usize,
}

impl MultiPathOrchestrator {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            attempts_per_path: config.attempts_per_path,
        }
    }

    pub fn find_multiple_paths<F>(
        &self,
        finder: &F,
        target: &str,
        max_paths: usize,
    ) -> Result<MultiPathResult>
    where
        F: SinglePathFinder + ?Sized,
    {
        if max_paths == 0 {
            return Err(SearchError::InvalidRequest(
                "max_paths must be at least 1".to_string(),
            ));
        }
        if is_base_element(target) {
            return Ok(MultiPathResult {
                paths: vec![Vec::new()],
                nodes_visited: 0,
            });
        }

        let variants = finder.variant_count(target);
        let budget = if finder.variants_repeat() {
            variants
        } else {
            max_paths.max(variants) * self.attempts_per_path
        };
        let workers = max_paths.min(self.max_workers).max(1);
        tracing::debug!(
            element = target,
            algorithm = %finder.algorithm(),
            max_paths,
            workers,
            budget,
            "multi-path search started"
        );

        let accepted = Mutex::new(Accepted::default());
        let nodes = AtomicUsize::new(0);
        let next_variant = AtomicUsize::new(0);
        let cancel = CancelToken::new();

        std::thread::scope(|s| {
            for worker in 0..workers {
                let accepted = &accepted;
                let nodes = &nodes;
                let next_variant = &next_variant;
                let cancel = &cancel;
                s.spawn(move || loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let variant = next_variant.fetch_add(1, Ordering::Relaxed);
                    if variant >= budget {
                        break;
                    }

                    match finder.find_variant(target, variant, cancel) {
                        Ok(outcome) => {
                            nodes.fetch_add(outcome.nodes_visited, Ordering::Relaxed);
                            if outcome.path.is_empty() {
                                continue;
                            }
                            let id = path_identifier(&outcome.path);
                            let mut guard = accepted.lock();
                            if guard.paths.len() >= max_paths || guard.ids.contains(&id) {
                                continue;
                            }
                            guard.ids.insert(id);
                            guard.paths.push(outcome.path);
                            let count = guard.paths.len();
                            tracing::debug!(element = target, worker, variant, count, "path accepted");
                            if count >= max_paths {
                                cancel.cancel();
                            }
                        }
                        Err(SearchError::Cancelled) => break,
                        Err(err) => {
                            nodes.fetch_add(err.nodes_visited(), Ordering::Relaxed);
                            tracing::debug!(element = target, worker, variant, %err, "attempt failed");
                            // The canonical search is exhaustive; no variant can do better.
                            if variant == 0 && err.is_not_found() {
                                cancel.cancel();
                                break;
                            }
                        }
                    }
                });
            }
        });

        let Accepted { mut paths, .. } = accepted.into_inner();
        let nodes_visited = nodes.into_inner();

        if paths.is_empty() {
            tracing::warn!(element = target, nodes_visited, "multi-path search accepted no paths");
            return Err(SearchError::not_found(target, nodes_visited));
        }

        paths.sort_by_cached_key(|p| (p.len(), path_identifier(p)));
        Ok(MultiPathResult {
            paths,
            nodes_visited,
        })
    }
}
