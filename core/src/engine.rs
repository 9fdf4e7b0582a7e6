use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::bds::MeetingPathFinder;
use crate::bfs::ShortestPathFinder;
use crate::config::SearchConfig;
use crate::dfs::ExhaustivePathBuilder;
use crate::error::{Result, SearchError};
use crate::finder::{Algorithm, SearchOutcome, SinglePathFinder};
use crate::graph::{Recipe, RecipeGraph};
use crate::multi::{MultiPathOrchestrator, MultiPathResult};
use crate::path::Path;

/// Summary of the built graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub element_count: usize,
    pub recipe_count: usize,
    pub duplicates_dropped: usize,
    pub build_time_ms: f64,
}

/// Everything that exists once the graph is built.
struct EngineState {
    graph: Arc<RecipeGraph>,
    bfs: Arc<ShortestPathFinder>,
    dfs: ExhaustivePathBuilder,
    bds: MeetingPathFinder,
    multi: MultiPathOrchestrator,
    build_time_ms: f64,
}

impl EngineState {
    fn build(config: &SearchConfig, recipes: Vec<Recipe>) -> Self {
        let start = Instant::now();
        let graph = Arc::new(RecipeGraph::build(recipes));
        let bfs = Arc::new(ShortestPathFinder::new(graph.clone(), config));
        Self {
            dfs: ExhaustivePathBuilder::new(graph.clone(), config),
            bds: MeetingPathFinder::new(bfs.clone()),
            multi: MultiPathOrchestrator::new(config),
            bfs,
            graph,
            build_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

/// Entry point for callers: owns the configuration, the recipe graph once
/// built, and one instance of each finder with its caches.
///
/// Every search returns [`SearchError::GraphNotInitialized`] until
/// [`build_graph`](Self::build_graph) has been called. The engine is
/// `Sync`; share it behind an `Arc` to search from several threads.
pub struct SearchEngine {
    config: SearchConfig,
    state: OnceCell<EngineState>,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: OnceCell::new(),
        })
    }

    /// Build the recipe graph. Only the first call has an effect; later
    /// calls return the existing graph and ignore their input.
    pub fn build_graph<I>(&self, recipes: I) -> &RecipeGraph
    where
        I: IntoIterator<Item = Recipe>,
    {
        let mut built = false;
        let state = self.state.get_or_init(|| {
            built = true;
            EngineState::build(&self.config, recipes.into_iter().collect())
        });
        if !built {
            tracing::info!("recipe graph already built, ignoring new input");
        }
        &state.graph
    }

    fn state(&self) -> Result<&EngineState> {
        self.state.get().ok_or(SearchError::GraphNotInitialized)
    }

    pub fn is_built(&self) -> bool {
        self.state.get().is_some()
    }

    pub fn graph(&self) -> Result<&RecipeGraph> {
        Ok(&self.state()?.graph)
    }

    pub fn stats(&self) -> Result<GraphStats> {
        let state = self.state()?;
        Ok(GraphStats {
            element_count: state.graph.element_count(),
            recipe_count: state.graph.recipe_count(),
            duplicates_dropped: state.graph.duplicates_dropped(),
            build_time_ms: state.build_time_ms,
        })
    }

    pub fn finder(&self, algorithm: Algorithm) -> Result<&dyn SinglePathFinder> {
        let state = self.state()?;
        let finder: &dyn SinglePathFinder = match algorithm {
            Algorithm::Bfs => state.bfs.as_ref(),
            Algorithm::Dfs => &state.dfs,
            Algorithm::Bds => &state.bds,
        };
        Ok(finder)
    }

    pub fn find_shortest_path(&self, target: &str) -> Result<SearchOutcome> {
        self.state()?.bfs.find_shortest_path(target)
    }

    pub fn find_path(&self, target: &str) -> Result<SearchOutcome> {
        self.state()?.dfs.find_path(target)
    }

    pub fn find_meeting_path(&self, target: &str) -> Result<SearchOutcome> {
        self.state()?.bds.find_meeting_path(target)
    }

    pub fn find_multiple_paths(
        &self,
        target: &str,
        max_paths: usize,
        algorithm: Algorithm,
    ) -> Result<MultiPathResult> {
        let state = self.state()?;
        let finder = self.finder(algorithm)?;
        state.multi.find_multiple_paths(finder, target, max_paths)
    }

    pub fn find_alternative_paths(
        &self,
        target: &str,
        existing: &[Recipe],
        max_paths: usize,
    ) -> Result<Vec<Path>> {
        self.state()?
            .dfs
            .find_alternative_paths(target, existing, max_paths)
    }

    /// Drop every memoized result. A no-op before the graph is built.
    pub fn reset_caches(&self) {
        if let Some(state) = self.state.get() {
            state.bfs.clear_cache();
            state.dfs.clear_caches();
            tracing::debug!("search caches cleared");
        }
    }
}
