use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cancel::CancelToken;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::finder::{Algorithm, SearchOutcome, SinglePathFinder};
use crate::graph::{is_base_element, Recipe, RecipeGraph, BASE_ELEMENTS};
use crate::path::{needed_elements, Path};

/// Forward discovery state: elements reachable from the base elements,
/// the round each was discovered in, and the first recipe that discovered it.
///
/// Shared by the shortest-path finder and the forward half of the meeting
/// search.
pub(crate) struct ForwardFrontier<'g> {
    graph: &'g RecipeGraph,
    depth: HashMap<&'g str, usize>,
    parents: HashMap<&'g str, &'g Recipe>,
    queue: VecDeque<&'g str>,
}

impl<'g> ForwardFrontier<'g> {
    /// Seed with the base elements, rotated left by `rotation`.
    pub(crate) fn new(graph: &'g RecipeGraph, rotation: usize) -> Self {
        let mut depth = HashMap::new();
        let mut queue = VecDeque::with_capacity(BASE_ELEMENTS.len());
        for i in 0..BASE_ELEMENTS.len() {
            let base = BASE_ELEMENTS[(i + rotation) % BASE_ELEMENTS.len()];
            depth.insert(base, 0);
            queue.push_back(base);
        }
        Self {
            graph,
            depth,
            parents: HashMap::new(),
            queue,
        }
    }

    pub(crate) fn pop(&mut self) -> Option<&'g str> {
        self.queue.pop_front()
    }

    /// Elements waiting in the queue; one level when read at a level boundary.
    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn is_discovered(&self, element: &str) -> bool {
        self.depth.contains_key(element)
    }

    /// Examine every recipe consuming `current`, starting at `offset` in its
    /// consumer list. A recipe whose other ingredient is already discovered
    /// discovers its result, unless `allow` rejects it or the result is known.
    ///
    /// Returns the first newly discovered element for which `stop` holds,
    /// leaving the remaining consumers unexamined.
    pub(crate) fn expand<A, S>(
        &mut self,
        current: &'g str,
        offset: usize,
        allow: A,
        mut stop: S,
    ) -> Option<&'g str>
    where
        A: Fn(&Recipe) -> bool,
        S: FnMut(&str) -> bool,
    {
        let current_depth = self.depth.get(current).copied().unwrap_or(0);
        let consumers: &'g [Recipe] = self.graph.consumers(current);
        let n = consumers.len();

        for i in 0..n {
            let recipe = &consumers[(i + offset) % n];
            let result = recipe.result.as_str();
            if is_base_element(result) || self.depth.contains_key(result) || !allow(recipe) {
                continue;
            }
            let Some(other) = recipe.other_ingredient(current) else {
                continue;
            };
            let Some(&other_depth) = self.depth.get(other) else {
                continue;
            };

            // A result is one round past the later of its two ingredients.
            self.depth.insert(result, current_depth.max(other_depth) + 1);
            self.parents.insert(result, recipe);
            self.queue.push_back(result);

            if stop(result) {
                return Some(result);
            }
        }
        None
    }

    fn depth_of(&self, element: &str) -> usize {
        self.depth.get(element).copied().unwrap_or(usize::MAX)
    }

    /// Emit the recipes needed for `element` in dependency order.
    ///
    /// Among the elements whose parent recipe is ready, the next one is the
    /// shallowest, then the one most other needed elements depend on, then
    /// the alphabetically smallest.
    pub(crate) fn reconstruct(&self, element: &str) -> Result<Path> {
        let inconsistent = |detail: &str| SearchError::InconsistentReconstruction {
            target: element.to_string(),
            detail: detail.to_string(),
        };

        let (&key, _) = self
            .depth
            .get_key_value(element)
            .ok_or_else(|| inconsistent("element was never discovered"))?;
        let needed = needed_elements(&self.parents, key)
            .ok_or_else(|| inconsistent("parent chain is broken"))?;

        let mut pending: Vec<(&'g str, &'g Recipe)> = needed
            .iter()
            .map(|e| self.parents.get(e).map(|recipe| (*e, *recipe)))
            .collect::<Option<_>>()
            .ok_or_else(|| inconsistent("parent chain is broken"))?;

        let mut dependents: HashMap<&str, usize> = HashMap::new();
        for (_, recipe) in &pending {
            let (a, b) = recipe.sorted_ingredients();
            *dependents.entry(a).or_default() += 1;
            if b != a {
                *dependents.entry(b).or_default() += 1;
            }
        }

        let mut available: HashSet<&str> = BASE_ELEMENTS.into_iter().collect();
        let mut path = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let next = pending
                .iter()
                .enumerate()
                .filter(|(_, (_, recipe))| {
                    recipe.ingredients().iter().all(|i| available.contains(i))
                })
                .min_by(|(_, (a, _)), (_, (b, _))| {
                    self.depth_of(a)
                        .cmp(&self.depth_of(b))
                        .then_with(|| dependents.get(b).unwrap_or(&0).cmp(dependents.get(a).unwrap_or(&0)))
                        .then_with(|| a.cmp(b))
                })
                .map(|(index, _)| index);

            let Some(index) = next else {
                return Err(inconsistent("no needed recipe is ready"));
            };
            let (name, recipe) = pending.swap_remove(index);
            available.insert(name);
            path.push(recipe.clone());
        }

        Ok(path)
    }
}

/// Breadth-first shortest-path finder.
///
/// Finds a path in the fewest discovery rounds. Results of canonical
/// searches are memoized per target when the cache is enabled; a hit
/// reports zero nodes visited.
pub struct ShortestPathFinder {
    graph: Arc<RecipeGraph>,
    cache: RwLock<HashMap<String, Path>>,
    cache_enabled: bool,
}

impl ShortestPathFinder {
    pub fn new(graph: Arc<RecipeGraph>, config: &SearchConfig) -> Self {
        Self {
            graph,
            cache: RwLock::new(HashMap::new()),
            cache_enabled: config.bfs_cache,
        }
    }

    pub fn graph(&self) -> &RecipeGraph {
        &self.graph
    }

    pub fn find_shortest_path(&self, target: &str) -> Result<SearchOutcome> {
        self.search(target, &CancelToken::new())
    }

    /// Canonical search, consulting and filling the cache.
    pub fn search(&self, target: &str, cancel: &CancelToken) -> Result<SearchOutcome> {
        if is_base_element(target) {
            return Ok(SearchOutcome::empty());
        }

        if self.cache_enabled {
            if let Some(path) = self.cache.read().get(target) {
                tracing::debug!(element = target, steps = path.len(), "bfs cache hit");
                return Ok(SearchOutcome {
                    path: path.clone(),
                    nodes_visited: 0,
                });
            }
        }

        let outcome = self.run(target, 0, None, cancel)?;
        if self.cache_enabled {
            self.cache
                .write()
                .insert(target.to_string(), outcome.path.clone());
        }
        Ok(outcome)
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    pub fn cached_targets(&self) -> usize {
        self.cache.read().len()
    }

    /// One breadth-first run. With `designated` set, the target may only be
    /// discovered through the recipe with that canonical key.
    fn run(
        &self,
        target: &str,
        variant: usize,
        designated: Option<String>,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome> {
        let mut frontier = ForwardFrontier::new(&self.graph, variant);
        let allow = |recipe: &Recipe| match &designated {
            Some(key) if recipe.result == target => recipe.key() == *key,
            _ => true,
        };
        let mut nodes_visited = 0;

        while let Some(current) = frontier.pop() {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            nodes_visited += 1;

            if frontier
                .expand(current, variant, &allow, |e| e == target)
                .is_some()
            {
                let path = frontier.reconstruct(target)?;
                tracing::debug!(
                    element = target,
                    variant,
                    steps = path.len(),
                    nodes_visited,
                    "bfs found path"
                );
                return Ok(SearchOutcome {
                    path,
                    nodes_visited,
                });
            }
        }

        tracing::debug!(element = target, variant, nodes_visited, "bfs frontier exhausted");
        Err(SearchError::not_found(target, nodes_visited))
    }
}

impl SinglePathFinder for ShortestPathFinder {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bfs
    }

    fn find_variant(
        &self,
        target: &str,
        variant: usize,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome> {
        if variant == 0 || is_base_element(target) {
            return self.search(target, cancel);
        }
        let producers = self.graph.distinct_producers(target);
        let designated = if producers.is_empty() {
            None
        } else {
            Some(producers[(variant - 1) % producers.len()].key())
        };
        self.run(target, variant, designated, cancel)
    }

    fn variant_count(&self, target: &str) -> usize {
        self.graph.distinct_producers(target).len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{path_identifier, validate};
    use crate::test_support::{branching, cyclic, elemental, r};
    use test_log::test;

    fn finder(graph: RecipeGraph) -> ShortestPathFinder {
        ShortestPathFinder::new(Arc::new(graph), &SearchConfig::default())
    }

    #[test]
    fn test_mud_single_step() {
        let bfs = finder(elemental());
        let outcome = bfs.find_shortest_path("Mud").unwrap();
        assert_eq!(outcome.path, vec![r("Water", "Earth", "Mud")]);
        assert!(outcome.nodes_visited > 0);
    }

    #[test]
    fn test_stone_orders_lava_first() {
        let bfs = finder(elemental());
        let outcome = bfs.find_shortest_path("Stone").unwrap();
        let keys: Vec<String> = outcome.path.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["Earth+Fire=>Lava", "Lava+Water=>Stone"]);
        validate(&outcome.path, "Stone").unwrap();
    }

    #[test]
    fn test_base_elements_empty_path() {
        let bfs = finder(elemental());
        for base in BASE_ELEMENTS {
            let outcome = bfs.find_shortest_path(base).unwrap();
            assert!(outcome.path.is_empty());
            assert_eq!(outcome.nodes_visited, 0);
        }
    }

    #[test]
    fn test_deterministic_without_cache() {
        let config = SearchConfig {
            bfs_cache: false,
            ..SearchConfig::default()
        };
        let bfs = ShortestPathFinder::new(Arc::new(branching()), &config);
        let first = bfs.find_shortest_path("Golem").unwrap();
        let second = bfs.find_shortest_path("Golem").unwrap();
        assert_eq!(first, second);
        assert_eq!(bfs.cached_targets(), 0);
    }

    #[test]
    fn test_cache_hit_reports_zero_visited() {
        let bfs = finder(elemental());
        let first = bfs.find_shortest_path("Stone").unwrap();
        assert!(first.nodes_visited > 0);
        let second = bfs.find_shortest_path("Stone").unwrap();
        assert_eq!(second.nodes_visited, 0);
        assert_eq!(first.path, second.path);

        bfs.clear_cache();
        assert_eq!(bfs.cached_targets(), 0);
        assert!(bfs.find_shortest_path("Stone").unwrap().nodes_visited > 0);
    }

    #[test]
    fn test_unreachable_target() {
        let bfs = finder(cyclic());
        for target in ["Chicken", "Egg", "Nest", "Unobtainium"] {
            let err = bfs.find_shortest_path(target).unwrap_err();
            assert!(err.is_not_found(), "{target}: {err:?}");
            assert!(err.nodes_visited() > 0);
        }
    }

    #[test]
    fn test_every_element_valid() {
        let graph = branching();
        let elements: Vec<String> = graph.elements().map(String::from).collect();
        let bfs = finder(graph);
        for element in elements {
            let outcome = bfs.find_shortest_path(&element).unwrap();
            validate(&outcome.path, &element).unwrap();
        }
    }

    #[test]
    fn test_repeated_ingredient_recipe() {
        let bfs = finder(RecipeGraph::build(vec![
            r("Fire", "Fire", "Energy"),
            r("Energy", "Energy", "Plasma"),
        ]));
        let outcome = bfs.find_shortest_path("Plasma").unwrap();
        assert_eq!(outcome.path.len(), 2);
        validate(&outcome.path, "Plasma").unwrap();
    }

    #[test]
    fn test_variants_target_each_producer() {
        let bfs = finder(branching());
        let producers: Vec<String> = bfs
            .graph()
            .distinct_producers("Golem")
            .iter()
            .map(|r| r.key())
            .collect();
        assert_eq!(bfs.variant_count("Golem"), producers.len() + 1);

        let mut ids = HashSet::new();
        for (i, key) in producers.iter().enumerate() {
            let outcome = bfs.find_variant("Golem", i + 1, &CancelToken::new()).unwrap();
            validate(&outcome.path, "Golem").unwrap();
            assert_eq!(outcome.path.last().map(|r| r.key()).as_ref(), Some(key));
            ids.insert(path_identifier(&outcome.path));
        }
        assert_eq!(ids.len(), producers.len());
        // Variants never populate the cache
        assert_eq!(bfs.cached_targets(), 0);
    }

    #[test]
    fn test_cancelled_search() {
        let bfs = finder(elemental());
        let token = CancelToken::new();
        token.cancel();
        let err = bfs.find_variant("Stone", 0, &token).unwrap_err();
        assert_eq!(err, SearchError::Cancelled);
    }
}
