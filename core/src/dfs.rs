//! Depth-first exhaustive path builder.
//!
//! Builds a valid, heuristically short path by recursive composition:
//! for each recipe producing the target, build its ingredients first, then
//! keep the shortest composition. Two caches make this tractable:
//!
//! - a creatability cache answering "can this element be synthesized at
//!   all", so hopeless branches are pruned before any path is built;
//! - a sub-path memo holding paths built from the base elements alone,
//!   replayed onto each caller's availability context.
//!
//! Both caches belong to the builder instance and are safe to share
//! between worker threads.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::cancel::CancelToken;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::finder::{Algorithm, SearchOutcome, SinglePathFinder};
use crate::graph::{is_base_element, Recipe, RecipeGraph};
use crate::path::{dedup_recipes, path_identifier, replay_onto, validate, Path};

pub struct ExhaustivePathBuilder {
    graph: Arc<RecipeGraph>,
    creatable: RwLock<HashMap<String, bool>>,
    memo: Mutex<HashMap<String, Path>>,
    creatable_depth_limit: usize,
    build_depth_limit: usize,
    alternative_workers: usize,
}

/// Per-search recursion state.
struct Walk<'a, 'c> {
    branch: Vec<&'a str>,
    calls: usize,
    cancel: &'c CancelToken,
}

impl ExhaustivePathBuilder {
    pub fn new(graph: Arc<RecipeGraph>, config: &SearchConfig) -> Self {
        Self {
            graph,
            creatable: RwLock::new(HashMap::new()),
            memo: Mutex::new(HashMap::new()),
            creatable_depth_limit: config.creatable_depth_limit,
            build_depth_limit: config.build_depth_limit,
            alternative_workers: config.alternative_workers,
        }
    }

    /// Whether some finite composition of recipes produces `element` from
    /// the base elements.
    pub fn is_creatable(&self, element: &str) -> bool {
        let mut branch = Vec::new();
        let mut depth_limited = false;
        let (found, _) = self.creatable_inner(element, &mut branch, 0, &mut depth_limited);
        // With an empty branch the only remaining approximation is the depth guard.
        if !found && !depth_limited && !is_base_element(element) {
            self.creatable.write().insert(element.to_string(), false);
        }
        found
    }

    /// Returns `(creatable, tainted)`. A result is tainted when it was
    /// decided by the branch guard or the depth guard rather than by the
    /// recipe relation alone; tainted negatives are not cached.
    fn creatable_inner<'a>(
        &'a self,
        element: &'a str,
        branch: &mut Vec<&'a str>,
        depth: usize,
        depth_limited: &mut bool,
    ) -> (bool, bool) {
        if is_base_element(element) {
            return (true, false);
        }
        let known = self.creatable.read().get(element).copied();
        if let Some(known) = known {
            return (known, false);
        }
        if depth >= self.creatable_depth_limit {
            *depth_limited = true;
            return (false, true);
        }
        if branch.contains(&element) {
            return (false, true);
        }

        branch.push(element);
        let mut found = false;
        let mut tainted = false;
        for recipe in self.graph.producers(element) {
            let (first, t1) = self.creatable_inner(&recipe.ingredient1, branch, depth + 1, depth_limited);
            tainted |= t1;
            if !first {
                continue;
            }
            let (second, t2) = self.creatable_inner(&recipe.ingredient2, branch, depth + 1, depth_limited);
            tainted |= t2;
            if second {
                found = true;
                break;
            }
        }
        branch.pop();

        if found || !tainted {
            self.creatable.write().insert(element.to_string(), found);
        }
        (found, tainted && !found)
    }

    /// The cached creatability verdict, if one has been settled.
    pub fn creatable_cached(&self, element: &str) -> Option<bool> {
        self.creatable.read().get(element).copied()
    }

    pub fn memo_len(&self) -> usize {
        self.memo.lock().len()
    }

    pub fn clear_caches(&self) {
        self.creatable.write().clear();
        self.memo.lock().clear();
    }

    /// Candidate recipes, best first: fully available ingredients, then
    /// more base-element ingredients, then by result and canonical key.
    fn rank<'r>(&self, recipes: &'r [Recipe], available: &HashSet<String>) -> Vec<&'r Recipe> {
        let mut ranked: Vec<&Recipe> = recipes.iter().collect();
        ranked.sort_by_cached_key(|recipe| {
            let ingredients = recipe.ingredients();
            let ready = ingredients
                .iter()
                .all(|i| is_base_element(i) || available.contains(*i));
            let bases = ingredients.iter().filter(|i| is_base_element(i)).count();
            (
                Reverse(ready),
                Reverse(bases),
                recipe.result.clone(),
                recipe.key(),
            )
        });
        ranked
    }

    fn build<'a>(
        &'a self,
        target: &'a str,
        available: &HashSet<String>,
        walk: &mut Walk<'a, '_>,
        depth: usize,
    ) -> Result<Option<Path>> {
        walk.calls += 1;
        if walk.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if is_base_element(target) || available.contains(target) {
            return Ok(Some(Vec::new()));
        }
        if depth >= self.build_depth_limit || walk.branch.contains(&target) {
            return Ok(None);
        }

        let cached = self.memo.lock().get(target).cloned();
        if let Some(cached) = cached {
            if let Some(steps) = replay_onto(&cached, available) {
                return Ok(Some(steps));
            }
        }

        if !self.is_creatable(target) {
            return Ok(None);
        }

        // Memo entries start from the base elements, so build from scratch
        // first and replay; only a guard-limited miss falls through to a
        // build in the caller's context.
        if !available.is_empty() {
            if let Some(full) = self.build(target, &HashSet::new(), walk, depth)? {
                if let Some(steps) = replay_onto(&full, available) {
                    return Ok(Some(steps));
                }
            }
        }

        walk.branch.push(target);
        let mut best: Option<Path> = None;
        let mut outcome = Ok(());
        for recipe in self.rank(self.graph.producers(target), available) {
            match self.compose(recipe, available, walk, depth) {
                Ok(Some(path)) => {
                    if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                        best = Some(path);
                    }
                    // Nothing beats a single step.
                    if best.as_ref().is_some_and(|b| b.len() == 1) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        walk.branch.pop();
        outcome?;

        if let Some(path) = best.as_ref().filter(|_| available.is_empty()) {
            let mut memo = self.memo.lock();
            let shorter = memo.get(target).map_or(true, |m| path.len() < m.len());
            if shorter {
                memo.insert(target.to_string(), path.clone());
            }
        }
        Ok(best)
    }

    /// Build each missing ingredient of `recipe` in turn, then the recipe.
    fn compose<'a>(
        &'a self,
        recipe: &'a Recipe,
        available: &HashSet<String>,
        walk: &mut Walk<'a, '_>,
        depth: usize,
    ) -> Result<Option<Path>> {
        let mut local = available.clone();
        let mut steps: Path = Vec::new();
        let (a, b) = recipe.sorted_ingredients();

        for ingredient in [a, b] {
            if is_base_element(ingredient) || local.contains(ingredient) {
                continue;
            }
            match self.build(ingredient, &local, walk, depth + 1)? {
                Some(sub) => {
                    local.extend(sub.iter().map(|r| r.result.clone()));
                    steps.extend(sub);
                }
                None => return Ok(None),
            }
        }

        steps.push(recipe.clone());
        Ok(Some(steps))
    }

    fn finish(&self, target: &str, path: Option<Path>, calls: usize) -> Result<SearchOutcome> {
        match path {
            Some(path) if !path.is_empty() => {
                let path = dedup_recipes(path);
                validate(&path, target)?;
                tracing::debug!(element = target, steps = path.len(), calls, "dfs built path");
                Ok(SearchOutcome {
                    path,
                    nodes_visited: calls,
                })
            }
            _ => Err(SearchError::not_found(target, calls)),
        }
    }

    fn search(&self, target: &str, cancel: &CancelToken) -> Result<SearchOutcome> {
        if is_base_element(target) {
            return Ok(SearchOutcome::empty());
        }
        let mut walk = Walk {
            branch: Vec::new(),
            calls: 0,
            cancel,
        };
        let path = self.build(target, &HashSet::new(), &mut walk, 0)?;
        self.finish(target, path, walk.calls)
    }

    /// Build a path whose last step is `recipe`, reusing the memoized
    /// builder for both ingredients.
    pub fn compose_final(&self, recipe: &Recipe, cancel: &CancelToken) -> Result<SearchOutcome> {
        let target = recipe.result.as_str();
        if !recipe.ingredients().iter().all(|i| self.is_creatable(i)) {
            return Err(SearchError::not_found(target, 0));
        }
        let mut walk = Walk {
            branch: vec![target],
            calls: 0,
            cancel,
        };
        let path = self.compose(recipe, &HashSet::new(), &mut walk, 0)?;
        self.finish(target, path, walk.calls)
    }

    /// Paths distinct from `existing` that end in a different recipe for
    /// `target`, shortest first. At most `max_paths` are returned.
    ///
    /// Candidate final recipes are spread over a pool of
    /// `alternative_workers` threads; the pool stops once enough distinct
    /// paths are collected.
    pub fn find_alternative_paths(
        &self,
        target: &str,
        existing: &[Recipe],
        max_paths: usize,
    ) -> Result<Vec<Path>> {
        if max_paths == 0 {
            return Err(SearchError::InvalidRequest(
                "max_paths must be at least 1".to_string(),
            ));
        }
        if is_base_element(target) {
            return Ok(Vec::new());
        }

        let used_final = existing
            .iter()
            .rev()
            .find(|r| r.result == target)
            .map(Recipe::key);
        let candidates: Vec<&Recipe> = self
            .graph
            .distinct_producers(target)
            .into_iter()
            .filter(|r| used_final.as_deref() != Some(r.key().as_str()))
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        if !existing.is_empty() {
            seen.insert(path_identifier(existing));
        }
        let accepted: Mutex<(Vec<Path>, HashSet<String>)> = Mutex::new((Vec::new(), seen));
        let next = AtomicUsize::new(0);
        let cancel = CancelToken::new();
        let workers = self.alternative_workers.min(candidates.len());

        std::thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(recipe) = candidates.get(index) else {
                        break;
                    };
                    match self.compose_final(recipe, &cancel) {
                        Ok(outcome) => {
                            let id = path_identifier(&outcome.path);
                            let mut guard = accepted.lock();
                            let (paths, ids) = &mut *guard;
                            if paths.len() < max_paths && ids.insert(id) {
                                paths.push(outcome.path);
                                if paths.len() >= max_paths {
                                    cancel.cancel();
                                }
                            }
                        }
                        Err(SearchError::Cancelled) => break,
                        Err(err) => {
                            tracing::debug!(element = target, recipe = %recipe, %err, "alternative rejected");
                        }
                    }
                });
            }
        });

        let (mut paths, _) = accepted.into_inner();
        paths.sort_by_cached_key(|p| (p.len(), path_identifier(p)));
        Ok(paths)
    }
}

impl SinglePathFinder for ExhaustivePathBuilder {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dfs
    }

    fn find_variant(
        &self,
        target: &str,
        variant: usize,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome> {
        let producers = self.graph.distinct_producers(target);
        if variant == 0 || is_base_element(target) || producers.is_empty() {
            return self.search(target, cancel);
        }
        let recipe = producers[(variant - 1) % producers.len()];
        self.compose_final(recipe, cancel)
    }

    fn variant_count(&self, target: &str) -> usize {
        self.graph.distinct_producers(target).len() + 1
    }

    fn variants_repeat(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BASE_ELEMENTS;
    use crate::test_support::{branching, bushy, cyclic, elemental, elemental_recipes, r};
    use test_log::test;

    fn builder(graph: RecipeGraph) -> ExhaustivePathBuilder {
        ExhaustivePathBuilder::new(Arc::new(graph), &SearchConfig::default())
    }

    #[test]
    fn test_mud_and_stone() {
        let dfs = builder(elemental());
        let mud = dfs.find_path("Mud").unwrap();
        assert_eq!(mud.path, vec![r("Water", "Earth", "Mud")]);
        assert!(mud.nodes_visited > 0);

        let stone = dfs.find_path("Stone").unwrap();
        let keys: Vec<String> = stone.path.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["Earth+Fire=>Lava", "Lava+Water=>Stone"]);
    }

    #[test]
    fn test_base_elements_empty_path() {
        let dfs = builder(elemental());
        for base in BASE_ELEMENTS {
            let outcome = dfs.find_path(base).unwrap();
            assert!(outcome.path.is_empty());
            assert_eq!(outcome.nodes_visited, 0);
        }
    }

    #[test]
    fn test_unreachable_target() {
        let dfs = builder(cyclic());
        for target in ["Chicken", "Egg", "Nest", "Unobtainium"] {
            let err = dfs.find_path(target).unwrap_err();
            assert!(err.is_not_found(), "{target}: {err:?}");
        }
        assert_eq!(dfs.creatable_cached("Chicken"), Some(false));
    }

    #[test]
    fn test_branch_guard_does_not_cache_false() {
        // Bog is only reachable through Swamp; evaluating Swamp first visits
        // Bog while Swamp is on the branch.
        let dfs = builder(RecipeGraph::build(vec![
            r("Air", "Bog", "Swamp"),
            r("Air", "Fire", "Swamp"),
            r("Swamp", "Earth", "Bog"),
        ]));
        assert!(dfs.is_creatable("Swamp"));
        assert_eq!(dfs.creatable_cached("Bog"), None);
        assert!(dfs.is_creatable("Bog"));

        let bog = dfs.find_path("Bog").unwrap();
        validate(&bog.path, "Bog").unwrap();
        assert_eq!(bog.path.len(), 2);
    }

    #[test]
    fn test_prefers_shorter_composition() {
        let dfs = builder(branching());
        let metal = dfs.find_path("Metal").unwrap();
        validate(&metal.path, "Metal").unwrap();
        assert_eq!(metal.path.len(), 3);
        assert_eq!(metal.path.last().map(|r| r.key()).as_deref(), Some("Fire+Stone=>Metal"));

        let golem = dfs.find_path("Golem").unwrap();
        assert_eq!(golem.path.len(), 3);
        assert_eq!(golem.path.last().map(|r| r.key()).as_deref(), Some("Energy+Mud=>Golem"));
    }

    #[test]
    fn test_every_element_valid() {
        let graph = branching();
        let elements: Vec<String> = graph.elements().map(String::from).collect();
        let dfs = builder(graph);
        for element in elements {
            let outcome = dfs.find_path(&element).unwrap();
            validate(&outcome.path, &element).unwrap();
        }
        assert!(dfs.memo_len() > 0);
        dfs.clear_caches();
        assert_eq!(dfs.memo_len(), 0);
        assert_eq!(dfs.creatable_cached("Stone"), None);
    }

    #[test]
    fn test_memo_reused_across_contexts() {
        // Stone is first needed with Lava already available, then from scratch.
        let mut recipes = elemental_recipes();
        recipes.push(r("Lava", "Stone", "Crater"));
        let dfs = builder(RecipeGraph::build(recipes));

        let crater = dfs.find_path("Crater").unwrap();
        validate(&crater.path, "Crater").unwrap();
        assert_eq!(crater.path.len(), 3);

        let before = dfs.memo_len();
        let stone = dfs.find_path("Stone").unwrap();
        assert_eq!(stone.path.len(), 2);
        assert_eq!(stone.nodes_visited, 1);
        assert_eq!(dfs.memo_len(), before);
    }

    #[test]
    fn test_dense_relation_stays_tractable() {
        let dfs = builder(bushy(200));
        let outcome = dfs.find_path("E199").unwrap();
        validate(&outcome.path, "E199").unwrap();
        assert!(outcome.nodes_visited < 20_000, "{} builder calls", outcome.nodes_visited);
    }

    #[test]
    fn test_depth_guard() {
        let config = SearchConfig {
            build_depth_limit: 1,
            ..SearchConfig::default()
        };
        let dfs = ExhaustivePathBuilder::new(Arc::new(elemental()), &config);
        assert!(dfs.find_path("Mud").is_ok());
        assert!(dfs.find_path("Stone").unwrap_err().is_not_found());
    }

    #[test]
    fn test_alternative_paths() {
        let dfs = builder(branching());
        let best = dfs.find_path("Golem").unwrap();
        let alternatives = dfs.find_alternative_paths("Golem", &best.path, 5).unwrap();
        assert_eq!(alternatives.len(), 2);

        let mut ids: HashSet<String> = HashSet::from([path_identifier(&best.path)]);
        for path in &alternatives {
            validate(path, "Golem").unwrap();
            assert_ne!(path.last(), best.path.last());
            assert!(ids.insert(path_identifier(path)));
        }
        assert!(alternatives[0].len() <= alternatives[1].len());
    }

    #[test]
    fn test_alternative_paths_capped() {
        let dfs = builder(branching());
        let best = dfs.find_path("Golem").unwrap();
        let alternatives = dfs.find_alternative_paths("Golem", &best.path, 1).unwrap();
        assert_eq!(alternatives.len(), 1);

        let err = dfs.find_alternative_paths("Golem", &best.path, 0).unwrap_err();
        assert!(matches!(err, SearchError::InvalidRequest(_)));
    }

    #[test]
    fn test_alternative_paths_single_producer() {
        let dfs = builder(elemental());
        let best = dfs.find_path("Mud").unwrap();
        assert!(dfs.find_alternative_paths("Mud", &best.path, 3).unwrap().is_empty());
    }

    #[test]
    fn test_variants_fix_final_recipe() {
        let dfs = builder(branching());
        let producers: Vec<String> = ["Brick+Dust=>Golem", "Energy+Mud=>Golem", "Plant+Stone=>Golem"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for (i, key) in producers.iter().enumerate() {
            let outcome = dfs.find_variant("Golem", i + 1, &CancelToken::new()).unwrap();
            validate(&outcome.path, "Golem").unwrap();
            assert_eq!(outcome.path.last().map(|r| r.key()).as_ref(), Some(key));
        }
        assert_eq!(dfs.variant_count("Golem"), 4);
        assert!(dfs.variants_repeat());
    }

    #[test]
    fn test_cancelled_search() {
        let dfs = builder(elemental());
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            dfs.find_variant("Stone", 0, &token).unwrap_err(),
            SearchError::Cancelled
        );
    }
}
