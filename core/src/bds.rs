use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::bfs::{ForwardFrontier, ShortestPathFinder};
use crate::cancel::CancelToken;
use crate::error::{Result, SearchError};
use crate::finder::{Algorithm, SearchOutcome, SinglePathFinder};
use crate::graph::{is_base_element, Recipe, RecipeGraph};
use crate::path::{dedup_recipes, topological_order, validate, Path};

/// Bidirectional meeting search.
///
/// A forward frontier grows from the base elements through consumer
/// recipes while a backward frontier decomposes the target into ingredient
/// sub-goals through producer recipes. The two advance one level at a time
/// and stop at the first element both have discovered. Missing pieces are
/// then filled in by the shortest-path finder and the merged recipe set is
/// put in availability order.
pub struct MeetingPathFinder {
    bfs: Arc<ShortestPathFinder>,
}

/// Where the two frontiers met, and what the backward side recorded.
struct Meeting<'g> {
    node: &'g str,
    final_recipe: Option<&'g Recipe>,
}

impl MeetingPathFinder {
    pub fn new(bfs: Arc<ShortestPathFinder>) -> Self {
        Self { bfs }
    }

    fn graph(&self) -> &RecipeGraph {
        self.bfs.graph()
    }

    pub fn find_meeting_path(&self, target: &str) -> Result<SearchOutcome> {
        self.search(target, 0, &CancelToken::new())
    }

    fn search(&self, target: &str, variant: usize, cancel: &CancelToken) -> Result<SearchOutcome> {
        if is_base_element(target) {
            return Ok(SearchOutcome::empty());
        }

        let graph = self.graph();
        let producers = graph.distinct_producers(target);
        let designated: Option<&Recipe> = if variant > 0 && !producers.is_empty() {
            Some(producers[(variant - 1) % producers.len()])
        } else {
            None
        };
        let designated_key = designated.map(Recipe::key);
        let allow = |recipe: &Recipe| match &designated_key {
            Some(key) if recipe.result == target => recipe.key() == *key,
            _ => true,
        };

        let mut forward = ForwardFrontier::new(graph, 0);
        let mut back_parent: HashMap<&str, &Recipe> = HashMap::new();
        let mut back_seen: HashSet<&str> = HashSet::from([target]);
        let mut back_queue: VecDeque<&str> = VecDeque::from([target]);
        let mut nodes_visited = 0;
        let mut meeting: Option<&str> = None;

        'search: while forward.queued() > 0 || !back_queue.is_empty() {
            for _ in 0..forward.queued() {
                if cancel.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }
                let Some(current) = forward.pop() else {
                    break;
                };
                nodes_visited += 1;
                if let Some(node) = forward.expand(current, 0, &allow, |e| back_seen.contains(e)) {
                    meeting = Some(node);
                    break 'search;
                }
            }

            for _ in 0..back_queue.len() {
                if cancel.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }
                let Some(current) = back_queue.pop_front() else {
                    break;
                };
                nodes_visited += 1;

                let recipes = graph.producers(current);
                let n = recipes.len();
                let offset = variant.saturating_sub(1);
                for i in 0..n {
                    let recipe = &recipes[(i + offset) % n];
                    back_parent.entry(current).or_insert(recipe);
                    for ingredient in recipe.ingredients() {
                        if !back_seen.insert(ingredient) {
                            continue;
                        }
                        back_queue.push_back(ingredient);
                        if forward.is_discovered(ingredient) {
                            meeting = Some(ingredient);
                            break 'search;
                        }
                    }
                }
            }
        }

        let Some(node) = meeting else {
            tracing::debug!(element = target, nodes_visited, "bds frontiers exhausted");
            return Err(SearchError::not_found(target, nodes_visited));
        };
        tracing::debug!(element = target, meeting = node, variant, "bds frontiers met");

        if node == target {
            let path = forward.reconstruct(target)?;
            return Ok(SearchOutcome {
                path,
                nodes_visited,
            });
        }

        let meeting = Meeting {
            node,
            final_recipe: designated.or_else(|| back_parent.get(target).copied()),
        };
        self.complete(target, &meeting, &forward, nodes_visited, cancel)
    }

    /// Turn a meeting into a full path, trying the other producers of
    /// `target` when the recorded final recipe cannot be completed.
    fn complete(
        &self,
        target: &str,
        meeting: &Meeting<'_>,
        forward: &ForwardFrontier<'_>,
        mut nodes_visited: usize,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome> {
        let producers = self.graph().distinct_producers(target);
        let first = meeting.final_recipe.or_else(|| producers.first().copied());
        let Some(first) = first else {
            return Err(SearchError::not_found(target, nodes_visited));
        };

        let fallbacks = producers.iter().copied().filter(|r| r.key() != first.key());
        for (attempt, recipe) in std::iter::once(first).chain(fallbacks).enumerate() {
            let meeting_node = (attempt == 0).then_some(meeting.node);
            match self.assemble(target, recipe, meeting_node, forward, cancel) {
                Ok((path, visited)) => {
                    nodes_visited += visited;
                    return Ok(SearchOutcome {
                        path,
                        nodes_visited,
                    });
                }
                Err(SearchError::NotFound {
                    nodes_visited: visited,
                    ..
                }) => {
                    nodes_visited += visited;
                    tracing::debug!(element = target, recipe = %recipe, "bds final recipe unreachable");
                }
                Err(err) => return Err(err),
            }
        }

        Err(SearchError::not_found(target, nodes_visited))
    }

    /// Gather the recipes for one candidate final recipe and order them.
    ///
    /// When the meeting node is one of the final recipe's ingredients, its
    /// forward segment is reused and only the other ingredient is searched.
    /// Otherwise both ingredients are searched independently.
    fn assemble(
        &self,
        target: &str,
        final_recipe: &Recipe,
        meeting: Option<&str>,
        forward: &ForwardFrontier<'_>,
        cancel: &CancelToken,
    ) -> Result<(Path, usize)> {
        let mut gathered: Vec<Recipe> = Vec::new();
        let mut visited = 0;

        let (a, b) = final_recipe.sorted_ingredients();
        let mut missing: Vec<&str> = match meeting.and_then(|m| final_recipe.other_ingredient(m).map(|o| (m, o))) {
            Some((node, other)) => {
                gathered.extend(forward.reconstruct(node)?);
                vec![other]
            }
            None => vec![a, b],
        };
        missing.dedup();

        for ingredient in missing {
            match self.bfs.search(ingredient, cancel) {
                Ok(outcome) => {
                    visited += outcome.nodes_visited;
                    gathered.extend(outcome.path);
                }
                Err(SearchError::NotFound { nodes_visited, .. }) => {
                    return Err(SearchError::not_found(target, visited + nodes_visited));
                }
                Err(err) => return Err(err),
            }
        }
        gathered.push(final_recipe.clone());

        let path = topological_order(dedup_recipes(gathered), target)?;
        validate(&path, target)?;
        Ok((path, visited))
    }
}

impl SinglePathFinder for MeetingPathFinder {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bds
    }

    fn find_variant(
        &self,
        target: &str,
        variant: usize,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome> {
        self.search(target, variant, cancel)
    }

    fn variant_count(&self, target: &str) -> usize {
        self.graph().distinct_producers(target).len() + 1
    }
}
