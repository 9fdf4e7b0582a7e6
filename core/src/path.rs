//! Path model: ordered recipe sequences, their canonical identifiers, and
//! replay-based validation shared by every finder.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::error::{Result, SearchError};
use crate::graph::{is_base_element, Recipe, BASE_ELEMENTS};

/// An ordered sequence of recipe applications starting from the base elements.
pub type Path = Vec<Recipe>;

/// Order-independent fingerprint of a path.
///
/// One `ing1+ing2=>result` entry per distinct result (the last recipe that
/// produces it wins), sorted and joined with `|`. Two paths with equal
/// identifiers are the same solution. The empty path has the empty identifier.
pub fn path_identifier(path: &[Recipe]) -> String {
    let mut by_result: BTreeMap<&str, &Recipe> = BTreeMap::new();
    for recipe in path {
        by_result.insert(recipe.result.as_str(), recipe);
    }
    let mut parts: Vec<String> = by_result.values().map(|r| r.key()).collect();
    parts.sort();
    parts.join("|")
}

/// Collapse recipes repeated by canonical key, keeping the first occurrence.
pub fn dedup_recipes(path: Path) -> Path {
    let mut seen: HashSet<String> = HashSet::with_capacity(path.len());
    path.into_iter().filter(|r| seen.insert(r.key())).collect()
}

/// Replay `path` from the base elements.
///
/// Returns the set of available elements afterwards, or the first step whose
/// ingredients were not yet available.
pub fn replay(path: &[Recipe]) -> std::result::Result<HashSet<&str>, StepViolation> {
    let mut available: HashSet<&str> = BASE_ELEMENTS.iter().copied().collect();
    for (step, recipe) in path.iter().enumerate() {
        for ingredient in recipe.ingredients() {
            if !available.contains(ingredient) {
                return Err(StepViolation {
                    step,
                    recipe: recipe.clone(),
                    missing: ingredient.to_string(),
                });
            }
        }
        available.insert(recipe.result.as_str());
    }
    Ok(available)
}

/// A recipe that fired before one of its ingredients existed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepViolation {
    pub step: usize,
    pub recipe: Recipe,
    pub missing: String,
}

impl std::fmt::Display for StepViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "step {} ({}) needs '{}' before it is available",
            self.step + 1,
            self.recipe,
            self.missing
        )
    }
}

/// Check that `path` replays cleanly and makes `target` available.
pub fn validate(path: &[Recipe], target: &str) -> Result<()> {
    let available = replay(path).map_err(|v| SearchError::InconsistentReconstruction {
        target: target.to_string(),
        detail: v.to_string(),
    })?;
    if !available.contains(target) {
        return Err(SearchError::InconsistentReconstruction {
            target: target.to_string(),
            detail: format!("path of {} steps never produces the target", path.len()),
        });
    }
    Ok(())
}

pub fn is_valid(path: &[Recipe], target: &str) -> bool {
    validate(path, target).is_ok()
}

/// Replay a previously computed path on top of `available`.
///
/// Steps whose result is already available are skipped. Returns the steps
/// that actually had to fire, or None if some ingredient is missing in this
/// context.
pub(crate) fn replay_onto(cached: &[Recipe], available: &HashSet<String>) -> Option<Path> {
    let mut local: HashSet<&str> = available.iter().map(|s| s.as_str()).collect();
    let mut steps = Vec::new();
    for recipe in cached {
        if local.contains(recipe.result.as_str()) {
            continue;
        }
        let ready = recipe
            .ingredients()
            .iter()
            .all(|i| is_base_element(i) || local.contains(i));
        if !ready {
            return None;
        }
        local.insert(recipe.result.as_str());
        steps.push(recipe.clone());
    }
    Some(steps)
}

/// Walk a result→recipe parent map back from `element`.
///
/// Returns every non-base element that must be produced, in breadth-first
/// order starting at `element` (ingredients visited alphabetically), or None
/// if some needed element has no recorded parent.
pub(crate) fn needed_elements<'g>(
    parents: &HashMap<&'g str, &'g Recipe>,
    element: &'g str,
) -> Option<Vec<&'g str>> {
    if is_base_element(element) {
        return Some(Vec::new());
    }

    let mut needed: Vec<&'g str> = vec![element];
    let mut seen: HashSet<&'g str> = HashSet::from([element]);
    let mut queue: VecDeque<&'g str> = VecDeque::from([element]);

    while let Some(current) = queue.pop_front() {
        let recipe: &'g Recipe = *parents.get(current)?;
        let (a, b) = recipe.sorted_ingredients();
        for ingredient in [a, b] {
            if !is_base_element(ingredient) && seen.insert(ingredient) {
                needed.push(ingredient);
                queue.push_back(ingredient);
            }
        }
    }

    Some(needed)
}

/// Order an unordered recipe set by availability expansion.
///
/// Each round appends every remaining recipe whose ingredients are
/// available (alphabetically by result) and marks its result available.
/// Recipes whose result is already available are dropped. Stops right after
/// the recipe producing `target`; a round that places nothing before that is
/// an [`InconsistentReconstruction`](SearchError::InconsistentReconstruction).
pub(crate) fn topological_order(recipes: Vec<Recipe>, target: &str) -> Result<Path> {
    let mut available: HashSet<String> = BASE_ELEMENTS.iter().map(|s| s.to_string()).collect();
    let mut remaining = recipes;
    let mut ordered: Path = Vec::with_capacity(remaining.len());

    while !available.contains(target) {
        remaining.retain(|r| !available.contains(&r.result));

        let (mut ready, blocked): (Vec<Recipe>, Vec<Recipe>) = remaining
            .into_iter()
            .partition(|r| r.ingredients().iter().all(|i| available.contains(*i)));

        if ready.is_empty() {
            let unplaced: Vec<String> = blocked.iter().map(|r| r.key()).collect();
            tracing::warn!(element = target, ?unplaced, "availability expansion stalled");
            return Err(SearchError::InconsistentReconstruction {
                target: target.to_string(),
                detail: format!("cannot place {} recipe(s): {}", unplaced.len(), unplaced.join(", ")),
            });
        }

        ready.sort_by(|a, b| a.result.cmp(&b.result).then_with(|| a.key().cmp(&b.key())));
        for recipe in ready {
            if available.insert(recipe.result.clone()) {
                let done = recipe.result == target;
                ordered.push(recipe);
                if done {
                    break;
                }
            }
        }
        remaining = blocked;
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::r;
    use test_log::test;

    #[test]
    fn test_identifier_order_independent() {
        let a = vec![r("Earth", "Fire", "Lava"), r("Water", "Earth", "Mud")];
        let b = vec![r("Earth", "Water", "Mud"), r("Fire", "Earth", "Lava")];
        assert_eq!(path_identifier(&a), path_identifier(&b));
        assert_eq!(path_identifier(&a), "Earth+Fire=>Lava|Earth+Water=>Mud");
    }

    #[test]
    fn test_identifier_last_producer_wins() {
        let path = vec![r("Air", "Fire", "Energy"), r("Fire", "Fire", "Energy")];
        assert_eq!(path_identifier(&path), "Fire+Fire=>Energy");
    }

    #[test]
    fn test_identifier_empty() {
        assert_eq!(path_identifier(&[]), "");
    }

    #[test]
    fn test_dedup_keeps_first() {
        let path = vec![
            r("Water", "Earth", "Mud"),
            r("Earth", "Fire", "Lava"),
            r("Earth", "Water", "Mud"),
        ];
        let deduped = dedup_recipes(path);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].ingredient1, "Water");
    }

    #[test]
    fn test_validate_accepts_ordered_path() {
        let path = vec![r("Earth", "Fire", "Lava"), r("Lava", "Water", "Stone")];
        assert!(validate(&path, "Stone").is_ok());
        assert!(validate(&[], "Air").is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_order() {
        let path = vec![r("Lava", "Water", "Stone"), r("Earth", "Fire", "Lava")];
        let err = validate(&path, "Stone").unwrap_err();
        assert!(
            matches!(err, SearchError::InconsistentReconstruction { .. }),
            "expected InconsistentReconstruction, got {err:?}"
        );
        assert_eq!(replay(&path).unwrap_err().missing, "Lava");
    }

    #[test]
    fn test_validate_rejects_missing_target() {
        let path = vec![r("Earth", "Fire", "Lava")];
        assert!(!is_valid(&path, "Stone"));
        assert!(!is_valid(&[], "Mud"));
    }

    #[test]
    fn test_replay_onto_skips_available() {
        let cached = vec![r("Earth", "Fire", "Lava"), r("Lava", "Water", "Stone")];
        let mut available: HashSet<String> = HashSet::new();
        available.insert("Lava".to_string());
        let steps = replay_onto(&cached, &available).unwrap();
        assert_eq!(steps, vec![r("Lava", "Water", "Stone")]);
    }

    #[test]
    fn test_replay_onto_rejects_missing_context() {
        let cached = vec![r("Lava", "Water", "Stone")];
        assert!(replay_onto(&cached, &HashSet::new()).is_none());
    }

    #[test]
    fn test_needed_elements_walks_parents() {
        let lava = r("Earth", "Fire", "Lava");
        let stone = r("Lava", "Water", "Stone");
        let mut parents: HashMap<&str, &Recipe> = HashMap::new();
        parents.insert("Lava", &lava);
        parents.insert("Stone", &stone);

        assert_eq!(needed_elements(&parents, "Stone"), Some(vec!["Stone", "Lava"]));
        assert_eq!(needed_elements(&parents, "Water"), Some(vec![]));
        assert_eq!(needed_elements(&parents, "Mud"), None);
    }

    #[test]
    fn test_topological_order_rounds() {
        let recipes = vec![
            r("Lava", "Water", "Stone"),
            r("Water", "Fire", "Steam"),
            r("Earth", "Fire", "Lava"),
            r("Stone", "Steam", "Geyser"),
        ];
        let ordered = topological_order(recipes, "Geyser").unwrap();
        let results: Vec<&str> = ordered.iter().map(|r| r.result.as_str()).collect();
        assert_eq!(results, vec!["Lava", "Steam", "Stone", "Geyser"]);
        assert!(is_valid(&ordered, "Geyser"));
    }

    #[test]
    fn test_topological_order_drops_redundant_producer() {
        let recipes = vec![
            r("Earth", "Fire", "Lava"),
            r("Air", "Fire", "Lava"),
            r("Lava", "Water", "Stone"),
        ];
        let ordered = topological_order(recipes, "Stone").unwrap();
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].key(), "Air+Fire=>Lava");
    }

    #[test]
    fn test_topological_order_reports_stall() {
        let recipes = vec![r("Lava", "Water", "Stone")];
        let err = topological_order(recipes, "Stone").unwrap_err();
        assert!(matches!(err, SearchError::InconsistentReconstruction { .. }));
    }
}
