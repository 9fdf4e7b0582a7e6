use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Elements that are always available and never produced by a recipe.
/// Kept in lexicographic order; searches seed their frontiers in this order.
pub const BASE_ELEMENTS: [&str; 4] = ["Air", "Earth", "Fire", "Water"];

pub fn is_base_element(name: &str) -> bool {
    BASE_ELEMENTS.contains(&name)
}

/// A binary production rule: two ingredients combine into one result.
///
/// Ingredient order carries no meaning; `A + B` and `B + A` are the same
/// recipe. Use [`Recipe::key`] when comparing recipes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipe {
    pub result: String,
    pub ingredient1: String,
    pub ingredient2: String,
}

impl Recipe {
    pub fn new(
        ingredient1: impl Into<String>,
        ingredient2: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            result: result.into(),
            ingredient1: ingredient1.into(),
            ingredient2: ingredient2.into(),
        }
    }

    /// Ingredients in lexicographic order.
    pub fn sorted_ingredients(&self) -> (&str, &str) {
        if self.ingredient1 <= self.ingredient2 {
            (&self.ingredient1, &self.ingredient2)
        } else {
            (&self.ingredient2, &self.ingredient1)
        }
    }

    /// Canonical `ing1+ing2=>result` key with sorted ingredients.
    pub fn key(&self) -> String {
        let (a, b) = self.sorted_ingredients();
        format!("{}+{}=>{}", a, b, self.result)
    }

    /// The ingredient paired with `element`, or None if `element` is not an
    /// ingredient of this recipe.
    pub fn other_ingredient(&self, element: &str) -> Option<&str> {
        if self.ingredient1 == element {
            Some(&self.ingredient2)
        } else if self.ingredient2 == element {
            Some(&self.ingredient1)
        } else {
            None
        }
    }

    pub fn ingredients(&self) -> [&str; 2] {
        [&self.ingredient1, &self.ingredient2]
    }
}

impl std::fmt::Display for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} + {} => {}", self.ingredient1, self.ingredient2, self.result)
    }
}

/// Immutable recipe indices, built once and shared read-only by every search.
///
/// `by_result[r]` lists the recipes producing `r`; `by_ingredient[e]` lists
/// the recipes consuming `e`. A recipe with two distinct ingredients appears
/// under both of them, one with a repeated ingredient appears once. Both
/// lists are sorted by canonical key so traversal order never depends on
/// input order.
#[derive(Debug, Default)]
pub struct RecipeGraph {
    by_result: HashMap<String, Vec<Recipe>>,
    by_ingredient: HashMap<String, Vec<Recipe>>,
    elements: BTreeSet<String>,
    recipe_count: usize,
    duplicates_dropped: usize,
}

impl RecipeGraph {
    /// Build both indices from a recipe relation.
    ///
    /// Repeated recipes (including `B + A` after `A + B`) are collapsed to
    /// their first occurrence.
    pub fn build<I>(recipes: I) -> Self
    where
        I: IntoIterator<Item = Recipe>,
    {
        let mut graph = Self::default();
        let mut seen: HashSet<String> = HashSet::new();

        for base in BASE_ELEMENTS {
            graph.elements.insert(base.to_string());
        }

        for recipe in recipes {
            if !seen.insert(recipe.key()) {
                graph.duplicates_dropped += 1;
                continue;
            }

            graph.elements.insert(recipe.result.clone());
            graph.elements.insert(recipe.ingredient1.clone());
            graph.elements.insert(recipe.ingredient2.clone());

            graph
                .by_ingredient
                .entry(recipe.ingredient1.clone())
                .or_default()
                .push(recipe.clone());
            if recipe.ingredient2 != recipe.ingredient1 {
                graph
                    .by_ingredient
                    .entry(recipe.ingredient2.clone())
                    .or_default()
                    .push(recipe.clone());
            }
            graph
                .by_result
                .entry(recipe.result.clone())
                .or_default()
                .push(recipe);
            graph.recipe_count += 1;
        }

        for list in graph
            .by_result
            .values_mut()
            .chain(graph.by_ingredient.values_mut())
        {
            list.sort_by_cached_key(Recipe::key);
        }

        tracing::info!(
            elements = graph.elements.len(),
            recipes = graph.recipe_count,
            duplicates = graph.duplicates_dropped,
            "recipe graph built"
        );

        graph
    }

    /// Recipes that produce `element`.
    pub fn producers(&self, element: &str) -> &[Recipe] {
        self.by_result.get(element).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Recipes that use `element` as an ingredient.
    pub fn consumers(&self, element: &str) -> &[Recipe] {
        self.by_ingredient
            .get(element)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct recipes producing `target`, ordered by canonical key.
    ///
    /// Recipes are already deduplicated at build time, so this is
    /// [`producers`](Self::producers) with the ordering made explicit.
    pub fn distinct_producers(&self, target: &str) -> Vec<&Recipe> {
        self.producers(target).iter().collect()
    }

    pub fn contains_element(&self, name: &str) -> bool {
        self.elements.contains(name)
    }

    /// Every known element name, sorted. Includes the base elements.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|s| s.as_str())
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipe_count
    }

    /// Number of input recipes collapsed as duplicates during build.
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{elemental, r};
    use test_log::test;

    #[test]
    fn test_recipe_key_ignores_ingredient_order() {
        assert_eq!(r("Water", "Earth", "Mud").key(), "Earth+Water=>Mud");
        assert_eq!(r("Earth", "Water", "Mud").key(), "Earth+Water=>Mud");
    }

    #[test]
    fn test_other_ingredient() {
        let recipe = r("Water", "Earth", "Mud");
        assert_eq!(recipe.other_ingredient("Water"), Some("Earth"));
        assert_eq!(recipe.other_ingredient("Earth"), Some("Water"));
        assert_eq!(recipe.other_ingredient("Fire"), None);

        let doubled = r("Fire", "Fire", "Energy");
        assert_eq!(doubled.other_ingredient("Fire"), Some("Fire"));
    }

    #[test]
    fn test_indices_cover_every_recipe() {
        let g = elemental();
        assert_eq!(g.recipe_count(), 4);
        assert_eq!(g.producers("Stone").len(), 1);
        assert_eq!(g.producers("Water").len(), 0);

        // Water feeds Mud, Steam and Stone
        let water: Vec<&str> = g.consumers("Water").iter().map(|r| r.result.as_str()).collect();
        assert_eq!(water, vec!["Mud", "Steam", "Stone"]);
    }

    #[test]
    fn test_repeated_ingredient_indexed_once() {
        let g = RecipeGraph::build(vec![r("Fire", "Fire", "Energy")]);
        assert_eq!(g.consumers("Fire").len(), 1);
        assert_eq!(g.producers("Energy").len(), 1);
    }

    #[test]
    fn test_duplicates_collapsed() {
        let g = RecipeGraph::build(vec![
            r("Water", "Earth", "Mud"),
            r("Earth", "Water", "Mud"),
            r("Water", "Earth", "Mud"),
        ]);
        assert_eq!(g.recipe_count(), 1);
        assert_eq!(g.duplicates_dropped(), 2);
        assert_eq!(g.consumers("Water").len(), 1);
        assert_eq!(g.consumers("Earth").len(), 1);
    }

    #[test]
    fn test_index_order_independent_of_input_order() {
        let forward = RecipeGraph::build(vec![
            r("Air", "Fire", "Energy"),
            r("Air", "Water", "Rain"),
            r("Air", "Earth", "Dust"),
        ]);
        let reversed = RecipeGraph::build(vec![
            r("Air", "Earth", "Dust"),
            r("Air", "Water", "Rain"),
            r("Air", "Fire", "Energy"),
        ]);
        assert_eq!(forward.consumers("Air"), reversed.consumers("Air"));
    }

    #[test]
    fn test_elements_include_base() {
        let g = RecipeGraph::build(Vec::new());
        assert_eq!(g.element_count(), 4);
        assert!(g.contains_element("Fire"));
        assert!(!g.contains_element("Mud"));

        let g = elemental();
        let names: Vec<&str> = g.elements().collect();
        assert_eq!(
            names,
            vec!["Air", "Earth", "Fire", "Lava", "Mud", "Steam", "Stone", "Water"]
        );
    }

    #[test]
    fn test_distinct_producers_sorted() {
        let g = RecipeGraph::build(vec![
            r("Water", "Lava", "Stone"),
            r("Earth", "Air", "Stone"),
        ]);
        let keys: Vec<String> = g.distinct_producers("Stone").iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["Air+Earth=>Stone", "Lava+Water=>Stone"]);
    }

    #[test]
    fn test_base_elements() {
        for base in BASE_ELEMENTS {
            assert!(is_base_element(base));
        }
        assert!(!is_base_element("Mud"));
        assert!(!is_base_element("air"));
    }
}
