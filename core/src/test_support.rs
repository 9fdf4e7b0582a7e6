//! Small hand-made recipe relations shared by the unit tests.

use crate::graph::{Recipe, RecipeGraph, BASE_ELEMENTS};

pub(crate) fn r(ingredient1: &str, ingredient2: &str, result: &str) -> Recipe {
    Recipe::new(ingredient1, ingredient2, result)
}

/// Mud = Water+Earth, Steam = Water+Fire, Lava = Earth+Fire, Stone = Lava+Water.
pub(crate) fn elemental_recipes() -> Vec<Recipe> {
    vec![
        r("Water", "Earth", "Mud"),
        r("Water", "Fire", "Steam"),
        r("Earth", "Fire", "Lava"),
        r("Lava", "Water", "Stone"),
    ]
}

pub(crate) fn elemental() -> RecipeGraph {
    RecipeGraph::build(elemental_recipes())
}

/// A relation where `Golem` has three distinct producers and some
/// intermediates have alternatives of their own.
pub(crate) fn branching_recipes() -> Vec<Recipe> {
    let mut recipes = elemental_recipes();
    recipes.extend([
        r("Air", "Fire", "Energy"),
        r("Air", "Water", "Rain"),
        r("Air", "Earth", "Dust"),
        r("Rain", "Earth", "Plant"),
        r("Mud", "Fire", "Brick"),
        r("Stone", "Fire", "Metal"),
        r("Energy", "Stone", "Metal"),
        r("Mud", "Energy", "Golem"),
        r("Stone", "Plant", "Golem"),
        r("Brick", "Dust", "Golem"),
    ]);
    recipes
}

pub(crate) fn branching() -> RecipeGraph {
    RecipeGraph::build(branching_recipes())
}

/// Elements that only produce each other: neither is creatable.
pub(crate) fn cyclic_recipes() -> Vec<Recipe> {
    let mut recipes = elemental_recipes();
    recipes.extend([
        r("Egg", "Fire", "Chicken"),
        r("Chicken", "Water", "Egg"),
        r("Egg", "Mud", "Nest"),
    ]);
    recipes
}

pub(crate) fn cyclic() -> RecipeGraph {
    RecipeGraph::build(cyclic_recipes())
}

/// Dense generated relation: element `E{i}` has six producers whose
/// ingredients are base elements or elements with a smaller index.
pub(crate) fn bushy(element_count: usize) -> RecipeGraph {
    let mut state: u64 = 67890;
    let mut next = |max: usize| {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((state >> 33) % max as u64) as usize
    };
    let mut recipes = Vec::with_capacity(element_count * 6);
    for i in 0..element_count {
        for _ in 0..6 {
            let [a, b] = [next(i + BASE_ELEMENTS.len()), next(i + BASE_ELEMENTS.len())].map(|choice| {
                if choice < BASE_ELEMENTS.len() {
                    BASE_ELEMENTS[choice].to_string()
                } else {
                    format!("E{}", choice - BASE_ELEMENTS.len())
                }
            });
            recipes.push(Recipe::new(a, b, format!("E{i}")));
        }
    }
    RecipeGraph::build(recipes)
}
