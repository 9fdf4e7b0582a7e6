//! Recipe relation loading.
//!
//! The file is a JSON array of `{"result", "ingredient1", "ingredient2"}`
//! objects. Records with an empty name are skipped with a warning; everything
//! else is handed to the engine unchanged.

use std::path::Path;
use std::time::Instant;

use recipe_path_core::Recipe;

use crate::error::CliError;

pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>, CliError> {
    let start = Instant::now();
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let recipes = parse_recipes(&raw).map_err(|source| CliError::Recipes {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        recipes = recipes.len(),
        load_time_ms = start.elapsed().as_secs_f64() * 1000.0,
        "recipes loaded"
    );
    Ok(recipes)
}

pub fn parse_recipes(raw: &str) -> Result<Vec<Recipe>, serde_json::Error> {
    let records: Vec<Recipe> = serde_json::from_str(raw)?;
    let total = records.len();
    let recipes: Vec<Recipe> = records
        .into_iter()
        .filter(|r| !r.result.is_empty() && !r.ingredient1.is_empty() && !r.ingredient2.is_empty())
        .collect();
    if recipes.len() < total {
        tracing::warn!(skipped = total - recipes.len(), "skipped recipes with empty names");
    }
    Ok(recipes)
}
