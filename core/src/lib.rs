//! recipe-path-core: synthesis-path search over binary recipes.
//!
//! Given the four base elements and a relation of recipes (two ingredients
//! combine into one result), finds sequences of recipe applications that
//! produce a requested element. Three single-path strategies share one
//! immutable [`RecipeGraph`]:
//!
//! - [`ShortestPathFinder`]: breadth-first, fewest discovery rounds;
//! - [`ExhaustivePathBuilder`]: memoized depth-first composition;
//! - [`MeetingPathFinder`]: bidirectional meet-in-the-middle.
//!
//! [`MultiPathOrchestrator`] runs any of them on a worker pool to collect
//! several distinct paths. [`SearchEngine`] ties it all together.
//! No I/O happens here; callers load recipes and install a tracing
//! subscriber if they want logs.

mod bds;
mod bfs;
mod cancel;
mod config;
mod dfs;
mod engine;
mod error;
mod finder;
mod graph;
mod multi;
mod path;

#[cfg(test)]
mod test_support;

pub use bds::MeetingPathFinder;
pub use bfs::ShortestPathFinder;
pub use cancel::CancelToken;
pub use config::SearchConfig;
pub use dfs::ExhaustivePathBuilder;
pub use engine::{GraphStats, SearchEngine};
pub use error::{Result, SearchError};
pub use finder::{Algorithm, SearchOutcome, SinglePathFinder};
pub use graph::{is_base_element, Recipe, RecipeGraph, BASE_ELEMENTS};
pub use multi::{MultiPathOrchestrator, MultiPathResult};
pub use path::{dedup_recipes, is_valid, path_identifier, replay, validate, Path, StepViolation};
