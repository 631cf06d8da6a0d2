//! Merge Visual Studio solution files.
//!
//! Several `.sln` files are parsed into [`models::Solution`] values and merged
//! into one. Project GUIDs that collide across inputs are relocated, the
//! original solution-folder nesting of every input is carried forward, and
//! each input's projects are grouped under a folder named after it.

pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod parser;
pub mod tree_render;

pub use error::{MergeError, Result};
pub use merge::{merge, merge_solutions, MergeOptions, MergeOutcome, MergeReport};
pub use models::Solution;
