//! Domain models for solution merging.
//!
//! # Core Concepts
//!
//! - [`Solution`]: A parsed `.sln` file or a merged result. Owns an ordered
//!   list of projects, an opaque properties block and a [`NestedSection`].
//! - [`Project`]: One project entry. Identity is its [`Guid`]; the entry also
//!   remembers which solution it came from.
//! - [`ProjectKind`]: Solution folder, web site, or project file on disk.
//!   Folder grouping during a merge dispatches on this.
//! - [`NestedSection`]: `child -> parent` folder membership. A forest: every
//!   entry has at most one parent.

mod guid;
mod nested;
pub(crate) mod paths;
mod project;
mod solution;

pub use guid::*;
pub use nested::*;
pub use project::*;
pub use solution::*;
