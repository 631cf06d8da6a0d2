use std::path::PathBuf;

use thiserror::Error;

use crate::models::Guid;

/// Fatal merge errors.
///
/// Collisions, duplicates and malformed nesting are not errors; they are
/// absorbed by the merge and listed in the [`crate::MergeReport`].
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("No source solutions given")]
    NoSources,

    #[error("Solution file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Two source solutions are both named '{0}'; solution names must be distinct")]
    DuplicateSolutionName(String),

    #[error("Solution is inconsistent at {guid}: {reason}")]
    Inconsistent { guid: Guid, reason: String },
}

pub type Result<T> = std::result::Result<T, MergeError>;
