//! Merging of several solutions into one.
//!
//! The merge runs in four steps, each in its own module:
//!
//! 1. [`relocate`]: projects whose GUID collides with an entry of another
//!    input get a fresh GUID (or are dropped when they are the very same
//!    project imported twice).
//! 2. [`nested`]: each input's folder nesting is decoded, following relocated
//!    GUIDs.
//! 3. [`folders`]: projects are grouped under one top-level folder per
//!    originating solution, keeping their original sub-folders.
//! 4. The merged [`Solution`] is assembled and validated.

pub mod folders;
pub mod ids;
pub mod nested;
pub mod relocate;
mod report;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{MergeError, Result};
use crate::models::{paths, Solution};

pub use folders::{grouping_key, NestingRepair, RepairReason};
pub use ids::{GuidGenerator, RandomGuids, SequentialGuids};
pub use relocate::{Collision, CollisionMember, RelocationMap, Resolution};
pub use report::MergeReport;

/// Knobs of a merge.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Drop a project that shares both GUID and location with an earlier one
    /// instead of relocating it.
    pub dedupe_identical: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            dedupe_identical: true,
        }
    }
}

#[derive(Debug)]
pub struct MergeOutcome {
    pub solution: Solution,
    pub report: MergeReport,
}

/// Merge `sources` with random GUIDs and default options.
pub fn merge(
    new_name: &str,
    base_dir: impl AsRef<Path>,
    sources: Vec<Solution>,
) -> Result<MergeOutcome> {
    merge_solutions(
        new_name,
        base_dir,
        sources,
        &mut RandomGuids,
        &MergeOptions::default(),
    )
}

/// Merge `sources`, in order, into a solution named `new_name` in `base_dir`.
///
/// Fails without producing anything when `sources` is empty or two sources
/// share a name. Everything else that goes wrong in the inputs is resolved
/// and listed in the returned report.
pub fn merge_solutions(
    new_name: &str,
    base_dir: impl AsRef<Path>,
    mut sources: Vec<Solution>,
    generator: &mut dyn GuidGenerator,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    if sources.is_empty() {
        return Err(MergeError::NoSources);
    }

    let mut names = HashSet::new();
    for source in &sources {
        if !names.insert(source.name.as_str()) {
            return Err(MergeError::DuplicateSolutionName(source.name.clone()));
        }
    }
    let source_count = sources.len();

    let base_dir = std::path::absolute(base_dir.as_ref())
        .map(|p| paths::normalize(&p))
        .map_err(|source| MergeError::Io {
            path: base_dir.as_ref().to_path_buf(),
            source,
        })?;

    let mut ids = ids::GuidAllocator::new(generator);
    for source in &sources {
        for relation in source.nested.relations() {
            ids.reserve(&relation.parent);
        }
    }

    let relocation = relocate::relocate(&mut sources, &mut ids, options.dedupe_identical);

    let source_nesting: HashMap<String, _> = sources
        .iter()
        .map(|source| {
            (
                source.name.clone(),
                nested::extract_nested(source, &relocation.map),
            )
        })
        .collect();

    let folders = folders::synthesize_folders(
        &relocation.projects,
        &source_nesting,
        new_name,
        &base_dir,
        &mut ids,
    );

    let mut projects = relocation.projects;
    projects.extend(folders.folders);

    let properties = sources.swap_remove(0).properties;
    let solution = Solution::assemble(new_name, base_dir, projects, properties, folders.nested);
    solution.validate()?;

    let report = MergeReport {
        collisions: relocation.collisions,
        repairs: folders.repairs,
    };

    tracing::info!(
        "Merged {} solutions into {}: {} entries, {} relocated, {} deduplicated",
        source_count,
        solution.name,
        solution.projects.len(),
        report.relocated(),
        report.deduplicated()
    );

    Ok(MergeOutcome { solution, report })
}
