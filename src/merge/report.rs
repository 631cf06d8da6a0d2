//! The warnings report of a merge.

use std::fmt;

use super::folders::{NestingRepair, RepairReason};
use super::relocate::{Collision, Resolution};

/// Non-fatal findings of a merge, for the user to review.
///
/// `Display` renders the human-readable warnings text.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Every GUID carried by more than one entry before relocation.
    pub collisions: Vec<Collision>,
    /// Source nesting that could not be carried over as recorded.
    pub repairs: Vec<NestingRepair>,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty() && self.repairs.is_empty()
    }

    pub fn relocated(&self) -> usize {
        self.count(|r| matches!(r, Resolution::Relocated(_)))
    }

    pub fn deduplicated(&self) -> usize {
        self.count(|r| matches!(r, Resolution::Deduplicated(_)))
    }

    fn count(&self, pred: impl Fn(&Resolution) -> bool) -> usize {
        self.collisions
            .iter()
            .flat_map(|c| c.members.iter())
            .filter(|m| pred(&m.resolution))
            .count()
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for collision in &self.collisions {
            let verdict = if collision.is_identical_import() {
                "same project imported more than once"
            } else {
                "different projects share this GUID"
            };
            writeln!(
                f,
                "Duplicate project GUID {} ({} entries, {}):",
                collision.guid,
                collision.members.len(),
                verdict
            )?;
            for member in &collision.members {
                let resolution = match &member.resolution {
                    Resolution::Kept => "kept".to_string(),
                    Resolution::Relocated(guid) => format!("relocated to {}", guid),
                    Resolution::Deduplicated(guid) => format!("merged into {}", guid),
                };
                writeln!(
                    f,
                    "    {}: {} at {} ({})",
                    member.solution, member.project, member.location, resolution
                )?;
            }
        }

        for repair in &self.repairs {
            match &repair.reason {
                RepairReason::UnknownParent(parent) => writeln!(
                    f,
                    "Project '{}' {} in {} was nested under unknown {}; placed in its top folder",
                    repair.name, repair.guid, repair.solution, parent
                )?,
                RepairReason::Cycle => writeln!(
                    f,
                    "Project '{}' {} in {} had cyclic nesting; placed in its top folder",
                    repair.name, repair.guid, repair.solution
                )?,
            }
        }

        Ok(())
    }
}
