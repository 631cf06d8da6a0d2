//! Detection and resolution of project GUIDs that collide across inputs.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::ids::GuidAllocator;
use crate::models::{Guid, Project, Solution};

const DEPENDENCIES_SECTION: &str = "ProjectSection(ProjectDependencies)";
const END_PROJECT_SECTION: &str = "EndProjectSection";

/// `(solution name, old guid) -> new guid` for every relocated entry.
#[derive(Debug, Clone, Default)]
pub struct RelocationMap {
    entries: HashMap<String, HashMap<Guid, Guid>>,
}

impl RelocationMap {
    pub fn get(&self, solution: &str, guid: &Guid) -> Option<&Guid> {
        self.entries.get(solution).and_then(|m| m.get(guid))
    }

    /// The identifier `guid` of `solution` goes by in the merged solution.
    pub fn resolve(&self, solution: &str, guid: &Guid) -> Guid {
        self.get(solution, guid).unwrap_or(guid).clone()
    }

    fn insert(&mut self, solution: &str, old: Guid, new: Guid) {
        self.entries
            .entry(solution.to_string())
            .or_default()
            .insert(old, new);
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What happened to one entry of a colliding group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// First occurrence; keeps its GUID.
    Kept,
    /// Different project behind the same GUID; given a fresh one.
    Relocated(Guid),
    /// Same GUID and same location as an earlier entry; dropped in favour of it.
    Deduplicated(Guid),
}

#[derive(Debug, Clone)]
pub struct CollisionMember {
    pub solution: String,
    pub project: String,
    pub location: String,
    pub resolution: Resolution,
}

/// Every entry that carried a given GUID before relocation.
#[derive(Debug, Clone)]
pub struct Collision {
    pub guid: Guid,
    pub members: Vec<CollisionMember>,
}

impl Collision {
    /// Whether all members point at the same physical project.
    pub fn is_identical_import(&self) -> bool {
        self.members
            .iter()
            .all(|m| !matches!(m.resolution, Resolution::Relocated(_)))
    }
}

#[derive(Debug)]
pub struct Relocation {
    pub projects: Vec<Project>,
    pub map: RelocationMap,
    pub collisions: Vec<Collision>,
}

/// Take the projects out of every source, relocating colliding GUIDs.
///
/// The first entry with a GUID keeps it. A later entry with the same GUID is
/// dropped when `dedupe_identical` is set and it points at the same location
/// as an entry already kept (folders never match); otherwise it receives a
/// fresh GUID from `ids`.
///
/// Within one source, references to a GUID (nesting edges, project
/// dependencies) follow the first entry of that source carrying it.
pub fn relocate(
    sources: &mut [Solution],
    ids: &mut GuidAllocator<'_>,
    dedupe_identical: bool,
) -> Relocation {
    let mut counts: HashMap<Guid, usize> = HashMap::new();
    for project in sources.iter().flat_map(|s| s.projects.iter()) {
        *counts.entry(project.guid.clone()).or_default() += 1;
        ids.reserve(&project.guid);
    }

    let mut projects = Vec::new();
    let mut map = RelocationMap::default();
    let mut collisions: IndexMap<Guid, Collision> = IndexMap::new();
    // Per original GUID: location key and merged GUID of each entry already kept
    let mut kept: HashMap<Guid, Vec<(Option<String>, Guid)>> = HashMap::new();
    // (solution, original GUID) pairs whose references are already bound to an entry
    let mut bound: HashSet<(String, Guid)> = HashSet::new();

    for source in sources.iter_mut() {
        for mut project in std::mem::take(&mut source.projects) {
            let original = project.guid.clone();
            if counts.get(&original).copied().unwrap_or(0) < 2 {
                projects.push(project);
                continue;
            }

            let location_key = project.location_key();
            let earlier = kept.entry(original.clone()).or_default();

            let duplicate_of = match &location_key {
                Some(key) if dedupe_identical => earlier
                    .iter()
                    .find(|(k, _)| k.as_deref() == Some(key.as_str()))
                    .map(|(_, guid)| guid.clone()),
                _ => None,
            };

            let first_in_source = bound.insert((source.name.clone(), original.clone()));
            if !first_in_source {
                tracing::warn!(
                    "{} appears more than once in {}; references follow its first entry",
                    original,
                    source.name
                );
            }

            let resolution = if earlier.is_empty() {
                Resolution::Kept
            } else if let Some(existing) = duplicate_of {
                if first_in_source && existing != original {
                    map.insert(&source.name, original.clone(), existing.clone());
                }
                Resolution::Deduplicated(existing)
            } else {
                let fresh = ids.fresh();
                if first_in_source {
                    map.insert(&source.name, original.clone(), fresh.clone());
                }
                Resolution::Relocated(fresh)
            };

            tracing::debug!(
                "{} '{}' from {}: {:?}",
                original,
                project.name,
                source.name,
                resolution
            );

            collisions
                .entry(original.clone())
                .or_insert_with(|| Collision {
                    guid: original.clone(),
                    members: Vec::new(),
                })
                .members
                .push(CollisionMember {
                    solution: source.name.clone(),
                    project: project.name.clone(),
                    location: project.location(),
                    resolution: resolution.clone(),
                });

            match resolution {
                Resolution::Kept => {
                    earlier.push((location_key, original));
                    projects.push(project);
                }
                Resolution::Relocated(fresh) => {
                    earlier.push((location_key, fresh.clone()));
                    project.guid = fresh;
                    projects.push(project);
                }
                Resolution::Deduplicated(_) => {}
            }
        }
    }

    if !map.is_empty() {
        for project in &mut projects {
            rewrite_dependencies(project, &map);
        }
    }

    Relocation {
        projects,
        map,
        collisions: collisions.into_values().collect(),
    }
}

/// Point the `ProjectDependencies` entries of `project` at merged identifiers.
fn rewrite_dependencies(project: &mut Project, map: &RelocationMap) {
    let mut in_dependencies = false;

    for line in &mut project.body {
        let trimmed = line.trim();
        if trimmed.starts_with(DEPENDENCIES_SECTION) {
            in_dependencies = true;
            continue;
        }
        if trimmed == END_PROJECT_SECTION {
            in_dependencies = false;
            continue;
        }
        if !in_dependencies {
            continue;
        }

        let Some((left, right)) = trimmed.split_once('=') else {
            continue;
        };
        let (Some(dependency), Some(value)) = (Guid::parse(left), Guid::parse(right)) else {
            continue;
        };

        let new_dependency = map.resolve(&project.solution_name, &dependency);
        let new_value = map.resolve(&project.solution_name, &value);
        if new_dependency == dependency && new_value == value {
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        *line = format!("{}{} = {}", &line[..indent], new_dependency, new_value);
    }
}
