//! Reconstruction of the solution-folder tree of a merged solution.
//!
//! Every project is assigned a grouping key: normally the name of the
//! solution it came from, or for a project file living outside its
//! solution's directory, the directory two levels above the project file.
//! Each key becomes a top-level folder of the merged solution. Sub-folder
//! placement recorded in the source solutions is preserved beneath it.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;

use super::ids::GuidAllocator;
use crate::models::{Guid, NestedSection, Project, ProjectKind};

/// Why a nesting edge from a source solution was not carried over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairReason {
    /// The recorded parent is not an entry of any source solution.
    UnknownParent(Guid),
    /// The recorded nesting loops back on itself.
    Cycle,
}

/// An entry re-attached to its group's top-level folder.
#[derive(Debug, Clone)]
pub struct NestingRepair {
    pub guid: Guid,
    pub name: String,
    pub solution: String,
    pub reason: RepairReason,
}

#[derive(Debug)]
pub struct Folders {
    /// Synthetic folders, top-level folder of each group first.
    pub folders: Vec<Project>,
    pub nested: NestedSection,
    pub repairs: Vec<NestingRepair>,
}

/// The folder a project is grouped under in a merged solution.
pub fn grouping_key(project: &Project) -> String {
    match &project.kind {
        ProjectKind::Folder | ProjectKind::Website { .. } => project.solution_name.clone(),
        ProjectKind::File { .. } if project.is_inside_solution_dir() => {
            project.solution_name.clone()
        }
        ProjectKind::File { absolute } => absolute
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| project.solution_name.clone()),
    }
}

/// Build the folder tree for the merged `projects`.
///
/// `source_nesting` holds each source solution's decoded nesting, keyed by
/// solution name and already expressed in merged identifiers. New folders
/// belong to the merged solution `solution_name` in `base_dir`.
pub fn synthesize_folders(
    projects: &[Project],
    source_nesting: &HashMap<String, NestedSection>,
    solution_name: &str,
    base_dir: &Path,
    ids: &mut GuidAllocator<'_>,
) -> Folders {
    let mut groups: IndexMap<String, Vec<&Project>> = IndexMap::new();
    for project in projects {
        groups.entry(grouping_key(project)).or_default().push(project);
    }

    let key_of: HashMap<&Guid, &str> = groups
        .iter()
        .flat_map(|(key, members)| members.iter().map(move |p| (&p.guid, key.as_str())))
        .collect();
    let by_guid: HashMap<&Guid, &Project> = projects.iter().map(|p| (&p.guid, p)).collect();

    let mut folders = Vec::new();
    let mut nested = NestedSection::new();
    let mut repairs = Vec::new();
    let mut top_of: HashMap<&str, Guid> = HashMap::new();

    for (key, members) in &groups {
        let top = Project::folder(key.clone(), ids.fresh(), solution_name, base_dir);
        let top_guid = top.guid.clone();
        top_of.insert(key.as_str(), top_guid.clone());
        folders.push(top);

        let mut sub_folders: IndexMap<String, Guid> = IndexMap::new();

        for project in members {
            let recorded = source_nesting
                .get(&project.solution_name)
                .and_then(|section| section.parent_of(&project.guid));

            let parent = match recorded {
                None => top_guid.clone(),
                Some(parent) if key_of.get(parent) == Some(&key.as_str()) => parent.clone(),
                Some(parent) => match by_guid.get(parent) {
                    Some(source_folder) => {
                        // The source folder landed in another group; mirror it here
                        sub_folders
                            .entry(source_folder.name.clone())
                            .or_insert_with(|| ids.fresh())
                            .clone()
                    }
                    None => {
                        tracing::warn!(
                            "{} '{}' in {} is nested under unknown {}",
                            project.guid,
                            project.name,
                            project.solution_name,
                            parent
                        );
                        repairs.push(NestingRepair {
                            guid: project.guid.clone(),
                            name: project.name.clone(),
                            solution: project.solution_name.clone(),
                            reason: RepairReason::UnknownParent(parent.clone()),
                        });
                        top_guid.clone()
                    }
                },
            };

            tracing::debug!("{} '{}' -> {}", project.guid, project.name, parent);
            nested.insert(project.guid.clone(), parent);
        }

        for (name, guid) in sub_folders {
            nested.insert(guid.clone(), top_guid.clone());
            folders.push(Project::folder(name, guid, solution_name, base_dir));
        }
    }

    while let Some(cycle) = nested.find_cycle() {
        let guid = cycle[0].clone();
        let Some(project) = by_guid.get(&guid) else {
            break;
        };
        let Some(top) = key_of.get(&guid).and_then(|key| top_of.get(key)) else {
            break;
        };

        tracing::warn!(
            "Nesting of '{}' in {} loops back on itself; moving it to the top folder",
            project.name,
            project.solution_name
        );
        nested.set_parent(guid.clone(), top.clone());
        repairs.push(NestingRepair {
            guid,
            name: project.name.clone(),
            solution: project.solution_name.clone(),
            reason: RepairReason::Cycle,
        });
    }

    folders.retain(|folder| nested.has_children(&folder.guid));

    Folders {
        folders,
        nested,
        repairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ids::SequentialGuids;

    const CSHARP: &str = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";

    fn g(s: &str) -> Guid {
        Guid::parse(s).unwrap()
    }

    fn file(guid: &str, name: &str, path: &str, solution: &str, dir: &str) -> Project {
        Project::new(g(CSHARP), name, path, g(guid), solution, dir)
    }

    fn folder(guid: &str, name: &str, solution: &str, dir: &str) -> Project {
        Project::folder(name, g(guid), solution, dir)
    }

    fn name_of<'a>(folders: &'a Folders, guid: &Guid) -> &'a str {
        folders
            .folders
            .iter()
            .find(|f| &f.guid == guid)
            .map(|f| f.name.as_str())
            .unwrap_or("<not a synthetic folder>")
    }

    #[test]
    fn groups_by_originating_solution() {
        let projects = vec![
            file("{1}", "ProjA", r"ProjA\ProjA.csproj", "A", "/a"),
            file("{2}", "ProjB", r"ProjB\ProjB.csproj", "B", "/b"),
        ];
        let mut gen = SequentialGuids::new();
        let mut ids = GuidAllocator::new(&mut gen);

        let folders = synthesize_folders(&projects, &HashMap::new(), "All", Path::new("/all"), &mut ids);

        assert_eq!(folders.folders.len(), 2);
        let parent_a = folders.nested.parent_of(&g("{1}")).unwrap();
        let parent_b = folders.nested.parent_of(&g("{2}")).unwrap();
        assert_eq!(name_of(&folders, parent_a), "A");
        assert_eq!(name_of(&folders, parent_b), "B");
        assert!(folders.repairs.is_empty());
    }

    #[test]
    fn groups_external_projects_by_grandparent_dir() {
        let external = file("{1}", "Lib", r"..\shared\Common\Lib\Lib.csproj", "A", "/src/a");
        assert_eq!(grouping_key(&external), "Common");

        let site = file("{2}", "Site", "http://localhost/Site", "A", "/src/a");
        assert_eq!(grouping_key(&site), "A");

        let shallow = file("{3}", "Top", r"..\..\Top.csproj", "A", "/src/a");
        assert_eq!(grouping_key(&shallow), "A");
    }

    #[test]
    fn preserves_sub_folder_within_group() {
        let projects = vec![
            folder("{9}", "Utils", "A", "/a"),
            file("{2}", "ProjC", r"ProjC\ProjC.csproj", "A", "/a"),
        ];
        let mut nesting = HashMap::new();
        nesting.insert(
            "A".to_string(),
            [(g("{2}"), g("{9}"))]
                .into_iter()
                .map(|(child, parent)| crate::models::RelationInfo { child, parent })
                .collect::<NestedSection>(),
        );
        let mut gen = SequentialGuids::new();
        let mut ids = GuidAllocator::new(&mut gen);

        let folders = synthesize_folders(&projects, &nesting, "Merged", Path::new("/m"), &mut ids);

        assert_eq!(folders.nested.parent_of(&g("{2}")), Some(&g("{9}")));
        let utils_parent = folders.nested.parent_of(&g("{9}")).unwrap();
        assert_eq!(name_of(&folders, utils_parent), "A");
        assert_eq!(folders.folders.len(), 1);
    }

    #[test]
    fn mirrors_sub_folder_for_external_project() {
        let projects = vec![
            folder("{9}", "Shared", "A", "/src/a"),
            file("{2}", "Lib", r"..\ext\Common\Lib\Lib.csproj", "A", "/src/a"),
        ];
        let mut nesting = HashMap::new();
        let mut section = NestedSection::new();
        section.insert(g("{2}"), g("{9}"));
        nesting.insert("A".to_string(), section);
        let mut gen = SequentialGuids::new();
        let mut ids = GuidAllocator::new(&mut gen);

        let folders = synthesize_folders(&projects, &nesting, "All", Path::new("/src"), &mut ids);

        let mirror = folders.nested.parent_of(&g("{2}")).unwrap();
        assert_eq!(name_of(&folders, mirror), "Shared");
        let common = folders.nested.parent_of(mirror).unwrap();
        assert_eq!(name_of(&folders, common), "Common");
        assert_eq!(folders.folders.len(), 3);
    }

    #[test]
    fn repairs_unknown_parent() {
        let projects = vec![file("{1}", "App", r"App\App.csproj", "A", "/a")];
        let mut nesting = HashMap::new();
        let mut section = NestedSection::new();
        section.insert(g("{1}"), g("{404}"));
        nesting.insert("A".to_string(), section);
        let mut gen = SequentialGuids::new();
        let mut ids = GuidAllocator::new(&mut gen);

        let folders = synthesize_folders(&projects, &nesting, "All", Path::new("/"), &mut ids);

        let parent = folders.nested.parent_of(&g("{1}")).unwrap();
        assert_eq!(name_of(&folders, parent), "A");
        assert_eq!(
            folders.repairs[0].reason,
            RepairReason::UnknownParent(g("{404}"))
        );
    }

    #[test]
    fn breaks_cycles() {
        let projects = vec![
            folder("{1}", "X", "A", "/a"),
            folder("{2}", "Y", "A", "/a"),
        ];
        let mut nesting = HashMap::new();
        let mut section = NestedSection::new();
        section.insert(g("{1}"), g("{2}"));
        section.insert(g("{2}"), g("{1}"));
        nesting.insert("A".to_string(), section);
        let mut gen = SequentialGuids::new();
        let mut ids = GuidAllocator::new(&mut gen);

        let folders = synthesize_folders(&projects, &nesting, "All", Path::new("/"), &mut ids);

        assert!(folders.nested.find_cycle().is_none());
        assert_eq!(folders.repairs.len(), 1);
        assert_eq!(folders.repairs[0].reason, RepairReason::Cycle);
        assert_eq!(folders.folders.len(), 1);
        assert!(folders.nested.has_children(&folders.folders[0].guid));
    }
}
