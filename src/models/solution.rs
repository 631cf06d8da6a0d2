use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{MergeError, Result};
use crate::parser;

use super::guid::Guid;
use super::nested::NestedSection;
use super::paths;
use super::project::Project;

const HEADER: &str = "Microsoft Visual Studio Solution File, Format Version 12.00";
const VERSION_LINE: &str = "# Visual Studio Version 16";

/// A parsed solution file, or the result of merging several.
///
/// `projects` keeps file order, which is also output order.
#[derive(Debug, Clone)]
pub struct Solution {
    pub name: String,
    pub base_dir: PathBuf,
    pub projects: Vec<Project>,
    /// The `SolutionProperties` global section, passed through verbatim.
    pub properties: Option<String>,
    pub nested: NestedSection,
    text: String,
}

/// An entry of a solution with its nested children, used for tree rendering.
#[derive(Debug, Clone)]
pub struct SolutionTreeNode {
    pub project: Project,
    pub children: Vec<SolutionTreeNode>,
}

impl Solution {
    /// Read and parse a solution file. The solution is named after the file stem.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => MergeError::NotFound(path.to_path_buf()),
            _ => MergeError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let absolute = absolute(path)?;
        let name = absolute
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base_dir = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let solution = Self::parse(&text, name, base_dir);
        tracing::info!(
            "Loaded solution {} ({} projects, {} nested)",
            solution.name,
            solution.projects.len(),
            solution.nested.len()
        );
        Ok(solution)
    }

    /// Parse solution text as if it were a file named `name` in `base_dir`.
    pub fn parse(text: &str, name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let base_dir = paths::normalize(&base_dir.into());
        let projects = parser::parse_projects(text, &name, &base_dir);
        let nested = parser::nested_relations(text).into_iter().collect();

        Self {
            name,
            base_dir,
            properties: parser::properties_block(text),
            projects,
            nested,
            text: text.to_string(),
        }
    }

    /// Assemble a solution that has no source text of its own.
    pub fn assemble(
        name: impl Into<String>,
        base_dir: impl Into<PathBuf>,
        projects: Vec<Project>,
        properties: Option<String>,
        nested: NestedSection,
    ) -> Self {
        Self {
            name: name.into(),
            base_dir: paths::normalize(&base_dir.into()),
            projects,
            properties,
            nested,
            text: String::new(),
        }
    }

    /// The raw text this solution was parsed from; empty for assembled solutions.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn project(&self, guid: &Guid) -> Option<&Project> {
        self.projects.iter().find(|p| &p.guid == guid)
    }

    /// Check that identifiers are unique and the nesting forms a forest.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for project in &self.projects {
            if !seen.insert(&project.guid) {
                return Err(MergeError::Inconsistent {
                    guid: project.guid.clone(),
                    reason: "identifier is used by more than one entry".to_string(),
                });
            }
        }

        if let Some(cycle) = self.nested.find_cycle() {
            return Err(MergeError::Inconsistent {
                guid: cycle[0].clone(),
                reason: format!("nesting cycle through {} entries", cycle.len()),
            });
        }

        Ok(())
    }

    /// Write the solution text to `path` in one call.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|source| MergeError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The folder hierarchy: entries without a known parent are roots.
    pub fn tree(&self) -> Vec<SolutionTreeNode> {
        let known: HashSet<&Guid> = self.projects.iter().map(|p| &p.guid).collect();

        // Group entries by parent, roots under `None`
        let mut children_map: HashMap<Option<&Guid>, Vec<&Project>> = HashMap::new();
        for project in &self.projects {
            let parent = self
                .nested
                .parent_of(&project.guid)
                .filter(|parent| known.contains(parent));
            children_map.entry(parent).or_default().push(project);
        }

        fn build_subtree<'a>(
            parent: Option<&'a Guid>,
            children_map: &HashMap<Option<&'a Guid>, Vec<&'a Project>>,
        ) -> Vec<SolutionTreeNode> {
            let Some(projects) = children_map.get(&parent) else {
                return Vec::new();
            };
            projects
                .iter()
                .map(|&project| SolutionTreeNode {
                    project: project.clone(),
                    children: build_subtree(Some(&project.guid), children_map),
                })
                .collect()
        }

        // Entries caught in a nesting cycle are unreachable from the roots
        build_subtree(None, &children_map)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n{}\r\n", HEADER, VERSION_LINE)?;

        for project in &self.projects {
            write!(
                f,
                "Project(\"{}\") = \"{}\", \"{}\", \"{}\"\r\n",
                project.type_guid,
                project.name,
                project.path_relative_to(&self.base_dir),
                project.guid
            )?;
            for line in &project.body {
                write!(f, "{}\r\n", line)?;
            }
            write!(f, "EndProject\r\n")?;
        }

        write!(f, "Global\r\n")?;
        if let Some(properties) = &self.properties {
            for line in properties.lines() {
                write!(f, "{}\r\n", line)?;
            }
        }
        if !self.nested.is_empty() {
            write!(f, "{}", self.nested)?;
        }
        write!(f, "EndGlobal\r\n")
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map(|p| paths::normalize(&p))
        .map_err(|source| MergeError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLN: &str = "Microsoft Visual Studio Solution File, Format Version 12.00\r\n\
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"App\\App.csproj\", \"{1}\"\r\n\
EndProject\r\n\
Project(\"{2150E333-8FDC-42A3-9474-1A3956D46DE8}\") = \"Utils\", \"Utils\", \"{2}\"\r\n\
EndProject\r\n\
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Lib\", \"Lib\\Lib.csproj\", \"{3}\"\r\n\
EndProject\r\n\
Global\r\n\
\tGlobalSection(NestedProjects) = preSolution\r\n\
\t\t{3} = {2}\r\n\
\tEndGlobalSection\r\n\
EndGlobal\r\n";

    #[test]
    fn round_trips_text() {
        let solution = Solution::parse(SLN, "Main", "/work/main");
        let written = solution.to_string();
        let reparsed = Solution::parse(&written, "Main", "/work/main");

        assert_eq!(reparsed.projects.len(), 3);
        assert_eq!(reparsed.nested, solution.nested);
        assert!(written.contains("Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Lib\", \"Lib\\Lib.csproj\", \"{3}\"\r\n"));
    }

    #[test]
    fn builds_tree_from_nesting() {
        let solution = Solution::parse(SLN, "Main", "/work/main");
        let tree = solution.tree();

        let names: Vec<_> = tree.iter().map(|n| n.project.name.as_str()).collect();
        assert_eq!(names, vec!["App", "Utils"]);
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].project.name, "Lib");
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut solution = Solution::parse(SLN, "Main", "/work/main");
        let dup = solution.projects[0].clone();
        solution.projects.push(dup);
        assert!(matches!(
            solution.validate(),
            Err(MergeError::Inconsistent { .. })
        ));
    }

    #[test]
    fn omits_empty_nested_section() {
        let solution = Solution::assemble("Empty", "/work", Vec::new(), None, NestedSection::new());
        assert_eq!(
            solution.to_string(),
            format!("{}\r\n{}\r\nGlobal\r\nEndGlobal\r\n", HEADER, VERSION_LINE)
        );
    }
}
