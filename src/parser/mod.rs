//! Line-level reading of `.sln` text.
//!
//! Only what the merge needs is decoded: project headers, the
//! `SolutionProperties` global section (kept verbatim) and the
//! `NestedProjects` global section. Everything else inside a project block is
//! kept as opaque lines; other global sections are dropped.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Guid, Project, RelationInfo};

static PROJECT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^Project\(\s*"(?P<type>[^"]*)"\s*\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"(?P<guid>[^"]*)"\s*$"#,
    )
    .expect("project header pattern is valid")
});

static GLOBAL_SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^GlobalSection\(\s*(?P<name>[^)]+?)\s*\)\s*=\s*(?P<timing>\w+)\s*$")
        .expect("global section pattern is valid")
});

const END_PROJECT: &str = "EndProject";
const END_GLOBAL_SECTION: &str = "EndGlobalSection";

pub const PROPERTIES_SECTION: &str = "SolutionProperties";
pub const NESTED_SECTION: &str = "NestedProjects";

/// Parse every `Project(...) ... EndProject` block before the `Global` section.
///
/// Blocks whose header carries an unreadable type or project GUID are skipped.
pub fn parse_projects(text: &str, solution_name: &str, solution_dir: &Path) -> Vec<Project> {
    let mut projects = Vec::new();
    let mut current: Option<(Project, Vec<String>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some((project, mut body)) = current.take() {
            if trimmed == END_PROJECT {
                projects.push(project.with_body(body));
            } else {
                body.push(line.trim_end().to_string());
                current = Some((project, body));
            }
            continue;
        }

        if trimmed == "Global" {
            break;
        }

        let Some(caps) = PROJECT_HEADER.captures(trimmed) else {
            continue;
        };

        let (Some(type_guid), Some(guid)) = (Guid::parse(&caps["type"]), Guid::parse(&caps["guid"]))
        else {
            tracing::warn!(
                "Skipping project '{}' in {}: unreadable GUID in header",
                &caps["name"],
                solution_name
            );
            continue;
        };

        let project = Project::new(
            type_guid,
            &caps["name"],
            &caps["path"],
            guid,
            solution_name,
            solution_dir,
        );
        current = Some((project, Vec::new()));
    }

    if let Some((project, body)) = current {
        tracing::warn!(
            "Project '{}' in {} is missing {}",
            project.name,
            solution_name,
            END_PROJECT
        );
        projects.push(project.with_body(body));
    }

    projects
}

/// All lines of the named global section, header and footer included.
///
/// `None` when the section is absent or never closed.
pub fn global_section<'a>(text: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let mut lines = text.lines();

    loop {
        let line = lines.next()?;
        let matches_name = GLOBAL_SECTION_HEADER
            .captures(line.trim())
            .is_some_and(|caps| caps["name"].eq_ignore_ascii_case(name));
        if matches_name {
            let mut section = vec![line.trim_end()];
            for line in lines.by_ref() {
                section.push(line.trim_end());
                if line.trim() == END_GLOBAL_SECTION {
                    return Some(section);
                }
            }
            return None;
        }
    }
}

/// The `SolutionProperties` section, verbatim.
pub fn properties_block(text: &str) -> Option<String> {
    global_section(text, PROPERTIES_SECTION).map(|lines| lines.join("\n"))
}

/// Decode the `{child} = {parent}` pairs of the `NestedProjects` section.
///
/// A missing section yields no pairs; malformed lines are skipped.
pub fn nested_relations(text: &str) -> Vec<RelationInfo> {
    let Some(lines) = global_section(text, NESTED_SECTION) else {
        return Vec::new();
    };

    let inner = &lines[1..lines.len() - 1];
    inner
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let relation = line.split_once('=').and_then(|(child, parent)| {
                Some(RelationInfo {
                    child: Guid::parse(child)?,
                    parent: Guid::parse(parent)?,
                })
            });
            if relation.is_none() {
                tracing::warn!("Ignoring malformed nesting line: {}", line);
            }
            relation
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectKind;

    const SLN: &str = "\r\nMicrosoft Visual Studio Solution File, Format Version 12.00\r\n\
# Visual Studio Version 16\r\n\
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"App\\App.csproj\", \"{11111111-1111-1111-1111-111111111111}\"\r\n\
\tProjectSection(ProjectDependencies) = postProject\r\n\
\t\t{22222222-2222-2222-2222-222222222222} = {22222222-2222-2222-2222-222222222222}\r\n\
\tEndProjectSection\r\n\
EndProject\r\n\
Project(\"{2150E333-8FDC-42A3-9474-1A3956D46DE8}\") = \"Utils\", \"Utils\", \"{33333333-3333-3333-3333-333333333333}\"\r\n\
EndProject\r\n\
Global\r\n\
\tGlobalSection(SolutionProperties) = preSolution\r\n\
\t\tHideSolutionNode = FALSE\r\n\
\tEndGlobalSection\r\n\
\tGlobalSection(NestedProjects) = preSolution\r\n\
\t\t{11111111-1111-1111-1111-111111111111} = {33333333-3333-3333-3333-333333333333}\r\n\
\t\tgarbage\r\n\
\tEndGlobalSection\r\n\
EndGlobal\r\n";

    #[test]
    fn parses_project_blocks() {
        let projects = parse_projects(SLN, "Main", Path::new("/work/main"));
        assert_eq!(projects.len(), 2);

        assert_eq!(projects[0].name, "App");
        assert_eq!(projects[0].path, r"App\App.csproj");
        assert_eq!(projects[0].body.len(), 3);
        assert!(projects[0].body[0].contains("ProjectSection(ProjectDependencies)"));
        assert!(matches!(projects[0].kind, ProjectKind::File { .. }));

        assert!(projects[1].is_folder());
        assert!(projects[1].body.is_empty());
    }

    #[test]
    fn captures_properties_verbatim() {
        let props = properties_block(SLN).unwrap();
        assert_eq!(
            props,
            "\tGlobalSection(SolutionProperties) = preSolution\n\t\tHideSolutionNode = FALSE\n\tEndGlobalSection"
        );
    }

    #[test]
    fn decodes_nesting_and_skips_garbage() {
        let relations = nested_relations(SLN);
        assert_eq!(relations.len(), 1);
        assert_eq!(
            relations[0].child.as_str(),
            "{11111111-1111-1111-1111-111111111111}"
        );
        assert_eq!(
            relations[0].parent.as_str(),
            "{33333333-3333-3333-3333-333333333333}"
        );
    }

    #[test]
    fn missing_nested_section_is_empty() {
        let text = "Global\r\nEndGlobal\r\n";
        assert!(nested_relations(text).is_empty());
        assert!(properties_block(text).is_none());
    }

    #[test]
    fn unterminated_section_is_ignored() {
        let text = "Global\n\tGlobalSection(NestedProjects) = preSolution\n\t\t{1} = {2}\n";
        assert!(nested_relations(text).is_empty());
    }
}
