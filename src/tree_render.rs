//! ASCII tree rendering for solution folder hierarchies.

use crate::models::{ProjectKind, SolutionTreeNode};

const FOLDER: char = '▸';
const PROJECT: char = '●';
const WEBSITE: char = '◎';

/// Get the symbol for an entry kind.
fn kind_symbol(kind: &ProjectKind) -> char {
    match kind {
        ProjectKind::Folder => FOLDER,
        ProjectKind::File { .. } => PROJECT,
        ProjectKind::Website { .. } => WEBSITE,
    }
}

/// Render a solution tree as ASCII art with kind symbols.
///
/// Example output:
/// ```text
/// ▸ App
/// ├── ● App
/// └── ▸ Utils
///     └── ● Helpers
/// ▸ Common
/// └── ● Lib
/// ```
pub fn render_tree(nodes: &[SolutionTreeNode]) -> String {
    let mut output = String::new();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;
        render_node(&mut output, node, "", is_last, true);
    }
    output
}

/// Recursively render a node and its children.
fn render_node(
    output: &mut String,
    node: &SolutionTreeNode,
    prefix: &str,
    is_last: bool,
    is_root: bool,
) {
    if !is_root {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
    }
    output.push(kind_symbol(&node.project.kind));
    output.push(' ');
    output.push_str(&node.project.name);
    output.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i == node.children.len() - 1;
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Guid, Project};

    fn make_node(name: &str, folder: bool, children: Vec<SolutionTreeNode>) -> SolutionTreeNode {
        let guid = Guid::new_v4();
        let project = if folder {
            Project::folder(name, guid, "Test", "/work")
        } else {
            Project::new(
                Guid::parse("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}").unwrap(),
                name,
                format!(r"{0}\{0}.csproj", name),
                guid,
                "Test",
                "/work",
            )
        };
        SolutionTreeNode { project, children }
    }

    #[test]
    fn test_single_root() {
        let tree = vec![make_node("App", false, vec![])];
        assert_eq!(render_tree(&tree), "● App\n");
    }

    #[test]
    fn test_with_children() {
        let tree = vec![make_node(
            "A",
            true,
            vec![
                make_node("ProjA", false, vec![]),
                make_node("Utils", true, vec![]),
            ],
        )];
        assert_eq!(render_tree(&tree), "▸ A\n├── ● ProjA\n└── ▸ Utils\n");
    }

    #[test]
    fn test_nested_children() {
        let tree = vec![
            make_node(
                "App",
                true,
                vec![
                    make_node(
                        "Utils",
                        true,
                        vec![
                            make_node("Helpers", false, vec![]),
                            make_node("Strings", false, vec![]),
                        ],
                    ),
                    make_node("App", false, vec![]),
                ],
            ),
            make_node("Common", true, vec![make_node("Lib", false, vec![])]),
        ];
        let expected = "▸ App\n├── ▸ Utils\n│   ├── ● Helpers\n│   └── ● Strings\n└── ● App\n▸ Common\n└── ● Lib\n";
        assert_eq!(render_tree(&tree), expected);
    }

    #[test]
    fn test_website_symbol() {
        let site = Project::new(
            Guid::parse("{E24C65DC-7377-472B-9ABA-BC803B73C61A}").unwrap(),
            "Site",
            "http://localhost/Site",
            Guid::new_v4(),
            "Test",
            "/work",
        );
        let tree = vec![SolutionTreeNode {
            project: site,
            children: vec![],
        }];
        assert_eq!(render_tree(&tree), "◎ Site\n");
    }
}
