use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::guid::Guid;
use super::paths;

/// A project entry of a solution: one `Project(...) ... EndProject` block.
///
/// Projects keep the name and directory of the solution they were parsed
/// from even after they move into a merged solution, since folder grouping
/// depends on where a project came from. The `guid` is the only field a merge
/// may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub guid: Guid,
    pub type_guid: Guid,
    pub name: String,
    /// Path exactly as written in the originating solution file.
    pub path: String,
    pub kind: ProjectKind,
    pub solution_name: String,
    pub solution_dir: PathBuf,
    /// Lines between the header and `EndProject`, passed through untouched.
    #[serde(default)]
    pub body: Vec<String>,
}

/// What a project entry points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectKind {
    /// A solution folder; has no location of its own.
    Folder,
    /// A web site project addressed by URL.
    Website { url: String },
    /// A project file on disk, resolved against the solution directory.
    File { absolute: PathBuf },
}

impl Project {
    pub fn new(
        type_guid: Guid,
        name: impl Into<String>,
        path: impl Into<String>,
        guid: Guid,
        solution_name: impl Into<String>,
        solution_dir: impl Into<PathBuf>,
    ) -> Self {
        let path = path.into();
        let solution_dir = solution_dir.into();
        let kind = if type_guid.is_solution_folder_type() {
            ProjectKind::Folder
        } else if paths::is_web_url(&path) {
            ProjectKind::Website { url: path.clone() }
        } else {
            ProjectKind::File {
                absolute: paths::resolve(&solution_dir, &path),
            }
        };

        Self {
            guid,
            type_guid,
            name: name.into(),
            path,
            kind,
            solution_name: solution_name.into(),
            solution_dir,
            body: Vec::new(),
        }
    }

    /// A solution folder. Folders use their name as their path.
    pub fn folder(
        name: impl Into<String>,
        guid: Guid,
        solution_name: impl Into<String>,
        solution_dir: impl Into<PathBuf>,
    ) -> Self {
        let name = name.into();
        Self::new(
            Guid::solution_folder_type(),
            name.clone(),
            name,
            guid,
            solution_name,
            solution_dir,
        )
    }

    pub fn with_body(mut self, body: Vec<String>) -> Self {
        self.body = body;
        self
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ProjectKind::Folder)
    }

    /// Human-readable location: absolute path, URL, or folder name.
    pub fn location(&self) -> String {
        match &self.kind {
            ProjectKind::Folder => self.name.clone(),
            ProjectKind::Website { url } => url.clone(),
            ProjectKind::File { absolute } => absolute.display().to_string(),
        }
    }

    /// Key under which two entries count as the same physical project.
    /// Folders have none: two folders are never the same project.
    pub fn location_key(&self) -> Option<String> {
        match &self.kind {
            ProjectKind::Folder => None,
            ProjectKind::Website { url } => Some(url.trim_end_matches('/').to_lowercase()),
            ProjectKind::File { absolute } => {
                Some(absolute.to_string_lossy().replace('\\', "/").to_lowercase())
            }
        }
    }

    /// The path to write when this project is saved into a solution at `base_dir`.
    pub fn path_relative_to(&self, base_dir: &Path) -> String {
        match &self.kind {
            ProjectKind::Folder | ProjectKind::Website { .. } => self.path.clone(),
            ProjectKind::File { absolute } => paths::relative_to(absolute, base_dir),
        }
    }

    /// Whether the project file lives under its originating solution's directory.
    pub fn is_inside_solution_dir(&self) -> bool {
        match &self.kind {
            ProjectKind::File { absolute } => absolute.starts_with(&self.solution_dir),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSHARP: &str = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";

    fn csharp(path: &str) -> Project {
        Project::new(
            Guid::parse(CSHARP).unwrap(),
            "App",
            path,
            Guid::parse("{1}").unwrap(),
            "Main",
            "/work/main",
        )
    }

    #[test]
    fn classifies_file_projects() {
        let project = csharp(r"App\App.csproj");
        assert_eq!(
            project.kind,
            ProjectKind::File {
                absolute: PathBuf::from("/work/main/App/App.csproj")
            }
        );
        assert!(project.is_inside_solution_dir());
    }

    #[test]
    fn classifies_external_file_projects() {
        let project = csharp(r"..\shared\Common\Lib\Lib.csproj");
        assert!(!project.is_inside_solution_dir());
        assert_eq!(project.location(), "/work/shared/Common/Lib/Lib.csproj");
    }

    #[test]
    fn classifies_websites_and_folders() {
        let site = csharp("http://localhost/Site");
        assert!(matches!(site.kind, ProjectKind::Website { .. }));

        let folder = Project::folder("Utils", Guid::parse("{2}").unwrap(), "Main", "/work/main");
        assert!(folder.is_folder());
        assert_eq!(folder.path, "Utils");
        assert!(folder.location_key().is_none());
    }

    #[test]
    fn rewrites_paths_for_new_base() {
        let project = csharp(r"App\App.csproj");
        assert_eq!(
            project.path_relative_to(Path::new("/work/all")),
            r"..\main\App\App.csproj"
        );
    }

    #[test]
    fn keeps_drive_letter_paths_verbatim() {
        let project = csharp(r"C:\src\Common\Lib\Lib.csproj");
        assert!(!project.is_inside_solution_dir());
        assert_eq!(
            project.path_relative_to(Path::new("/work/all")),
            r"C:\src\Common\Lib\Lib.csproj"
        );
    }
}
