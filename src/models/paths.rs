//! Lexical path helpers for the backslash-separated paths stored in `.sln` files.

use std::path::{Component, Path, PathBuf};

/// Resolve a path as written in a solution file against the solution directory.
///
/// Drive-letter paths (`C:\src\Lib.csproj`) are absolute on every host.
pub fn resolve(solution_dir: &Path, raw: &str) -> PathBuf {
    let native = raw.replace('\\', "/");
    let path = Path::new(&native);
    if path.is_absolute() || has_drive_prefix(raw) {
        normalize(path)
    } else {
        normalize(&solution_dir.join(path))
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Express `path` relative to `base` using `\` separators, as `.sln` files do.
///
/// Falls back to the absolute path when the two share no root.
pub fn relative_to(path: &Path, base: &Path) -> String {
    let path_components: Vec<Component> = path.components().collect();
    let base_components: Vec<Component> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return path.to_string_lossy().replace('/', "\\");
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base_components.len() {
        parts.push("..".to_string());
    }
    for component in &path_components[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("\\")
}

/// `C:\` or `C:/` at the start of a path.
fn has_drive_prefix(raw: &str) -> bool {
    matches!(
        raw.trim().as_bytes(),
        [drive, b':', b'\\' | b'/', ..] if drive.is_ascii_alphabetic()
    )
}

/// Whether the location is a web site URL rather than a filesystem path.
pub fn is_web_url(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
