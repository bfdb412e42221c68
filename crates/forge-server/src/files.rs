//! File explorer for generated projects

use forge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Extensions the code viewer has no use for
const BINARY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "ico", "gif", "webp", "woff", "woff2"];

/// One file in a generated project, with its full content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    pub path: String,
    pub content: String,
    pub language: String,
}

/// Collect every readable non-binary file under a named project folder
///
/// Hidden files and binary assets are skipped; files that are not valid
/// UTF-8 are silently dropped, matching the viewer's text-only contract.
pub fn list_project_files(projects_dir: &Path, folder: &str) -> Result<Vec<ProjectFile>> {
    // Folder names never contain path separators; anything else is an
    // escape attempt.
    let folder_path = Path::new(folder);
    if folder_path.components().count() != 1
        || folder_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(ForgeError::PathViolation(format!(
            "Invalid project folder: {}",
            folder
        )));
    }

    let project_root = projects_dir.join(folder);
    if !project_root.is_dir() {
        return Err(ForgeError::Other(format!("Project not found: {}", folder)));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(&project_root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let extension = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if BINARY_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };

        let rel_path = entry
            .path()
            .strip_prefix(&project_root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        files.push(ProjectFile {
            name,
            path: rel_path,
            content,
            language: extension,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
