//! Project history listing
//!
//! Every generated project lives in its own `<name>_<YYYYMMDD>_<HHMMSS>`
//! folder under the projects dir. History entries derive a display name by
//! stripping the timestamp suffix and restoring spaces.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// One generated project, as shown in the history list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Human-readable name derived from the folder
    pub name: String,
    /// The on-disk folder name
    pub folder: String,
    /// Creation time as a unix timestamp
    pub created: i64,
}

/// Derive a display name from a project folder name
///
/// Folder names end in a `_YYYYMMDD_HHMMSS` suffix; everything before it,
/// with underscores restored to spaces, is the display name.
pub fn display_name(folder: &str) -> String {
    let parts: Vec<&str> = folder.split('_').collect();
    if parts.len() > 2 {
        parts[..parts.len() - 2].join(" ")
    } else {
        folder.to_string()
    }
}

/// List generated projects, newest first
///
/// A missing projects dir is an empty history, not an error. Entries whose
/// metadata cannot be read are skipped.
pub fn list_history(projects_dir: &Path) -> Vec<HistoryEntry> {
    let Ok(entries) = std::fs::read_dir(projects_dir) else {
        return Vec::new();
    };

    let mut projects: Vec<HistoryEntry> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            if !entry.file_type().ok()?.is_dir() {
                return None;
            }

            let folder = entry.file_name().to_string_lossy().to_string();
            let created = entry
                .metadata()
                .ok()?
                .modified()
                .ok()?
                .duration_since(UNIX_EPOCH)
                .ok()?
                .as_secs() as i64;

            Some(HistoryEntry {
                name: display_name(&folder),
                folder,
                created,
            })
        })
        .collect();

    projects.sort_by(|a, b| b.created.cmp(&a.created));
    projects
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_display_name_strips_timestamp() {
        assert_eq!(display_name("Todo_App_20250928_203507"), "Todo App");
        assert_eq!(
            display_name("Modern_Tic_Tac_Toe_20251031_094111"),
            "Modern Tic Tac Toe"
        );
    }

    #[test]
    fn test_display_name_short_folder_kept() {
        assert_eq!(display_name("scratch"), "scratch");
        assert_eq!(display_name("a_b"), "a_b");
    }

    #[test]
    fn test_list_history_missing_dir_is_empty() {
        assert!(list_history(Path::new("/nonexistent/forge/projects")).is_empty());
    }

    #[test]
    fn test_list_history_skips_files_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("Older_App_20250101_000000")).unwrap();
        std::fs::write(dir.path().join("stray.txt"), "x").unwrap();

        // Ensure a measurably later mtime for the second project
        std::thread::sleep(std::time::Duration::from_millis(1100));
        std::fs::create_dir(dir.path().join("Newer_App_20250102_000000")).unwrap();

        let history = list_history(dir.path());
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].name, "Newer App");
        assert_eq!(history[1].name, "Older App");
        assert!(history[0].created >= history[1].created);
    }
}
