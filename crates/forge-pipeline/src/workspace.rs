//! Project workspace creation
//!
//! Each run gets its own directory under the configured projects dir, named
//! from the sanitized plan name plus a timestamp suffix for uniqueness. The
//! resulting sandbox is the root every later tool call is confined to.

use chrono::Local;
use forge_agent::Sandbox;
use forge_core::Result;
use std::path::{Path, PathBuf};

/// Derive a filesystem-safe directory stem from a plan name
///
/// Whitespace becomes underscores; every other non-alphanumeric character
/// is stripped.
pub fn sanitize_project_name(name: &str) -> String {
    let mut sanitized: String = name
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    if sanitized.is_empty() {
        sanitized = "project".to_string();
    }
    sanitized
}

/// Create the workspace directory for a plan and return its sandbox
///
/// Returns the sandbox, the absolute project path, and the folder name.
pub fn create_workspace(projects_dir: &Path, plan_name: &str) -> Result<(Sandbox, PathBuf, String)> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let folder = format!("{}_{}", sanitize_project_name(plan_name), timestamp);

    let project_path = projects_dir.join(&folder);
    std::fs::create_dir_all(&project_path)?;

    let absolute = project_path.canonicalize()?;
    tracing::info!("Project workspace created at: {}", absolute.display());

    Ok((Sandbox::new(absolute.clone()), absolute, folder))
}
