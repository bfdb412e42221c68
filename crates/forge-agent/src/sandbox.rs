//! Path-sandboxed file operations against a project root
//!
//! A `Sandbox` is an explicit value threaded through every tool call. All
//! four operations resolve paths relative to the root; anything absolute or
//! traversing above the root is rejected with `PathViolation`.

use forge_core::{ForgeError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Whether a write created a new file or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Modified,
}

/// File tool layer confined to a single project root
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox over an existing directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The sandbox root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path inside the root
    ///
    /// Rejects absolute paths and any `..` component, so the result can
    /// never land outside the root even when the target does not exist yet.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let rel = Path::new(path);

        if rel.is_absolute() {
            return Err(ForgeError::PathViolation(format!(
                "Absolute paths not allowed: {}",
                path
            )));
        }

        for component in rel.components() {
            match component {
                Component::ParentDir => {
                    return Err(ForgeError::PathViolation(format!(
                        "Path traversal not allowed: {}",
                        path
                    )));
                }
                Component::Prefix(_) | Component::RootDir => {
                    return Err(ForgeError::PathViolation(format!(
                        "Absolute paths not allowed: {}",
                        path
                    )));
                }
                _ => {}
            }
        }

        Ok(self.root.join(rel))
    }

    /// Read a file's contents, or empty string if it does not exist
    pub fn read(&self, path: &str) -> Result<String> {
        let p = self.resolve(path)?;
        if !p.exists() {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(&p)?)
    }

    /// Write a file, creating parent directories as needed
    ///
    /// Always a full-file overwrite.
    pub fn write(&self, path: &str, content: &str) -> Result<WriteOutcome> {
        let p = self.resolve(path)?;
        let outcome = if p.exists() {
            WriteOutcome::Modified
        } else {
            WriteOutcome::Created
        };

        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                tracing::debug!("Created directory: {}", parent.display());
            }
        }

        fs::write(&p, content)?;
        tracing::info!(
            "{} file: {}",
            match outcome {
                WriteOutcome::Created => "Created",
                WriteOutcome::Modified => "Modified",
            },
            p.display()
        );
        Ok(outcome)
    }

    /// Recursive listing of all files under the root, as sorted relative paths
    pub fn list(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }

        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, Sandbox) {
        let dir = TempDir::new().unwrap();
        let sb = Sandbox::new(dir.path());
        (dir, sb)
    }

    #[test]
    fn test_write_and_read() {
        let (_dir, sb) = sandbox();
        assert_eq!(sb.write("index.html", "<html></html>").unwrap(), WriteOutcome::Created);
        assert_eq!(sb.read("index.html").unwrap(), "<html></html>");
        assert_eq!(sb.write("index.html", "<html>2</html>").unwrap(), WriteOutcome::Modified);
        assert_eq!(sb.read("index.html").unwrap(), "<html>2</html>");
    }

    #[test]
    fn test_read_missing_returns_empty() {
        let (_dir, sb) = sandbox();
        assert_eq!(sb.read("does/not/exist.js").unwrap(), "");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let (dir, sb) = sandbox();
        sb.write("a/b/c/deep.txt", "nested").unwrap();
        assert!(dir.path().join("a/b/c/deep.txt").exists());
    }

    #[test]
    fn test_list_recursive_sorted() {
        let (_dir, sb) = sandbox();
        sb.write("app.js", "x").unwrap();
        sb.write("css/style.css", "y").unwrap();
        sb.write("index.html", "z").unwrap();

        let files = sb.list().unwrap();
        assert_eq!(files, vec!["app.js", "css/style.css", "index.html"]);
    }

    #[test]
    fn test_list_empty_root() {
        let (_dir, sb) = sandbox();
        assert!(sb.list().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_traversal() {
        let (_dir, sb) = sandbox();
        assert!(matches!(
            sb.read("../outside.txt"),
            Err(ForgeError::PathViolation(_))
        ));
        assert!(matches!(
            sb.write("../../etc/passwd", "x"),
            Err(ForgeError::PathViolation(_))
        ));
        assert!(matches!(
            sb.write("ok/../../escape.txt", "x"),
            Err(ForgeError::PathViolation(_))
        ));
    }

    #[test]
    fn test_rejects_absolute() {
        let (_dir, sb) = sandbox();
        assert!(matches!(
            sb.write("/etc/passwd", "x"),
            Err(ForgeError::PathViolation(_))
        ));
        assert!(matches!(
            sb.read("/tmp/anything"),
            Err(ForgeError::PathViolation(_))
        ));
    }

    #[test]
    fn test_traversal_leaves_no_trace() {
        let (dir, sb) = sandbox();
        let _ = sb.write("../escaped.txt", "x");
        assert!(!dir.path().parent().unwrap().join("escaped.txt").exists());
    }
}
