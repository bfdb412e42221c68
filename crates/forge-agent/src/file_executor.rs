//! Parses and executes file operations from coder output
//!
//! The coder emits tool calls as XML blocks:
//! - `<write_to_file><path>...</path><content>...</content></write_to_file>`
//! - `<read_file><path>...</path></read_file>`
//! - `<list_files/>`
//!
//! Writes are applied through the sandbox immediately. Read and list
//! requests produce result blocks that the caller feeds back to the model
//! in the next round. A failed operation is recorded and does not abort
//! the rest of the batch.

use crate::sandbox::{Sandbox, WriteOutcome};

/// A tool operation parsed from coder output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOp {
    /// Write content to a file
    WriteFile { path: String, content: String },
    /// Request the contents of a file
    ReadFile { path: String },
    /// Request a recursive listing of the project
    ListFiles,
}

/// Result of executing one batch of tool operations
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// Files that were created
    pub files_created: Vec<String>,
    /// Files that were overwritten
    pub files_modified: Vec<String>,
    /// Errors encountered during execution
    pub errors: Vec<String>,
    /// Answers to read/list requests, to be fed back to the model
    pub tool_results: Vec<String>,
}

impl ExecutionResult {
    /// Generate a summary string
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.files_created.is_empty() {
            parts.push(format!("{} created", self.files_created.len()));
        }
        if !self.files_modified.is_empty() {
            parts.push(format!("{} modified", self.files_modified.len()));
        }
        if !self.tool_results.is_empty() {
            parts.push(format!("{} tool results", self.tool_results.len()));
        }
        if !self.errors.is_empty() {
            parts.push(format!("{} errors", self.errors.len()));
        }

        if parts.is_empty() {
            "no file operations".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Whether any file was written
    pub fn has_writes(&self) -> bool {
        !self.files_created.is_empty() || !self.files_modified.is_empty()
    }

    /// Whether the model asked for information it has not received yet
    pub fn has_pending_requests(&self) -> bool {
        !self.tool_results.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse all tool operations from output text
pub fn parse_tool_ops(text: &str) -> Vec<ToolOp> {
    let mut operations = Vec::new();

    operations.extend(parse_blocks(text, "write_to_file", |block| {
        let path = extract_tag_content(block, "path")?;
        let content = extract_tag_content(block, "content")?;
        Some(ToolOp::WriteFile {
            path: path.trim().to_string(),
            content,
        })
    }));

    operations.extend(parse_blocks(text, "read_file", |block| {
        let path = extract_tag_content(block, "path")?;
        Some(ToolOp::ReadFile {
            path: path.trim().to_string(),
        })
    }));

    let list_requests = text.matches("<list_files/>").count() + text.matches("<list_files />").count();
    for _ in 0..list_requests {
        operations.push(ToolOp::ListFiles);
    }

    operations
}

/// Parse and execute all tool operations found in coder output
pub fn execute_tool_ops(sandbox: &Sandbox, output: &str) -> ExecutionResult {
    let mut result = ExecutionResult::default();

    for op in parse_tool_ops(output) {
        match op {
            ToolOp::WriteFile { path, content } => match sandbox.write(&path, &content) {
                Ok(WriteOutcome::Created) => result.files_created.push(path),
                Ok(WriteOutcome::Modified) => result.files_modified.push(path),
                Err(e) => {
                    tracing::warn!("Failed to write {}: {}", path, e);
                    result.errors.push(format!("Failed to write {}: {}", path, e));
                }
            },
            ToolOp::ReadFile { path } => match sandbox.read(&path) {
                Ok(content) => result
                    .tool_results
                    .push(format!("<file path=\"{}\">\n{}\n</file>", path, content)),
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path, e);
                    result.errors.push(format!("Failed to read {}: {}", path, e));
                }
            },
            ToolOp::ListFiles => match sandbox.list() {
                Ok(files) => {
                    let listing = if files.is_empty() {
                        "The project directory is empty.".to_string()
                    } else {
                        files.join("\n")
                    };
                    result
                        .tool_results
                        .push(format!("<file_listing>\n{}\n</file_listing>", listing));
                }
                Err(e) => result.errors.push(format!("Failed to list files: {}", e)),
            },
        }
    }

    result
}

/// Parse all `<tag>...</tag>` blocks, applying `build` to each body
fn parse_blocks<F>(text: &str, tag: &str, build: F) -> Vec<ToolOp>
where
    F: Fn(&str) -> Option<ToolOp>,
{
    let open_tag = format!("<{}>", tag);
    let close_tag = format!("</{}>", tag);

    let mut operations = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find(&open_tag) {
        let block_start = start + open_tag.len();

        if let Some(end) = remaining[block_start..].find(&close_tag) {
            let block_content = &remaining[block_start..block_start + end];

            if let Some(op) = build(block_content) {
                operations.push(op);
            }

            remaining = &remaining[block_start + end + close_tag.len()..];
        } else {
            break;
        }
    }

    operations
}

/// Extract content between `<tag>` and `</tag>`
fn extract_tag_content(text: &str, tag: &str) -> Option<String> {
    let open_tag = format!("<{}>", tag);
    let close_tag = format!("</{}>", tag);

    let start = text.find(&open_tag)?;
    let content_start = start + open_tag.len();
    let end = text[content_start..].find(&close_tag)?;

    // Writes keep inner whitespace except a single leading/trailing newline
    let content = &text[content_start..content_start + end];
    let content = content.strip_prefix('\n').unwrap_or(content);
    let content = content.strip_suffix('\n').unwrap_or(content);
    Some(content.to_string())
}

/// Instructions for the coder on how to use the file tools
pub fn file_operation_instructions() -> &'static str {
    r#"## FILE TOOLS

Use ONLY these tools, as XML blocks in your output:

To create or update a file (complete content, not a patch):

<write_to_file>
<path>relative/path/to/file</path>
<content>
...full file content...
</content>
</write_to_file>

To read an existing file before changing it:

<read_file>
<path>relative/path/to/file</path>
</read_file>

To see the project structure:

<list_files/>

RULES:
- All paths are relative to the project root. Never use absolute paths.
- Parent directories are created automatically.
- If you request reads or listings, results arrive in the next message;
  otherwise your write blocks are applied as-is.
- You can write multiple files in one response.
"#
}
