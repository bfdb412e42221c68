//! # forge-agent
//!
//! Anthropic API client and sandboxed file tools for the Forge pipeline.
//!
//! Each stage invocation is stateless: the caller builds a full prompt, the
//! client returns the model's text, and nothing is carried between calls.
//! The coder's file operations arrive as XML blocks in the output text and
//! are executed against an explicit [`Sandbox`] value, never an ambient
//! global project root.

mod auth;
mod client;
mod extract;
mod file_executor;
mod sandbox;
mod types;

pub use auth::get_auth_token;
pub use client::{AgentClient, CompletionClient};
pub use extract::{parse_plan, parse_task_plan, strip_code_fences};
pub use file_executor::{
    execute_tool_ops, file_operation_instructions, parse_tool_ops, ExecutionResult, ToolOp,
};
pub use sandbox::{Sandbox, WriteOutcome};
pub use types::*;
