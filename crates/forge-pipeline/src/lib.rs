//! # forge-pipeline
//!
//! The stage chain that turns a user prompt into a generated project:
//! planner, workspace creation, architect, and the iterating coder loop.
//!
//! Stages run strictly sequentially and share a single `PipelineState`.
//! The coder is a state machine over `CoderState` that re-enters itself
//! until every implementation step has been attempted; a single step's
//! failure is logged and skipped rather than aborting the run.

mod architect;
mod coder;
mod context;
mod pipeline;
mod planner;
mod prompt;
mod workspace;

pub use architect::run_architect;
pub use coder::{run_coder_step, StepOutcome};
pub use context::{extract_selector_tokens, needs_selector_context, SelectorTokens};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use planner::run_planner;
pub use prompt::{architect_prompt, coder_step_prompt, coder_system_prompt, planner_prompt};
pub use workspace::{create_workspace, sanitize_project_name};
