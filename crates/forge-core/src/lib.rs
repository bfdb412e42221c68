//! # forge-core
//!
//! Core types for the Forge code-generation pipeline.
//!
//! Forge turns a free-text user request into a working project on disk by
//! running a fixed chain of LLM-backed stages:
//!
//! - The **planner** produces a structured [`Plan`]
//! - The **architect** breaks the plan into an ordered [`TaskPlan`]
//! - The **coder** walks the task list one file at a time, tracked by
//!   [`CoderState`]
//!
//! All stages share a single [`PipelineState`], owned by the pipeline driver
//! and mutated strictly sequentially. Progress is reported through
//! [`PipelineEvent`] records.

mod config;
mod error;
mod types;

pub use config::{ForgeConfig, ModelConfig, PipelineSettings, ServerSettings};
pub use error::{ForgeError, Result};
pub use types::*;
