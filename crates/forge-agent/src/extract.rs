//! Normalization and strict parsing of model output
//!
//! Models are told to answer with bare JSON but frequently wrap it in a
//! markdown code fence anyway. Fence stripping is a pre-parse normalization
//! step, kept separate from schema validation: the stripped text either
//! deserializes into the exact target shape or the stage fails with a
//! `Parse` error. Parse failures are fatal and never retried.

use forge_core::{ForgeError, Plan, Result, TaskPlan};

/// Remove a wrapping markdown code fence from model output, if present
///
/// Handles ```json and plain ``` fences. Text without a fence is returned
/// trimmed and otherwise untouched.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse planner output into a [`Plan`]
pub fn parse_plan(text: &str) -> Result<Plan> {
    let normalized = strip_code_fences(text);
    serde_json::from_str(normalized).map_err(|e| {
        ForgeError::Parse(format!(
            "Planner did not return valid JSON: {} (output: {})",
            e,
            truncate(normalized, 200)
        ))
    })
}

/// Parse architect output into a [`TaskPlan`]
pub fn parse_task_plan(text: &str) -> Result<TaskPlan> {
    let normalized = strip_code_fences(text);
    serde_json::from_str(normalized).map_err(|e| {
        ForgeError::Parse(format!(
            "Architect did not return valid JSON: {} (output: {})",
            e,
            truncate(normalized, 200)
        ))
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
