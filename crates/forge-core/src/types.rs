//! Data model shared by all pipeline stages

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file the planner decided the project needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannedFile {
    /// Path relative to the project root
    pub path: String,
    /// What this file is for
    pub purpose: String,
}

/// Structured project plan produced by the planner stage
///
/// Parsed from model output with strict validation: missing keys, wrong
/// types, or extra fields all reject. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    pub name: String,
    pub description: String,
    pub techstack: String,
    pub features: Vec<String>,
    pub files: Vec<PlannedFile>,
}

/// One per-file engineering task produced by the architect stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImplementationStep {
    pub filepath: String,
    pub task_description: String,
}

/// Ordered list of implementation tasks covering every planned file
///
/// Created once by the architect; read-only while the coder runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPlan {
    pub implementation_steps: Vec<ImplementationStep>,
}

impl TaskPlan {
    pub fn len(&self) -> usize {
        self.implementation_steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementation_steps.is_empty()
    }
}

/// Progress of the coder loop over a task plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoderStatus {
    NotStarted,
    InProgress,
    Done,
}

/// Cursor over a task plan's step list
///
/// `current_step_idx` only ever moves forward and never exceeds the number
/// of steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoderState {
    pub task_plan: TaskPlan,
    pub current_step_idx: usize,
}

impl CoderState {
    pub fn new(task_plan: TaskPlan) -> Self {
        Self {
            task_plan,
            current_step_idx: 0,
        }
    }

    /// The step the coder should work on next, if any remain
    pub fn current_step(&self) -> Option<&ImplementationStep> {
        self.task_plan.implementation_steps.get(self.current_step_idx)
    }

    /// Advance the cursor by one step, clamped to the step count
    pub fn advance(&mut self) {
        if self.current_step_idx < self.task_plan.len() {
            self.current_step_idx += 1;
        }
    }

    pub fn status(&self) -> CoderStatus {
        if self.current_step_idx >= self.task_plan.len() {
            CoderStatus::Done
        } else if self.current_step_idx == 0 {
            CoderStatus::NotStarted
        } else {
            CoderStatus::InProgress
        }
    }

    pub fn is_done(&self) -> bool {
        self.status() == CoderStatus::Done
    }
}

/// Terminal disposition of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    InProgress,
    /// Every implementation step completed
    Done,
    /// The run finished but one or more steps were skipped after a tool
    /// failure, so the project may be incomplete
    DoneWithFailures,
}

/// Aggregate state carried through the stage chain
///
/// Single owner: the pipeline driver. Stages fill in their slot and hand the
/// record to the next stage.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub user_prompt: String,
    pub plan: Option<Plan>,
    pub task_plan: Option<TaskPlan>,
    pub coder_state: Option<CoderState>,
    pub project_path: Option<PathBuf>,
    pub status: PipelineStatus,
    /// Filepaths whose step failed and was skipped
    pub failed_steps: Vec<String>,
}

impl PipelineState {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            plan: None,
            task_plan: None,
            coder_state: None,
            project_path: None,
            status: PipelineStatus::InProgress,
            failed_steps: Vec::new(),
        }
    }
}

/// Progress record streamed to callers as newline-delimited JSON
///
/// The `phase` tag mirrors the stage chain; `complete` and `error` are
/// terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PipelineEvent {
    Planning {
        message: String,
        details: String,
    },
    Workspace {
        message: String,
        details: String,
    },
    Architect {
        message: String,
        details: String,
    },
    Coding {
        message: String,
        details: String,
    },
    Complete {
        message: String,
        project_path: String,
        project_name: String,
        status: PipelineStatus,
        failed_files: Vec<String>,
    },
    Error {
        message: String,
    },
}

impl PipelineEvent {
    /// Serialize as one NDJSON line, including the trailing newline
    pub fn to_ndjson(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => format!("{}\n", json),
            Err(e) => {
                tracing::error!("Failed to serialize pipeline event: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_plan(n: usize) -> TaskPlan {
        TaskPlan {
            implementation_steps: (0..n)
                .map(|i| ImplementationStep {
                    filepath: format!("file{}.js", i),
                    task_description: format!("task {}", i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_coder_state_transitions() {
        let mut state = CoderState::new(task_plan(3));
        assert_eq!(state.status(), CoderStatus::NotStarted);
        assert_eq!(state.current_step().unwrap().filepath, "file0.js");

        state.advance();
        assert_eq!(state.status(), CoderStatus::InProgress);

        state.advance();
        state.advance();
        assert_eq!(state.status(), CoderStatus::Done);
        assert!(state.current_step().is_none());
    }

    #[test]
    fn test_coder_index_bounded() {
        let mut state = CoderState::new(task_plan(2));
        for _ in 0..10 {
            state.advance();
        }
        assert_eq!(state.current_step_idx, 2);
        assert!(state.is_done());
    }

    #[test]
    fn test_empty_task_plan_is_done() {
        let state = CoderState::new(task_plan(0));
        assert_eq!(state.status(), CoderStatus::Done);
    }

    #[test]
    fn test_plan_rejects_unknown_fields() {
        let json = r#"{
            "name": "App",
            "description": "d",
            "techstack": "HTML, CSS, JavaScript",
            "features": [],
            "files": [],
            "chain_of_thought": "extra"
        }"#;
        assert!(serde_json::from_str::<Plan>(json).is_err());
    }

    #[test]
    fn test_plan_rejects_missing_keys() {
        let json = r#"{ "name": "App", "description": "d" }"#;
        assert!(serde_json::from_str::<Plan>(json).is_err());
    }

    #[test]
    fn test_event_ndjson_shape() {
        let event = PipelineEvent::Planning {
            message: "Drafting engineering plan...".to_string(),
            details: "Planned: Todo App".to_string(),
        };
        let line = event.to_ndjson();
        assert!(line.ends_with('\n'));
        assert!(line.contains(r#""phase":"planning""#));

        let event = PipelineEvent::Complete {
            message: "Project ready!".to_string(),
            project_path: "/tmp/projects/Todo_App_20250101_120000".to_string(),
            project_name: "Todo App".to_string(),
            status: PipelineStatus::Done,
            failed_files: Vec::new(),
        };
        let line = event.to_ndjson();
        assert!(line.contains(r#""phase":"complete""#));
        assert!(line.contains(r#""status":"DONE""#));
    }

    #[test]
    fn test_event_roundtrip() {
        let event = PipelineEvent::Error {
            message: "Planner did not return valid JSON".to_string(),
        };
        let parsed: PipelineEvent = serde_json::from_str(event.to_ndjson().trim()).unwrap();
        assert_eq!(parsed, event);
    }
}
