//! Pipeline driver - the fixed stage chain with the coder self-loop
//!
//! Stages execute strictly sequentially: planner, workspace creation,
//! architect, then the coder loop until its cursor is exhausted. Progress
//! events are delivered one-way through an optional channel; a dropped
//! receiver never stalls the run.

use crate::architect::run_architect;
use crate::coder::{run_coder_step, StepOutcome};
use crate::planner::run_planner;
use crate::workspace::create_workspace;
use forge_core::{
    CoderState, ForgeError, PipelineEvent, PipelineSettings, PipelineState, PipelineStatus, Result,
};
use forge_agent::CompletionClient;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Result of a completed pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub project_path: PathBuf,
    pub project_name: String,
    pub folder: String,
    pub status: PipelineStatus,
    /// Filepaths whose step failed and was skipped
    pub failed_steps: Vec<String>,
}

/// The sequential stage driver
pub struct Pipeline<C: CompletionClient> {
    client: C,
    projects_dir: PathBuf,
    settings: PipelineSettings,
}

impl<C: CompletionClient> Pipeline<C> {
    pub fn new(client: C, projects_dir: impl Into<PathBuf>, settings: PipelineSettings) -> Self {
        Self {
            client,
            projects_dir: projects_dir.into(),
            settings,
        }
    }

    /// Run the full chain for one user prompt
    ///
    /// `step_limit` overrides the configured ceiling on coder invocations.
    /// Fatal errors (parse failures, filesystem errors, exhausted API
    /// retries) abort the run; per-step tool failures are recorded and
    /// skipped.
    pub async fn run(
        &self,
        user_prompt: &str,
        step_limit: Option<usize>,
        events: Option<mpsc::Sender<PipelineEvent>>,
    ) -> Result<PipelineOutcome> {
        let mut state = PipelineState::new(user_prompt);

        // 1. Planner - nothing touches the filesystem until this parses
        let plan = run_planner(&self.client, user_prompt).await?;
        emit(
            &events,
            PipelineEvent::Planning {
                message: "Drafting engineering plan...".to_string(),
                details: format!("Planned: {}", plan.name),
            },
        )
        .await;
        state.plan = Some(plan.clone());

        // 2. Workspace creation
        let (sandbox, project_path, folder) = create_workspace(&self.projects_dir, &plan.name)?;
        emit(
            &events,
            PipelineEvent::Workspace {
                message: "Setting up workspace...".to_string(),
                details: format!("Dir: {}", folder),
            },
        )
        .await;
        state.project_path = Some(project_path.clone());

        // 3. Architect
        let task_plan = run_architect(&self.client, &plan).await?;
        emit(
            &events,
            PipelineEvent::Architect {
                message: "Designing architecture...".to_string(),
                details: format!("{} implementation steps", task_plan.len()),
            },
        )
        .await;
        state.task_plan = Some(task_plan.clone());

        // 4. Coder loop
        let total_steps = task_plan.len();
        let mut coder_state = CoderState::new(task_plan);
        let step_limit = step_limit.unwrap_or(self.settings.step_limit);
        let mut iterations: usize = 0;

        while !coder_state.is_done() {
            iterations += 1;
            if iterations > step_limit {
                return Err(ForgeError::Other(format!(
                    "Step limit of {} reached with {} of {} steps done",
                    step_limit, coder_state.current_step_idx, total_steps
                )));
            }

            let filepath = coder_state
                .current_step()
                .map(|s| s.filepath.clone())
                .unwrap_or_default();

            match run_coder_step(
                &self.client,
                &sandbox,
                &plan,
                &mut coder_state,
                self.settings.tool_round_limit,
            )
            .await
            {
                Ok(StepOutcome::Completed { filepath, .. }) => {
                    emit(
                        &events,
                        PipelineEvent::Coding {
                            message: format!(
                                "Writing code ({}/{})...",
                                coder_state.current_step_idx, total_steps
                            ),
                            details: format!("Task: {}", filepath),
                        },
                    )
                    .await;
                }
                Ok(StepOutcome::AlreadyDone) => break,
                // Best-effort: one broken file does not halt the run
                Err(ForgeError::Tool(e)) => {
                    tracing::warn!("Skipping step for {}: {}", filepath, e);
                    state.failed_steps.push(filepath.clone());
                    emit(
                        &events,
                        PipelineEvent::Coding {
                            message: format!(
                                "Writing code ({}/{})...",
                                coder_state.current_step_idx, total_steps
                            ),
                            details: format!("Skipped {}: {}", filepath, e),
                        },
                    )
                    .await;
                }
                Err(fatal) => return Err(fatal),
            }
        }

        state.status = if state.failed_steps.is_empty() {
            PipelineStatus::Done
        } else {
            PipelineStatus::DoneWithFailures
        };
        state.coder_state = Some(coder_state);

        tracing::info!(
            "Pipeline complete: {} ({:?}, {} failed steps)",
            plan.name,
            state.status,
            state.failed_steps.len()
        );

        Ok(PipelineOutcome {
            project_path,
            project_name: plan.name,
            folder,
            status: state.status,
            failed_steps: state.failed_steps,
        })
    }
}

/// Send an event if a listener is attached; delivery is advisory
async fn emit(events: &Option<mpsc::Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}
