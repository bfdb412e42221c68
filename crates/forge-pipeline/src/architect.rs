//! Architect stage

use crate::prompt::architect_prompt;
use forge_agent::{parse_task_plan, CompletionClient};
use forge_core::{ForgeError, Plan, Result, TaskPlan};

/// Run the architect: one model call over the serialized plan, strict parse
/// into a [`TaskPlan`]
///
/// Same fatal-on-parse-failure policy as the planner.
pub async fn run_architect<C: CompletionClient>(client: &C, plan: &Plan) -> Result<TaskPlan> {
    let plan_json = serde_json::to_string(plan)?;
    let prompt = architect_prompt(&plan_json);
    let completion = client.complete(None, &prompt).await?;

    let task_plan = parse_task_plan(&completion.text).map_err(|e| {
        tracing::error!("Architect output failed to parse: {}", e);
        e
    })?;

    if task_plan.is_empty() {
        return Err(ForgeError::Parse(
            "Architect returned an empty implementation step list".to_string(),
        ));
    }

    tracing::info!("Architected {} implementation steps", task_plan.len());
    Ok(task_plan)
}
