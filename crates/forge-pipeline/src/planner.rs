//! Planner stage

use crate::prompt::planner_prompt;
use forge_agent::{parse_plan, CompletionClient};
use forge_core::{Plan, Result};

/// Run the planner: one model call, strict parse into a [`Plan`]
///
/// A parse failure is fatal to the run; nothing has touched the filesystem
/// at this point.
pub async fn run_planner<C: CompletionClient>(client: &C, user_prompt: &str) -> Result<Plan> {
    let prompt = planner_prompt(user_prompt);
    let completion = client.complete(None, &prompt).await?;

    let plan = parse_plan(&completion.text).map_err(|e| {
        tracing::error!("Planner output failed to parse: {}", e);
        e
    })?;

    tracing::info!("Planned project: {} ({})", plan.name, plan.techstack);
    Ok(plan)
}
