//! Coder stage - the iterating state machine over a task plan
//!
//! One invocation handles one implementation step: build a context-augmented
//! instruction, run the bounded tool-use loop, then advance the cursor. The
//! cursor advances even when the step fails, so a single broken file never
//! halts the whole run.

use crate::context::{extract_selector_tokens, needs_selector_context};
use crate::prompt::{coder_step_prompt, coder_system_prompt};
use forge_agent::{execute_tool_ops, CompletionClient, Sandbox};
use forge_core::{CoderState, ForgeError, ImplementationStep, Plan, Result};

/// What a single coder invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cursor was already past the last step; nothing to do
    AlreadyDone,
    /// The step's file(s) were written
    Completed {
        filepath: String,
        files_written: Vec<String>,
    },
}

/// Run one coder invocation against the current step
///
/// The cursor advances exactly once per invocation, whether or not
/// generation succeeded; on failure the error is returned for the driver to
/// record.
pub async fn run_coder_step<C: CompletionClient>(
    client: &C,
    sandbox: &Sandbox,
    plan: &Plan,
    state: &mut CoderState,
    tool_round_limit: usize,
) -> Result<StepOutcome> {
    let Some(step) = state.current_step().cloned() else {
        return Ok(StepOutcome::AlreadyDone);
    };

    let step_number = state.current_step_idx + 1;
    let total_steps = state.task_plan.len();

    let result = generate_file(
        client,
        sandbox,
        plan,
        &step,
        step_number,
        total_steps,
        tool_round_limit,
    )
    .await;

    state.advance();

    let files_written = result?;
    Ok(StepOutcome::Completed {
        filepath: step.filepath,
        files_written,
    })
}

/// Drive the model through the bounded tool-use loop for one step
async fn generate_file<C: CompletionClient>(
    client: &C,
    sandbox: &Sandbox,
    plan: &Plan,
    step: &ImplementationStep,
    step_number: usize,
    total_steps: usize,
    tool_round_limit: usize,
) -> Result<Vec<String>> {
    let listing = sandbox.list()?;
    let selector_context = build_selector_context(sandbox, &step.filepath, &listing)?;

    let system = coder_system_prompt(&plan.techstack);
    let mut prompt = coder_step_prompt(
        step,
        step_number,
        total_steps,
        &listing,
        selector_context.as_deref(),
    );

    let mut files_written = Vec::new();
    let mut errors = Vec::new();

    for round in 1..=tool_round_limit.max(1) {
        let completion = client.complete(Some(&system), &prompt).await?;
        let exec = execute_tool_ops(sandbox, &completion.text);

        tracing::debug!(
            "Coder step {} round {}: {}",
            step_number,
            round,
            exec.summary()
        );

        files_written.extend(exec.files_created);
        files_written.extend(exec.files_modified);
        errors.extend(exec.errors);

        // Read/list requests get answered in one more round; after the last
        // round pending requests are dropped.
        if exec.tool_results.is_empty() || round == tool_round_limit {
            break;
        }

        prompt.push_str("\n\n## TOOL RESULTS\n\n");
        for tool_result in &exec.tool_results {
            prompt.push_str(tool_result);
            prompt.push('\n');
        }
        prompt.push_str(
            "\nUsing these results, emit your final <write_to_file> blocks now.\n",
        );
    }

    if !errors.is_empty() {
        return Err(ForgeError::Tool(format!(
            "Step for {} hit {} tool error(s): {}",
            step.filepath,
            errors.len(),
            errors.join("; ")
        )));
    }

    if files_written.is_empty() {
        return Err(ForgeError::Tool(format!(
            "Coder produced no write for {}",
            step.filepath
        )));
    }

    Ok(files_written)
}

/// For style/behavior files, extract selector tokens from the structural
/// HTML already on disk
fn build_selector_context(
    sandbox: &Sandbox,
    filepath: &str,
    listing: &[String],
) -> Result<Option<String>> {
    if !needs_selector_context(filepath) {
        return Ok(None);
    }

    let Some(html_file) = listing.iter().find(|f| f.to_lowercase().ends_with(".html")) else {
        return Ok(None);
    };

    let html = sandbox.read(html_file)?;
    Ok(extract_selector_tokens(&html).to_prompt_block())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forge_agent::Completion;
    use forge_core::{PlannedFile, TaskPlan};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Scripted stand-in for the model: pops one canned response per call
    struct ScriptedClient {
        responses: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _system: Option<&str>, prompt: &str) -> Result<Completion> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let text = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ForgeError::Api("script exhausted".to_string()))?;
            Ok(Completion { text, usage: None })
        }
    }

    fn plan() -> Plan {
        Plan {
            name: "Todo App".to_string(),
            description: "A todo app".to_string(),
            techstack: "HTML, CSS, JavaScript".to_string(),
            features: vec!["add tasks".to_string()],
            files: vec![
                PlannedFile {
                    path: "index.html".to_string(),
                    purpose: "structure".to_string(),
                },
                PlannedFile {
                    path: "style.css".to_string(),
                    purpose: "styling".to_string(),
                },
            ],
        }
    }

    fn state(steps: &[(&str, &str)]) -> CoderState {
        CoderState::new(TaskPlan {
            implementation_steps: steps
                .iter()
                .map(|(f, t)| ImplementationStep {
                    filepath: f.to_string(),
                    task_description: t.to_string(),
                })
                .collect(),
        })
    }

    fn write_block(path: &str, content: &str) -> String {
        format!(
            "<write_to_file>\n<path>{}</path>\n<content>\n{}\n</content>\n</write_to_file>",
            path, content
        )
    }

    #[tokio::test]
    async fn test_step_writes_file_and_advances() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path());
        let client = ScriptedClient::new(vec![&write_block("index.html", "<html></html>")]);

        let mut coder = state(&[("index.html", "Create structure")]);
        let outcome = run_coder_step(&client, &sandbox, &plan(), &mut coder, 4)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            StepOutcome::Completed {
                filepath: "index.html".to_string(),
                files_written: vec!["index.html".to_string()],
            }
        );
        assert_eq!(coder.current_step_idx, 1);
        assert!(coder.is_done());
        assert!(dir.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn test_done_state_is_noop() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path());
        let client = ScriptedClient::new(vec![]);

        let mut coder = state(&[]);
        let outcome = run_coder_step(&client, &sandbox, &plan(), &mut coder, 4)
            .await
            .unwrap();

        assert_eq!(outcome, StepOutcome::AlreadyDone);
        assert_eq!(coder.current_step_idx, 0);
    }

    #[tokio::test]
    async fn test_failed_step_still_advances() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path());
        // Model answers with prose and no tool call
        let client = ScriptedClient::new(vec!["I would write the file like this..."]);

        let mut coder = state(&[("app.js", "Add logic")]);
        let result = run_coder_step(&client, &sandbox, &plan(), &mut coder, 4).await;

        assert!(matches!(result, Err(ForgeError::Tool(_))));
        assert_eq!(coder.current_step_idx, 1);
    }

    #[tokio::test]
    async fn test_read_request_gets_second_round() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path());
        sandbox.write("index.html", "<div id=\"app\"></div>").unwrap();

        let client = ScriptedClient::new(vec![
            "<read_file>\n<path>index.html</path>\n</read_file>",
            &write_block("app.js", "document.getElementById('app');"),
        ]);

        let mut coder = state(&[("app.js", "Wire up the app")]);
        let outcome = run_coder_step(&client, &sandbox, &plan(), &mut coder, 4)
            .await
            .unwrap();

        match outcome {
            StepOutcome::Completed { files_written, .. } => {
                assert_eq!(files_written, vec!["app.js"]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        // Second prompt carries the read result
        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("TOOL RESULTS"));
        assert!(prompts[1].contains("id=\"app\""));
    }

    #[tokio::test]
    async fn test_css_step_receives_selector_context() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path());
        sandbox
            .write(
                "index.html",
                "<div class=\"app-container\"><ul id=\"task-list\"></ul></div>",
            )
            .unwrap();

        let client = ScriptedClient::new(vec![&write_block(
            "style.css",
            ".app-container { display: grid; }",
        )]);

        let mut coder = state(&[("style.css", "Style the container")]);
        run_coder_step(&client, &sandbox, &plan(), &mut coder, 4)
            .await
            .unwrap();

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("EXISTING SELECTORS"));
        assert!(prompts[0].contains("task-list"));
        assert!(prompts[0].contains("app-container"));
    }

    #[tokio::test]
    async fn test_html_step_gets_no_selector_context() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path());

        let client = ScriptedClient::new(vec![&write_block("index.html", "<html></html>")]);

        let mut coder = state(&[("index.html", "Create structure")]);
        run_coder_step(&client, &sandbox, &plan(), &mut coder, 4)
            .await
            .unwrap();

        let prompts = client.prompts.lock().unwrap();
        assert!(!prompts[0].contains("EXISTING SELECTORS"));
    }

    #[tokio::test]
    async fn test_sandbox_escape_is_tool_failure() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path());
        let client = ScriptedClient::new(vec![&write_block("../evil.js", "boom")]);

        let mut coder = state(&[("app.js", "Add logic")]);
        let result = run_coder_step(&client, &sandbox, &plan(), &mut coder, 4).await;

        assert!(matches!(result, Err(ForgeError::Tool(_))));
        assert!(!dir.path().parent().unwrap().join("evil.js").exists());
        assert_eq!(coder.current_step_idx, 1);
    }
}
