//! Prompt builders for the three model-backed stages
//!
//! Each builder returns the full instruction text for one invocation. The
//! planner and architect demand bare-JSON answers matching the shapes in
//! forge-core; the coder gets a system prompt with stack-specific quality
//! rules plus a per-step task prompt.

use forge_agent::file_operation_instructions;
use forge_core::ImplementationStep;

/// Build the planner instruction for a user request
pub fn planner_prompt(user_prompt: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are the PLANNER agent. Convert the user's request into a complete, \
         structured engineering project plan.\n\n",
    );
    prompt.push_str("Determine the following:\n");
    prompt.push_str("1. name: A short, descriptive project name (e.g. \"Modern Calculator\").\n");
    prompt.push_str("2. description: A one-sentence description of the app.\n");
    prompt.push_str(
        "3. techstack: The tech stack to use. For web apps, default to \
         \"HTML, CSS, JavaScript\" unless React/TypeScript is explicitly requested.\n",
    );
    prompt.push_str("4. features: A list of key features for the application.\n");
    prompt.push_str(
        "5. files: A list of file objects, each with a 'path' and a 'purpose' key. \
         For an HTML/CSS/JS project this must include at least index.html, style.css, \
         app.js, and README.md.\n\n",
    );
    prompt.push_str("Example for 'files':\n");
    prompt.push_str(
        r#"[
  { "path": "index.html", "purpose": "The main HTML structure for the application." },
  { "path": "style.css", "purpose": "Holds all the CSS for styling the application." },
  { "path": "app.js", "purpose": "Contains the JavaScript logic for the application." },
  { "path": "README.md", "purpose": "Provides instructions and a description of the project." }
]
"#,
    );
    prompt.push_str(
        "\nCRITICAL: Respond with *only* the valid JSON object for this plan. \
         No conversational text, markdown fences, or other characters before or \
         after the JSON.\n\n",
    );
    prompt.push_str("User request:\n");
    prompt.push_str(user_prompt);
    prompt.push('\n');

    prompt
}

/// Build the architect instruction from a serialized plan
pub fn architect_prompt(plan_json: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are the ARCHITECT agent. Given this JSON project plan, break it down \
         into explicit engineering tasks for the CODER agent.\n\n",
    );
    prompt.push_str("RULES:\n");
    prompt.push_str("- Pay close attention to the techstack in the plan to inform your tasks.\n");
    prompt.push_str("- For each FILE in the plan, create one or more IMPLEMENTATION TASKS.\n");
    prompt.push_str("- In each task description:\n");
    prompt.push_str("    * Specify exactly what to implement.\n");
    prompt.push_str(
        "    * For HTML tasks, describe the visual and structural order of elements, \
         especially if a CSS grid or flexbox layout will be used.\n",
    );
    prompt.push_str(
        "    * Name the variables, functions, classes, and CSS class names to be used.\n",
    );
    prompt.push_str(
        "    * Mention how the task depends on or will be used by previous tasks.\n",
    );
    prompt.push_str(
        "- Order tasks so dependencies are implemented first: HTML structure first, \
         then CSS, then JS.\n\n",
    );
    prompt.push_str("CRITICAL JSON FORMAT:\n");
    prompt.push_str(
        "Respond with a JSON object whose only top-level key is `implementation_steps`, \
         a list of task objects. Each task object must have exactly two keys: \
         `filepath` and `task_description`.\n\n",
    );
    prompt.push_str("Example JSON output:\n");
    prompt.push_str(
        r#"{
  "implementation_steps": [
    {
      "filepath": "index.html",
      "task_description": "Create the main HTML structure. Include a main container with class 'app-container', a header element with class 'app-header', and a content area with class 'main-content'."
    },
    {
      "filepath": "style.css",
      "task_description": "Define a CSS grid for the '.app-container' to lay out the '.app-header' and '.main-content' areas. Add basic theme colors and fonts."
    },
    {
      "filepath": "app.js",
      "task_description": "Select the '.main-content' element using its class and log a 'Script Loaded' message to the console."
    }
  ]
}
"#,
    );
    prompt.push_str("\nProject Plan (JSON):\n");
    prompt.push_str(plan_json);
    prompt.push_str(
        "\n\nCRITICAL: Respond with *only* the valid JSON object matching this structure. \
         No conversational text, markdown fences, or other characters before or after \
         the JSON.\n",
    );

    prompt
}

/// Build the coder's system prompt with stack-specific quality rules
pub fn coder_system_prompt(techstack: &str) -> String {
    let stack_lower = techstack.to_lowercase();
    let stack_rules = if stack_lower.contains("react") || stack_lower.contains("typescript") {
        "## PROJECT CONTEXT & STACK\n\n\
         You are building a React/TypeScript application.\n\
         - Tech Stack: React 18+, TypeScript, Tailwind CSS, Vite\n\
         - Architecture: component-based, modern hooks patterns\n\n\
         ## CODE QUALITY STANDARDS\n\n\
         1. TypeScript: proper type definitions for all props, state, and functions; \
         interfaces for objects, types for unions; no 'any'.\n\
         2. React: functional components with hooks; correct dependency arrays in \
         useEffect/useCallback; custom hooks for reusable logic.\n\
         3. Styling: Tailwind utility classes; responsive, mobile-first design.\n"
            .to_string()
    } else {
        format!(
            "## PROJECT CONTEXT & STACK\n\n\
             You are building a web application using: {}\n\
             - Output clean, well-formatted, functional files.\n\
             - All code goes in separate files (e.g. index.html, style.css, app.js).\n\
             - Link the CSS and JS files in the HTML.\n\n\
             ## CODE QUALITY STANDARDS\n\n\
             1. HTML: semantic HTML5 tags, a <head> with <title> and <meta> tags, \
             properly linked .css and .js files.\n\
             2. CSS: modern layout (Flexbox, Grid), clean readable selectors.\n\
             3. JavaScript: modern ES6+ syntax (let/const, arrow functions); all DOM \
             selectors must match the HTML.\n",
            techstack
        )
    };

    format!(
        "You are the CODER agent, a senior full-stack engineer producing production \
         code.\n\n{}\n{}\n## FILE WRITING RULES\n\n\
         1. Write complete, syntactically correct files; never leave placeholders.\n\
         2. Use standard quotes without unnecessary escaping.\n\
         3. Consistent two-space indentation and readable line breaks.\n",
        stack_rules,
        file_operation_instructions()
    )
}

/// Build the per-step task prompt for the coder
///
/// `listing` is the current recursive file listing; `selector_context` is
/// the optional block of identifiers extracted from the already-written
/// structural file.
pub fn coder_step_prompt(
    step: &ImplementationStep,
    step_number: usize,
    total_steps: usize,
    listing: &[String],
    selector_context: Option<&str>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "# CODER TASK - Step {} of {}\n\n",
        step_number, total_steps
    ));

    prompt.push_str("## FILE\n\n");
    prompt.push_str(&step.filepath);
    prompt.push_str("\n\n## TASK\n\n");
    prompt.push_str(&step.task_description);
    prompt.push_str("\n\n");

    prompt.push_str("## PROJECT FILES\n\n");
    if listing.is_empty() {
        prompt.push_str("The project directory is empty.\n");
    } else {
        for file in listing {
            prompt.push_str(&format!("- {}\n", file));
        }
    }
    prompt.push('\n');

    if let Some(context) = selector_context {
        prompt.push_str(context);
        prompt.push('\n');
    }

    prompt.push_str(
        "If the file already exists, read it with <read_file> before rewriting it. \
         If you are creating a new file, emit a single <write_to_file> block with \
         the complete content.\n",
    );

    prompt
}
