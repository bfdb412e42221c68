//! Cross-file context injection for the coder
//!
//! Style and behavior files must reference only selectors that exist in the
//! structural HTML written earlier in the run. Before generating a CSS/JS
//! step, the id and class tokens of the written HTML are extracted and
//! injected verbatim into the step prompt.

use regex::Regex;
use std::sync::OnceLock;

/// Identifier tokens extracted from a structural HTML file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorTokens {
    pub ids: Vec<String>,
    pub classes: Vec<String>,
}

impl SelectorTokens {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.classes.is_empty()
    }

    /// Render as a prompt block, or None when there is nothing to inject
    pub fn to_prompt_block(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut block = String::from("## EXISTING SELECTORS\n\n");
        block.push_str(
            "The HTML structure is already written. Reference ONLY these identifiers; \
             do not invent new ones:\n\n",
        );
        if !self.ids.is_empty() {
            block.push_str(&format!("ids: {}\n", self.ids.join(", ")));
        }
        if !self.classes.is_empty() {
            block.push_str(&format!("classes: {}\n", self.classes.join(", ")));
        }
        Some(block)
    }
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\bid\s*=\s*["']([^"']+)["']"#).expect("valid regex"))
}

fn class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\bclass\s*=\s*["']([^"']+)["']"#).expect("valid regex"))
}

/// Extract id and class tokens from HTML text, deduplicated in order of
/// first appearance
pub fn extract_selector_tokens(html: &str) -> SelectorTokens {
    let mut tokens = SelectorTokens::default();

    for capture in id_regex().captures_iter(html) {
        let id = capture[1].trim().to_string();
        if !id.is_empty() && !tokens.ids.contains(&id) {
            tokens.ids.push(id);
        }
    }

    for capture in class_regex().captures_iter(html) {
        // class attributes hold whitespace-separated token lists
        for class in capture[1].split_whitespace() {
            let class = class.to_string();
            if !tokens.classes.contains(&class) {
                tokens.classes.push(class);
            }
        }
    }

    tokens
}

/// Whether a file's generation should receive selector context from the
/// structural HTML
pub fn needs_selector_context(filepath: &str) -> bool {
    let lower = filepath.to_lowercase();
    [".css", ".js", ".jsx", ".ts", ".tsx"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}
