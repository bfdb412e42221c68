//! Authentication for the Anthropic API
//!
//! Supports two authentication methods:
//! 1. Claude Code OAuth token (CLAUDE_CODE_OAUTH_TOKEN)
//! 2. An API key read from a configurable environment variable
//!    (ANTHROPIC_API_KEY by default)

use forge_core::{ForgeError, Result};
use std::env;

/// Get the authentication token for the Anthropic API
///
/// Priority:
/// 1. CLAUDE_CODE_OAUTH_TOKEN (subscription access)
/// 2. The configured API key variable
pub fn get_auth_token(api_key_env: &str) -> Result<String> {
    if let Ok(oauth_token) = env::var("CLAUDE_CODE_OAUTH_TOKEN") {
        tracing::info!("Using Claude Code OAuth token (subscription)");
        return Ok(oauth_token);
    }

    if let Ok(api_key) = env::var(api_key_env) {
        tracing::info!("Using {}", api_key_env);
        return Ok(api_key);
    }

    Err(ForgeError::Auth(format!(
        "No authentication found. Set either:\n\
         - CLAUDE_CODE_OAUTH_TOKEN=sk-ant-oat01-... (for subscription access)\n\
         - {}=sk-ant-api03-...       (for API access)",
        api_key_env
    )))
}
