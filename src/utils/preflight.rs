//! Preflight validation checks for early failure detection
//!
//! Commands call these before any git or network work so a missing
//! credential or tool fails fast with a clear message.

use std::process::Command;

use anyhow::{bail, Result};

use crate::ai::claude::DEFAULT_MODEL;
use crate::utils::settings::{get_env_var, get_env_vars};

/// Result of AI credential validation
#[derive(Debug)]
pub struct AiCredentialInfo {
    /// The model that will be used
    pub model: String,
}

/// Validate generation credentials are available before processing
///
/// Lightweight: reads environment variables and the settings file without
/// creating a client.
pub fn check_ai_credentials(model_override: Option<&str>) -> Result<AiCredentialInfo> {
    let model = model_override
        .map(String::from)
        .or_else(|| get_env_var("ANTHROPIC_MODEL").ok())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    get_env_vars(&["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"]).map_err(|_| {
        anyhow::anyhow!(
            "Claude API key not found.\n\
             Set one of these environment variables:\n\
             - CLAUDE_API_KEY\n\
             - ANTHROPIC_API_KEY\n\
             Get your API key from: https://console.anthropic.com/"
        )
    })?;

    Ok(AiCredentialInfo { model })
}

/// Resolve the GitHub token from an explicit value or `GITHUB_TOKEN`
pub fn check_github_token(explicit: Option<&str>) -> Result<String> {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        return Ok(token.to_string());
    }
    get_env_var("GITHUB_TOKEN").map_err(|_| {
        anyhow::anyhow!(
            "GitHub access token not found.\n\
             Pass --token or set the GITHUB_TOKEN environment variable."
        )
    })
}

/// Validate the `git` executable is installed and in PATH
///
/// Cloning shells out to git; reading commits does not.
pub fn check_git_available() -> Result<()> {
    match Command::new("git").arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        _ => bail!(
            "git is not installed or not in PATH.\n\
             Please install it from https://git-scm.com/"
        ),
    }
}
