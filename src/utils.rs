//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::{
    check_ai_credentials, check_git_available, check_github_token, AiCredentialInfo,
};
pub use settings::{get_env_var, get_env_var_or, get_env_vars, Settings};
