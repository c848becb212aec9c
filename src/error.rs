//! Error types for the Gemini CLI MCP server.

use std::time::Duration;
use thiserror::Error;

/// Prefix every failure carries once it crosses the tool boundary.
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Custom Gemini CLI path not found: {0}")]
    CustomPathNotFound(String),

    #[error("Custom Gemini CLI path is not executable: {0}")]
    CustomPathNotExecutable(String),

    #[error("Custom working directory not found: {0}")]
    WorkingDirNotFound(String),

    #[error("Custom working directory is not a directory: {0}")]
    WorkingDirNotADirectory(String),

    #[error("Custom Gemini CLI not found: {0}")]
    CustomCliNotFound(String),

    #[error("Gemini CLI not found. Please install it first.")]
    GeminiNotFound,

    /// Non-zero exit. Renders as the captured stderr, untouched.
    #[error("{stderr}")]
    ProcessFailed { code: Option<i32>, stderr: String },

    #[error("{0}")]
    Spawn(#[from] std::io::Error),

    #[error("Gemini CLI timed out after {0:?}")]
    ProcessTimeout(Duration),
}

impl GeminiError {
    /// True for failures detected before any process was spawned.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GeminiError::CustomPathNotFound(_)
                | GeminiError::CustomPathNotExecutable(_)
                | GeminiError::WorkingDirNotFound(_)
                | GeminiError::WorkingDirNotADirectory(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GeminiError::ProcessTimeout(_))
    }

    /// Render the error the way tool callers see it.
    pub fn to_tool_text(&self) -> String {
        format!("{ERROR_PREFIX}{self}")
    }
}

pub type Result<T> = std::result::Result<T, GeminiError>;
