//! Gemini CLI MCP Server - exposes the Gemini CLI as MCP tools.
//!
//! `call_gemini` runs the CLI with a prompt and model and returns its output;
//! `list_gemini_models` returns the supported model identifiers.

pub mod config;
pub mod error;
pub mod gemini;
pub mod server;

pub use config::{Config, ResolvedCommand};
pub use error::{GeminiError, Result};
pub use gemini::{execute_gemini, list_models, GeminiRequest, DEFAULT_MODEL};
pub use server::{run_server, CallGeminiInput, GeminiServer};
