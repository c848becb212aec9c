//! MCP Server implementation for the Gemini CLI.

use crate::config::Config;
use crate::gemini::{execute_gemini, into_tool_text, list_models, GeminiRequest, DEFAULT_MODEL};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars::{self, JsonSchema};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServiceExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Input parameters for the call_gemini tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters for invoking the Gemini CLI")]
pub struct CallGeminiInput {
    #[schemars(description = "The prompt to send to Gemini")]
    pub prompt: String,

    #[schemars(description = "Model to use (default: gemini-2.5-flash)")]
    #[serde(default = "default_model")]
    pub model: String,
}

impl From<CallGeminiInput> for GeminiRequest {
    fn from(input: CallGeminiInput) -> Self {
        GeminiRequest::new(input.prompt).with_model(input.model)
    }
}

/// The Gemini CLI MCP Server.
#[derive(Clone)]
pub struct GeminiServer {
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl GeminiServer {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "call_gemini",
        description = "Call Gemini CLI with the given prompt and model. Returns the CLI output, or a message starting with \"Error: \" on failure."
    )]
    pub async fn call_gemini(
        &self,
        Parameters(input): Parameters<CallGeminiInput>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(model = %input.model, "call_gemini");

        let request = GeminiRequest::from(input);
        let result = execute_gemini(&self.config, &request).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "call_gemini failed");
        }

        Ok(CallToolResult::success(vec![Content::text(into_tool_text(
            result,
        ))]))
    }

    #[tool(name = "list_gemini_models", description = "List available Gemini models.")]
    pub async fn list_gemini_models(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(list_models())]))
    }
}

impl Default for GeminiServer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[tool_handler]
impl rmcp::ServerHandler for GeminiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Gemini CLI MCP Server - call_gemini runs the Gemini CLI with a prompt, list_gemini_models lists supported models".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Create and run the MCP server over stdio transport.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        gemini_path = ?config.gemini_path,
        working_dir = ?config.working_dir,
        "Starting Gemini CLI MCP Server..."
    );

    let server = GeminiServer::new(config);
    let service = server.serve(rmcp::transport::stdio()).await?;

    tracing::info!("Gemini CLI MCP Server is running");

    service.waiting().await?;

    tracing::info!("Gemini CLI MCP Server shutting down");
    Ok(())
}
