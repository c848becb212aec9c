//! Gemini CLI MCP Server entry point.

use clap::Parser;
use gemini_cli_mcp::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Gemini CLI MCP Server - exposes the Gemini CLI as MCP tools over stdio.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Gemini CLI executable (overrides GEMINI_CLI_PATH)
    #[arg(long)]
    gemini_path: Option<PathBuf>,

    /// Working directory for the Gemini CLI (overrides GEMINI_CLI_CWD)
    #[arg(long)]
    cwd: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries the MCP transport
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(path) = args.gemini_path {
        config = config.with_gemini_path(path);
    }
    if let Some(dir) = args.cwd {
        config = config.with_working_dir(dir);
    }

    gemini_cli_mcp::run_server(config).await
}
