// Shared helpers for tests that stand in a shell script for the Gemini CLI.

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use gemini_cli_mcp::Config;

/// Write an executable `/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to set permissions");
    path
}

/// Configuration pointing at a fake CLI, with a short timeout.
pub fn config_for(script: &Path) -> Config {
    Config::default()
        .with_gemini_path(script)
        .with_timeout(Duration::from_secs(10))
}

pub fn text_of(result: &rmcp::model::CallToolResult) -> String {
    result.content[0]
        .as_text()
        .expect("tool result should be text")
        .text
        .clone()
}
