//! Gemini CLI execution module.

use crate::config::{Config, ResolvedCommand};
use crate::error::{GeminiError, Result};
use std::io::ErrorKind;
use std::process::{Output, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Models advertised by `list_gemini_models`.
pub const SUPPORTED_MODELS: &[&str] = &["gemini-2.5-pro", "gemini-2.5-flash"];

/// A single prompt for the Gemini CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiRequest {
    pub prompt: String,
    pub model: String,
}

impl GeminiRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Build the CLI invocation as an argument vector.
///
/// The prompt is a single argv entry and never passes through a shell.
pub fn build_command(resolved: &ResolvedCommand, request: &GeminiRequest) -> Command {
    let mut cmd = Command::new(&resolved.program);
    cmd.arg("-m")
        .arg(&request.model)
        .arg("-p")
        .arg(&request.prompt)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group, so a timeout can take down everything the CLI started.
    #[cfg(unix)]
    cmd.process_group(0);

    if let Some(dir) = &resolved.working_dir {
        cmd.current_dir(dir);
    }

    cmd
}

/// Run the Gemini CLI once and return its stdout.
pub async fn execute_gemini(config: &Config, request: &GeminiRequest) -> Result<String> {
    let resolved = config.resolve()?;

    tracing::debug!(
        program = %resolved.program.display(),
        cwd = ?resolved.working_dir,
        model = %request.model,
        prompt_len = request.prompt.len(),
        "Spawning gemini"
    );

    let mut child = build_command(&resolved, request)
        .spawn()
        .map_err(|e| spawn_error(e, &resolved))?;
    let pid = child.id();

    let output = match timeout(config.timeout, collect_output(&mut child)).await {
        Ok(output) => output?,
        Err(_) => {
            // Kill the group, then reap the child, so no process outlives the call.
            if let Some(pid) = pid {
                kill_process_group(pid);
            }
            let _ = child.kill().await;
            tracing::warn!(
                timeout = ?config.timeout,
                pid = ?pid,
                "Gemini CLI timed out, process group killed"
            );
            return Err(GeminiError::ProcessTimeout(config.timeout));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::warn!(code = ?output.status.code(), "Gemini CLI exited with failure");
        return Err(GeminiError::ProcessFailed {
            code: output.status.code(),
            stderr,
        });
    }

    tracing::debug!(stdout_len = output.stdout.len(), "Gemini CLI finished");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Comma separated list of [`SUPPORTED_MODELS`].
pub fn list_models() -> String {
    SUPPORTED_MODELS.join(", ")
}

/// Collapse an invocation outcome into the text returned to tool callers.
pub fn into_tool_text(result: Result<String>) -> String {
    match result {
        Ok(output) => output,
        Err(e) => e.to_tool_text(),
    }
}

fn spawn_error(err: std::io::Error, resolved: &ResolvedCommand) -> GeminiError {
    if err.kind() != ErrorKind::NotFound {
        return GeminiError::Spawn(err);
    }
    if resolved.custom {
        GeminiError::CustomCliNotFound(resolved.program.display().to_string())
    } else {
        GeminiError::GeminiNotFound
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // ESRCH just means the group is already gone.
    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        tracing::debug!(pid = %pid, error = %e, "killpg failed");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

/// Drain stdout and stderr while waiting, so a full pipe cannot stall the child.
async fn collect_output(child: &mut Child) -> Result<Output> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (status, stdout, stderr) =
        tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))?;

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::path::PathBuf;
    use std::time::Duration;

    fn resolved(working_dir: Option<&str>) -> ResolvedCommand {
        ResolvedCommand {
            program: PathBuf::from("/usr/local/bin/gemini"),
            working_dir: working_dir.map(PathBuf::from),
            custom: true,
        }
    }

    #[test]
    fn test_request_defaults_model() {
        let request = GeminiRequest::new("hello");
        assert_eq!(request.model, DEFAULT_MODEL);
        assert_eq!(request.with_model("gemini-2.5-pro").model, "gemini-2.5-pro");
    }

    #[test]
    fn test_build_command_argument_vector() {
        let request = GeminiRequest::new("say \"hi\"; rm -rf / && echo $HOME");
        let cmd = build_command(&resolved(None), &request);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), OsStr::new("/usr/local/bin/gemini"));
        let args: Vec<&OsStr> = std_cmd.get_args().collect();
        assert_eq!(
            args,
            vec![
                OsStr::new("-m"),
                OsStr::new(DEFAULT_MODEL),
                OsStr::new("-p"),
                OsStr::new("say \"hi\"; rm -rf / && echo $HOME"),
            ]
        );
        assert_eq!(std_cmd.get_current_dir(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_kill_process_group_tolerates_missing_group() {
        // Far above any default pid_max, so no such group exists.
        kill_process_group(0x3fff_fff0);
    }

    #[test]
    fn test_build_command_applies_working_dir() {
        let cmd = build_command(&resolved(Some("/srv/project")), &GeminiRequest::new(""));
        assert_eq!(
            cmd.as_std().get_current_dir(),
            Some(std::path::Path::new("/srv/project"))
        );
    }

    #[test]
    fn test_list_models() {
        assert_eq!(list_models(), "gemini-2.5-pro, gemini-2.5-flash");
    }

    #[test]
    fn test_into_tool_text() {
        assert_eq!(into_tool_text(Ok(String::new())), "");
        assert_eq!(into_tool_text(Ok("answer\n".into())), "answer\n");
        assert_eq!(
            into_tool_text(Err(GeminiError::ProcessTimeout(Duration::from_secs(60)))),
            "Error: Gemini CLI timed out after 60s"
        );
    }

    #[test]
    fn test_spawn_error_mapping() {
        let not_found = || std::io::Error::from(ErrorKind::NotFound);

        let custom = spawn_error(not_found(), &resolved(None));
        assert_eq!(
            custom.to_tool_text(),
            "Error: Custom Gemini CLI not found: /usr/local/bin/gemini"
        );

        let mut default = resolved(None);
        default.custom = false;
        assert!(matches!(
            spawn_error(not_found(), &default),
            GeminiError::GeminiNotFound
        ));

        let denied = spawn_error(
            std::io::Error::from(ErrorKind::PermissionDenied),
            &default,
        );
        assert!(matches!(denied, GeminiError::Spawn(_)));
    }
}
