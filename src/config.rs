//! Process-wide configuration and per-call command resolution.

use crate::error::{GeminiError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Command looked up on the search path when no custom executable is configured.
pub const DEFAULT_COMMAND: &str = "gemini";

/// Environment variable naming a custom Gemini CLI executable.
pub const ENV_GEMINI_PATH: &str = "GEMINI_CLI_PATH";

/// Environment variable naming a custom working directory for the CLI.
pub const ENV_GEMINI_CWD: &str = "GEMINI_CLI_CWD";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration captured once at startup and shared by every invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Custom executable; `None` means look up [`DEFAULT_COMMAND`].
    pub gemini_path: Option<PathBuf>,

    /// Custom working directory; `None` inherits the server's cwd.
    pub working_dir: Option<PathBuf>,

    /// Search path used to locate the default command.
    pub search_path: Option<OsString>,

    pub timeout: Duration,
}

/// An executable and directory that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub program: PathBuf,
    pub working_dir: Option<PathBuf>,
    /// Whether `program` came from a custom path rather than the search path.
    pub custom: bool,
}

impl Config {
    /// Build a configuration from `GEMINI_CLI_PATH`, `GEMINI_CLI_CWD` and `PATH`.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var_os(key))
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Values are kept as `OsString`, so non-UTF-8 paths are honoured.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !is_blank(v));

        Self {
            gemini_path: non_empty(ENV_GEMINI_PATH).map(PathBuf::from),
            working_dir: non_empty(ENV_GEMINI_CWD).map(PathBuf::from),
            search_path: lookup("PATH"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_gemini_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.gemini_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the executable, then the working directory.
    ///
    /// Only read-only filesystem probes happen here; nothing is spawned.
    pub fn resolve(&self) -> Result<ResolvedCommand> {
        let (program, custom) = match &self.gemini_path {
            Some(path) => (validate_custom_path(path)?, true),
            None => (self.find_default_command()?, false),
        };

        let working_dir = match &self.working_dir {
            Some(dir) => Some(validate_working_dir(dir)?),
            None => None,
        };

        Ok(ResolvedCommand {
            program,
            working_dir,
            custom,
        })
    }

    fn find_default_command(&self) -> Result<PathBuf> {
        which::which_in(DEFAULT_COMMAND, self.search_path.as_ref(), Path::new("."))
            .map_err(|_| GeminiError::GeminiNotFound)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_path: None,
            working_dir: None,
            search_path: std::env::var_os("PATH"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn is_blank(value: &OsStr) -> bool {
    value.to_str().is_some_and(|v| v.trim().is_empty())
}

fn validate_custom_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(GeminiError::CustomPathNotFound(path.display().to_string()));
    }
    if !is_executable(path) {
        return Err(GeminiError::CustomPathNotExecutable(
            path.display().to_string(),
        ));
    }
    Ok(path.to_path_buf())
}

fn validate_working_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        return Err(GeminiError::WorkingDirNotFound(dir.display().to_string()));
    }
    if !dir.is_dir() {
        return Err(GeminiError::WorkingDirNotADirectory(
            dir.display().to_string(),
        ));
    }
    Ok(dir.to_path_buf())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
