//! External command execution for SONiC CLI utilities.
//!
//! Commands are always launched from an argument vector, never through
//! `/bin/sh`, so user-supplied values (container names, PIDs, program
//! names) cannot inject shell syntax. [`shellquote`] is only used to render
//! a command for display and log messages.
//!
//! # Example
//!
//! ```ignore
//! use sonic_cli_common::shell::{self, argv, SYSTEMCTL_CMD};
//!
//! let cmd = argv([SYSTEMCTL_CMD, "restart", "rsyslog-config"]);
//! let result = shell::exec(&cmd).await?;
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{SonicError, SonicResult};

/// The `ip` utility used for Linux network-state queries.
pub const IP_CMD: &str = "ip";

/// The `systemctl` utility used to restart host services.
pub const SYSTEMCTL_CMD: &str = "systemctl";

/// The `docker` client used for container operations.
pub const DOCKER_CMD: &str = "docker";

/// The `kill` utility used for signal delivery.
pub const KILL_CMD: &str = "kill";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Arguments made only of these characters are displayed unquoted.
static SHELL_SAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// This function wraps the string in double quotes and escapes any
/// characters that have special meaning inside double quotes:
/// - `$` (variable expansion)
/// - `` ` `` (command substitution)
/// - `"` (quote termination)
/// - `\` (escape character)
/// - newline (command termination)
///
/// # Example
///
/// ```
/// use sonic_cli_common::shell::shellquote;
///
/// assert_eq!(shellquote("simple"), "\"simple\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// assert_eq!(shellquote("with\"quote"), "\"with\\\"quote\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Renders an argument vector as a copy-pasteable command line.
///
/// Plain arguments are kept as-is, everything else goes through
/// [`shellquote`].
///
/// ```
/// use sonic_cli_common::shell::{argv, command_line};
///
/// let cmd = argv(["docker", "ps", "--format", "{{.Names}}"]);
/// assert_eq!(command_line(&cmd), "docker ps --format \"{{.Names}}\"");
/// ```
pub fn command_line(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if SHELL_SAFE_RE.is_match(arg) {
                arg.clone()
            } else {
                shellquote(arg)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds an owned argument vector from string-like parts.
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}

/// Result of a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The captured stdout output.
    pub stdout: String,
    /// The captured stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Creates a successful result carrying `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Creates a failed result with the given exit code and stderr text.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes a command given as an argument vector.
///
/// # Returns
///
/// * `Ok(ExecResult)` - The command execution result, whatever its exit code
/// * `Err(SonicError)` - If the command could not be spawned
pub async fn exec(argv: &[String]) -> SonicResult<ExecResult> {
    let cmd = command_line(argv);
    tracing::debug!(command = %cmd, "Executing command");

    let (program, args) = argv
        .split_first()
        .ok_or_else(|| SonicError::internal("empty command line"))?;

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| SonicError::ShellExec {
            command: cmd.clone(),
            source: e,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    let result = ExecResult {
        exit_code,
        stdout,
        stderr,
    };

    if result.success() {
        tracing::trace!(command = %cmd, exit_code = exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %cmd,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Converts a non-zero [`ExecResult`] into [`SonicError::ShellCommandFailed`].
pub fn check(argv: &[String], result: ExecResult) -> SonicResult<String> {
    if result.success() {
        Ok(result.stdout)
    } else {
        Err(SonicError::ShellCommandFailed {
            command: command_line(argv),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}

/// Process-execution seam used by command handlers.
///
/// Production code uses [`SystemRunner`]; tests substitute a scripted
/// implementation.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `argv` to completion and reports its output and exit code.
    ///
    /// Only a failure to launch the program is an `Err`.
    async fn run(&self, argv: &[String]) -> SonicResult<ExecResult>;
}

/// [`CommandRunner`] backed by real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, argv: &[String]) -> SonicResult<ExecResult> {
        exec(argv).await
    }
}
