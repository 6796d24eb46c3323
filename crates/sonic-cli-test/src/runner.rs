//! Scripted command execution
//!
//! Replaces real processes in handler tests: responses are matched by
//! argument-vector prefix and every invocation is recorded.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sonic_cli_common::shell::command_line;
use sonic_cli_common::{CommandRunner, ExecResult, SonicError, SonicResult};

#[derive(Debug, Clone)]
enum Response {
    Exec(ExecResult),
    LaunchFailure,
}

#[derive(Debug, Default)]
struct State {
    rules: Vec<(Vec<String>, Response)>,
    calls: Vec<Vec<String>>,
}

/// [`CommandRunner`] returning canned results
///
/// Unmatched commands succeed with empty output. When several rules match,
/// the most recently added one wins.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    state: Arc<Mutex<State>>,
}

impl ScriptedRunner {
    /// Create a runner where every command succeeds silently
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix`
    pub fn respond(&self, prefix: &[&str], result: ExecResult) -> &Self {
        self.push_rule(prefix, Response::Exec(result));
        self
    }

    /// Answer commands starting with `prefix` with exit code 0 and `stdout`
    pub fn respond_ok(&self, prefix: &[&str], stdout: &str) -> &Self {
        self.respond(prefix, ExecResult::ok(stdout))
    }

    /// Make commands starting with `prefix` fail to launch
    pub fn fail_launch(&self, prefix: &[&str]) -> &Self {
        self.push_rule(prefix, Response::LaunchFailure);
        self
    }

    /// Every argument vector run so far
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.lock().calls.clone()
    }

    /// Every command run so far, rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|argv| command_line(argv)).collect()
    }

    fn push_rule(&self, prefix: &[&str], response: Response) {
        let prefix = prefix.iter().map(|s| s.to_string()).collect();
        self.state.lock().rules.push((prefix, response));
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, argv: &[String]) -> SonicResult<ExecResult> {
        let mut state = self.state.lock();
        state.calls.push(argv.to_vec());

        let response = state
            .rules
            .iter()
            .rev()
            .find(|(prefix, _)| argv.starts_with(prefix))
            .map(|(_, response)| response.clone());

        match response {
            Some(Response::Exec(result)) => Ok(result),
            Some(Response::LaunchFailure) => Err(SonicError::ShellExec {
                command: command_line(argv),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            }),
            None => Ok(ExecResult::default()),
        }
    }
}
