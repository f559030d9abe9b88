//! Post-creation hook commands
//!
//! Hooks run one after another in the project directory with the terminal
//! attached, so interactive commands work. A hook that fails is reported but
//! does not fail project creation.

use async_trait::async_trait;
use colored::Colorize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// Split a command line into arguments.
///
/// A `"..."` or `'...'` span with at least one character inside becomes one
/// argument without its quotes; everything else splits on whitespace.
pub fn tokenize(command: &str) -> Vec<String> {
    let chars: Vec<char> = command.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let quote = chars[i];
        if quote == '"' || quote == '\'' {
            let close = chars[i + 1..].iter().position(|&c| c == quote);
            if let Some(len) = close.filter(|&len| len > 0) {
                tokens.push(chars[i + 1..i + 1 + len].iter().collect());
                i += len + 2;
                continue;
            }
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        tokens.push(chars[start..i].iter().collect());
    }

    tokens
}

/// Runs a program and waits for it to exit
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run `argv` in `cwd`, returning its exit code (-1 when killed by a signal)
    async fn run(&self, argv: &[String], cwd: &Path) -> std::io::Result<i32>;
}

/// Executes commands as child processes inheriting stdin, stdout and stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

#[async_trait]
impl ProcessExecutor for SystemExecutor {
    async fn run(&self, argv: &[String], cwd: &Path) -> std::io::Result<i32> {
        let (program, args) = match argv.split_first() {
            Some(split) => split,
            None => return Ok(0),
        };

        let status = TokioCommand::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        Ok(status.code().unwrap_or(-1))
    }
}

/// Result of one hook command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Exited(i32),
    /// The program could not be started
    SpawnFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookResult {
    pub command: String,
    pub outcome: HookOutcome,
}

impl HookResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == HookOutcome::Exited(0)
    }
}

/// Outcome of all hooks of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookReport {
    pub results: Vec<HookResult>,
}

impl HookReport {
    pub fn failures(&self) -> impl Iterator<Item = &HookResult> {
        self.results.iter().filter(|r| !r.succeeded())
    }
}

/// Runs `hooks.created` commands
pub struct LifecycleRunner<E = SystemExecutor> {
    executor: E,
}

impl LifecycleRunner<SystemExecutor> {
    pub fn system() -> Self {
        Self::new(SystemExecutor)
    }
}

impl<E: ProcessExecutor> LifecycleRunner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run `commands` in order in `cwd`, each to completion before the next
    pub async fn run_created_hooks(&self, commands: &[&str], cwd: &Path) -> HookReport {
        let mut report = HookReport::default();

        for command in commands {
            let argv = tokenize(command);
            if argv.is_empty() {
                continue;
            }

            println!("{} {}", "Running:".dimmed(), command.yellow());

            let outcome = match self.executor.run(&argv, cwd).await {
                Ok(code) => HookOutcome::Exited(code),
                Err(e) => HookOutcome::SpawnFailed(e.to_string()),
            };

            match &outcome {
                HookOutcome::Exited(0) => tracing::debug!(%command, "hook finished"),
                HookOutcome::Exited(code) => tracing::warn!(%command, code, "hook exited with non-zero status"),
                HookOutcome::SpawnFailed(error) => tracing::warn!(%command, %error, "hook could not be started"),
            }

            report.results.push(HookResult {
                command: command.to_string(),
                outcome,
            });
        }

        report
    }
}
