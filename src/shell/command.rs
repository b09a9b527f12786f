//! Child process execution with masked output.

use crate::error::{MaskError, Result};
use crate::masker::MaskedWriter;
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Exit code to propagate to our own caller.
    ///
    /// A child killed by a signal is reported as failure (1).
    pub fn propagated_code(&self) -> i32 {
        self.exit_code.unwrap_or(1)
    }
}

/// A program invocation, run directly without a shell.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// Program to execute (looked up on PATH).
    pub program: String,

    /// Arguments passed verbatim.
    pub args: Vec<String>,

    /// Extra environment variables, merged over the inherited environment.
    pub env: BTreeMap<String, String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Build a spec from `program` and its arguments.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Display form for error messages. Never includes env values.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(&self.env);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::inherit());
        cmd
    }

    fn spawn_failed(&self, err: io::Error) -> MaskError {
        tracing::debug!(error = %err, program = %self.program, "failed to spawn");
        MaskError::CommandFailed {
            command: self.display(),
            code: None,
        }
    }
}

/// Run a command with stdout and stderr inherited, without masking.
pub fn execute_plain(spec: &CommandSpec) -> Result<CommandResult> {
    let start = Instant::now();
    let mut cmd = spec.command();
    cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());

    let mut child = cmd.spawn().map_err(|e| spec.spawn_failed(e))?;
    wait(spec, &mut child, start)
}

/// Run a command, copying its stdout and stderr through masked writers.
///
/// One reader thread per pipe forwards raw chunks as they arrive, so
/// interactive output is not held back until a newline. Returns after the
/// child exits and both pipes are drained; the caller is responsible for
/// flushing or closing the masker afterwards.
pub fn execute_masked(
    spec: &CommandSpec,
    stdout: MaskedWriter,
    stderr: MaskedWriter,
) -> Result<CommandResult> {
    let start = Instant::now();
    let mut cmd = spec.command();
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| spec.spawn_failed(e))?;

    let readers = [
        child.stdout.take().map(|pipe| forward(pipe, stdout, "stdout")),
        child.stderr.take().map(|pipe| forward(pipe, stderr, "stderr")),
    ];

    let result = wait(spec, &mut child, start);

    for handle in readers.into_iter().flatten() {
        match handle.join() {
            Ok(Ok(bytes)) => tracing::trace!(bytes, "pipe drained"),
            Ok(Err(err)) => tracing::warn!(error = %err, "failed to forward child output"),
            Err(_) => tracing::warn!("output forwarding thread panicked"),
        }
    }

    result
}

fn forward<R>(
    mut pipe: R,
    mut writer: MaskedWriter,
    name: &'static str,
) -> thread::JoinHandle<io::Result<u64>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let copied = io::copy(&mut pipe, &mut writer);
        tracing::trace!(pipe = name, "child closed pipe");
        copied
    })
}

fn wait(spec: &CommandSpec, child: &mut Child, start: Instant) -> Result<CommandResult> {
    let status = child.wait().map_err(|_| MaskError::CommandFailed {
        command: spec.display(),
        code: None,
    })?;

    let duration = start.elapsed();
    tracing::debug!(code = ?status.code(), ?duration, "command finished");

    Ok(CommandResult {
        exit_code: status.code(),
        duration,
        success: status.success(),
    })
}
