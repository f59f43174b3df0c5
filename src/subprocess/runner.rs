//! Line-streaming process runner
//!
//! Output is forwarded line by line while the command runs, so callers see
//! engine progress as it happens rather than after exit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::error::ProcessError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ProcessCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: HashMap::new(),
            working_dir: None,
            timeout: None,
        }
    }

    pub fn with_env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.insert(key.to_string(), value.into());
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command line for logs. Environment values are never included.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// One line of command output, without its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub source: StreamSource,
    pub text: String,
}

impl OutputLine {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            source: StreamSource::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            source: StreamSource::Stderr,
            text: text.into(),
        }
    }
}

pub type LineSender = mpsc::UnboundedSender<OutputLine>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
    /// Killed after exceeding the command's timeout
    Timeout(Duration),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub duration: Duration,
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command` to completion, sending every output line to `lines` as
    /// soon as it is read. The sender is dropped before this returns.
    async fn run(&self, command: ProcessCommand, lines: LineSender)
        -> Result<ProcessOutput, ProcessError>;
}

/// Runs commands with `tokio::process`, inheriting the parent environment
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn configure_command(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn map_spawn_error(error: std::io::Error, program: &str) -> ProcessError {
        if error.kind() == std::io::ErrorKind::NotFound {
            ProcessError::CommandNotFound(program.to_string())
        } else {
            ProcessError::Io(error)
        }
    }

    fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            return ExitStatus::Success;
        }
        if let Some(code) = status.code() {
            return ExitStatus::Error(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Signal(signal);
            }
        }
        ExitStatus::Error(1)
    }

    fn log_result(output: &ProcessOutput, command: &ProcessCommand) {
        let shown = command.display();
        match &output.status {
            ExitStatus::Success => {
                debug!("Subprocess finished in {:?}: {}", output.duration, shown)
            }
            ExitStatus::Error(code) => debug!(
                "Subprocess exited with code {} after {:?}: {}",
                code, output.duration, shown
            ),
            ExitStatus::Signal(signal) => warn!(
                "Subprocess terminated by signal {} after {:?}: {}",
                signal, output.duration, shown
            ),
            ExitStatus::Timeout(limit) => {
                warn!("Subprocess killed after {:?} timeout: {}", limit, shown)
            }
        }
    }
}

/// Forward each line of `stream` until EOF
fn forward_lines<R>(stream: R, source: StreamSource, lines: LineSender) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream).lines();
        while let Ok(Some(text)) = reader.next_line().await {
            // Keep draining after the receiver goes away so the child never blocks on a full pipe.
            let _ = lines.send(OutputLine { source, text });
        }
    })
}

async fn stop_readers(readers: Vec<JoinHandle<()>>) {
    for reader in &readers {
        reader.abort();
    }
    for reader in readers {
        let _ = reader.await;
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        command: ProcessCommand,
        lines: LineSender,
    ) -> Result<ProcessOutput, ProcessError> {
        let start = Instant::now();
        debug!("Executing subprocess: {}", command.display());
        if !command.env.is_empty() {
            let mut keys: Vec<&str> = command.env.keys().map(String::as_str).collect();
            keys.sort_unstable();
            trace!("Environment variables set: {}", keys.join(", "));
        }

        let mut child = Self::configure_command(&command)
            .spawn()
            .map_err(|e| Self::map_spawn_error(e, &command.program))?;

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, StreamSource::Stdout, lines.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, StreamSource::Stderr, lines.clone()));
        }
        drop(lines);

        let waited = match command.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };

        let status = match waited {
            Some(Ok(status)) => {
                for reader in readers {
                    let _ = reader.await;
                }
                Self::parse_exit_status(status)
            }
            Some(Err(e)) => {
                stop_readers(readers).await;
                return Err(ProcessError::Io(e));
            }
            None => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out subprocess: {}", e);
                }
                // Descendants may still hold the pipes open.
                stop_readers(readers).await;
                ExitStatus::Timeout(command.timeout.unwrap_or_default())
            }
        };

        let output = ProcessOutput {
            status,
            duration: start.elapsed(),
        };
        Self::log_result(&output, &command);
        Ok(output)
    }
}
