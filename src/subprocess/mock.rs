use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{ExitStatus, LineSender, OutputLine, ProcessCommand, ProcessOutput, ProcessRunner};

/// Canned outcome for one run of [`MockProcessRunner`]
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    lines: Vec<OutputLine>,
    status: ExitStatus,
}

impl ScriptedRun {
    pub fn success() -> Self {
        Self {
            lines: Vec::new(),
            status: ExitStatus::Success,
        }
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.lines.push(OutputLine::stdout(text));
        self
    }

    pub fn stderr(mut self, text: &str) -> Self {
        self.lines.push(OutputLine::stderr(text));
        self
    }

    pub fn exits_with(mut self, status: ExitStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Default)]
struct MockState {
    script: VecDeque<ScriptedRun>,
    calls: Vec<ProcessCommand>,
}

/// Replays scripted runs in order and records every command it receives
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, run: ScriptedRun) -> &Self {
        self.state.lock().unwrap().script.push_back(run);
        self
    }

    pub fn calls(&self) -> Vec<ProcessCommand> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(
        &self,
        command: ProcessCommand,
        lines: LineSender,
    ) -> Result<ProcessOutput, ProcessError> {
        let next = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(command.clone());
            state.script.pop_front()
        };
        let run = next.ok_or_else(|| ProcessError::Unscripted(command.display()))?;

        for line in run.lines {
            let _ = lines.send(line);
        }
        Ok(ProcessOutput {
            status: run.status,
            duration: Duration::from_millis(1),
        })
    }
}
