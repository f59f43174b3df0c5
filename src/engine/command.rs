use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{ProgressCallback, ProgressEvent, TemplateEngine};
use crate::error::{ErrorCode, ProvisionError, Result};
use crate::site::SiteSession;
use crate::subprocess::{ExitStatus, OutputLine, ProcessCommand, ProcessRunner, StreamSource};
use crate::template::ProvisioningTemplate;

pub const ENV_TEMPLATE_PATH: &str = "PROVISIONER_TEMPLATE_PATH";
pub const ENV_SITE_URL: &str = "PROVISIONER_SITE_URL";
pub const ENV_ACCESS_TOKEN: &str = "PROVISIONER_ACCESS_TOKEN";
pub const ENV_ASSET_DIR: &str = "PROVISIONER_ASSET_DIR";

const TEMPLATE_FILE_NAME: &str = "template.json";

static PROGRESS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s*/\s*(\d+)\s*-\s*(.*?)\s*$").expect("Valid regex pattern")
});

/// Parse `"NN/MM - message"` lines emitted by the engine
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let captures = PROGRESS_LINE.captures(line)?;
    Some(ProgressEvent {
        step: captures[1].parse().ok()?,
        total: captures[2].parse().ok()?,
        message: captures[3].to_string(),
    })
}

/// Hands the template to an external provisioning command.
///
/// The mutated template is written to a scratch directory and the command
/// receives its location, the site URL, the access token and the asset
/// directory through `PROVISIONER_*` environment variables.
pub struct CommandTemplateEngine {
    runner: Arc<dyn ProcessRunner>,
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    working_dir: Option<PathBuf>,
}

impl CommandTemplateEngine {
    pub fn new(runner: Arc<dyn ProcessRunner>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            args,
            timeout: None,
            working_dir: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    async fn write_template(&self, template: &ProvisioningTemplate) -> Result<(TempDir, PathBuf)> {
        let scratch = TempDir::new().map_err(|e| {
            ProvisionError::template_with_code(
                ErrorCode::TEMPLATE_IO_ERROR,
                "Failed to create scratch directory for template",
                None,
            )
            .with_source(e)
        })?;
        let path = scratch.path().join(TEMPLATE_FILE_NAME);

        let json = serde_json::to_vec_pretty(template).map_err(|e| {
            ProvisionError::template_with_code(
                ErrorCode::TEMPLATE_PARSE_ERROR,
                "Failed to serialize template",
                None,
            )
            .with_source(e)
        })?;

        tokio::fs::write(&path, json).await.map_err(|e| {
            ProvisionError::template_with_code(
                ErrorCode::TEMPLATE_IO_ERROR,
                "Failed to write template for the provisioning engine",
                Some(path.clone()),
            )
            .with_source(e)
        })?;

        Ok((scratch, path))
    }
}

/// Log one line of engine output, reporting progress lines to `progress`
fn relay_line(line: &OutputLine, progress: ProgressCallback<'_>) {
    let text = line.text.trim();
    if text.is_empty() {
        return;
    }
    match line.source {
        StreamSource::Stderr => warn!("engine: {}", text),
        StreamSource::Stdout => match parse_progress_line(text) {
            Some(event) => progress(&event),
            None => debug!("engine: {}", text),
        },
    }
}

#[async_trait]
impl TemplateEngine for CommandTemplateEngine {
    async fn apply(
        &self,
        session: &dyn SiteSession,
        template: &ProvisioningTemplate,
        progress: ProgressCallback<'_>,
    ) -> Result<()> {
        // Scratch directory lives until the command has finished.
        let (_scratch, template_path) = self.write_template(template).await?;

        let mut command = ProcessCommand::new(&self.program, &self.args)
            .with_env(ENV_TEMPLATE_PATH, template_path.to_string_lossy())
            .with_env(ENV_SITE_URL, session.site_url())
            .with_env(ENV_ACCESS_TOKEN, session.access_token().secret())
            .with_working_dir(self.working_dir.clone())
            .with_timeout(self.timeout);
        if let Some(connector) = &template.connector {
            command = command.with_env(ENV_ASSET_DIR, connector.base_path().to_string_lossy());
        }
        let display = command.display();

        let (lines, mut received) = mpsc::unbounded_channel();
        let relay = async {
            while let Some(line) = received.recv().await {
                relay_line(&line, progress);
            }
        };
        let (output, ()) = tokio::join!(self.runner.run(command, lines), relay);
        let output = output?;

        let (code, message) = match output.status {
            ExitStatus::Success => return Ok(()),
            ExitStatus::Timeout(limit) => (
                ErrorCode::ENGINE_TIMEOUT,
                format!("Provisioning engine timed out after {limit:?}"),
            ),
            ExitStatus::Signal(sig) => (
                ErrorCode::ENGINE_SIGNAL_RECEIVED,
                format!("Provisioning engine terminated by signal {sig}"),
            ),
            ExitStatus::Error(_) => (
                ErrorCode::ENGINE_FAILED,
                "Provisioning engine exited with failure".to_string(),
            ),
        };
        let mut err = ProvisionError::engine_with_code(code, message, Some(display));
        if let Some(exit) = output.status.code() {
            err = err.with_exit_code(exit);
        }
        Err(err)
    }
}
