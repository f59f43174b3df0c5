//! Applying a provisioning template to a live site
//!
//! Template application is delegated to an external engine. The crate talks
//! to it through [`TemplateEngine`]; [`CommandTemplateEngine`] drives an
//! installed provisioning command.

pub mod command;
pub mod mock;

pub use command::{parse_progress_line, CommandTemplateEngine};
pub use mock::MockTemplateEngine;

use async_trait::async_trait;

use crate::error::Result;
use crate::site::SiteSession;
use crate::template::ProvisioningTemplate;

/// One step reported by the engine while applying a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub step: usize,
    pub total: usize,
    pub message: String,
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:02} - {}", self.step, self.total, self.message)
    }
}

pub type ProgressCallback<'a> = &'a (dyn Fn(&ProgressEvent) + Send + Sync);

#[async_trait]
pub trait TemplateEngine: Send + Sync {
    /// Apply `template` to the session's site, reporting each step
    async fn apply(
        &self,
        session: &dyn SiteSession,
        template: &ProvisioningTemplate,
        progress: ProgressCallback<'_>,
    ) -> Result<()>;
}
