use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{ProgressCallback, ProgressEvent, TemplateEngine};
use crate::error::{ErrorCode, ProvisionError, Result};
use crate::site::SiteSession;
use crate::template::ProvisioningTemplate;

/// Records every template it is asked to apply
#[derive(Clone, Default)]
pub struct MockTemplateEngine {
    applied: Arc<Mutex<Vec<(String, ProvisioningTemplate)>>>,
    progress: Arc<Mutex<Vec<ProgressEvent>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockTemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress events to emit on every apply
    pub fn with_progress(self, events: Vec<ProgressEvent>) -> Self {
        *self.progress.lock().unwrap() = events;
        self
    }

    /// Make every apply fail with an engine error
    pub fn failing(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Templates applied so far, paired with the target site URL
    pub fn applied(&self) -> Vec<(String, ProvisioningTemplate)> {
        self.applied.lock().unwrap().clone()
    }

    pub fn last_template(&self) -> Option<ProvisioningTemplate> {
        self.applied
            .lock()
            .unwrap()
            .last()
            .map(|(_, template)| template.clone())
    }
}

#[async_trait]
impl TemplateEngine for MockTemplateEngine {
    async fn apply(
        &self,
        session: &dyn SiteSession,
        template: &ProvisioningTemplate,
        progress: ProgressCallback<'_>,
    ) -> Result<()> {
        self.applied
            .lock()
            .unwrap()
            .push((session.site_url().to_string(), template.clone()));

        let events = self.progress.lock().unwrap().clone();
        for event in &events {
            progress(event);
        }

        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(ProvisionError::engine_with_code(
                ErrorCode::ENGINE_FAILED,
                message,
                Some("mock".to_string()),
            )),
            None => Ok(()),
        }
    }
}
