use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::ProvisioningTemplate;
use crate::error::{ErrorCode, ProvisionError, Result};

/// Source of provisioning templates
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    /// Load the template stored under `name`
    async fn get_template(&self, name: &str) -> Result<ProvisioningTemplate>;
}

/// Reads JSON-serialized templates from a directory
pub struct FileSystemTemplateProvider {
    root: PathBuf,
}

impl FileSystemTemplateProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn template_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl TemplateProvider for FileSystemTemplateProvider {
    async fn get_template(&self, name: &str) -> Result<ProvisioningTemplate> {
        let path = self.template_path(name);
        debug!("Reading template from {}", path.display());

        let content = fs::read_to_string(&path).await.map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorCode::TEMPLATE_NOT_FOUND
            } else {
                ErrorCode::TEMPLATE_IO_ERROR
            };
            ProvisionError::template_with_code(
                code,
                format!("Failed to read template '{}'", name),
                Some(path.clone()),
            )
            .with_source(e)
        })?;

        serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(|e| {
            ProvisionError::template_with_code(
                ErrorCode::TEMPLATE_PARSE_ERROR,
                format!("Template '{}' is not a valid provisioning template", name),
                Some(path),
            )
            .with_source(e)
        })
    }
}
