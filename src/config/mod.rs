//! Provisioner configuration
//!
//! Built once per process: defaults, then an optional TOML file, then
//! environment overrides. Business logic receives the finished
//! [`ProvisionerConfig`] and never reads the environment itself.

pub mod loader;

pub use loader::load_config;

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::enrich::ProjectListSource;
use crate::error::{ErrorCode, ProvisionError, Result};

pub const ENV_CLIENT_ID: &str = "SPO_AppId";
pub const ENV_CLIENT_SECRET: &str = "SPO_AppSecret";
pub const ENV_ROOT_SITE_URL: &str = "RootSiteUrl";
pub const ENV_PROJECT_LIST_TITLE: &str = "ProjectListTitle";
pub const ENV_PROJECT_SITE_URL: &str = "ProjectSiteUrl";
pub const ENV_BASE_DIR: &str = "PROVISIONER_BASE_DIR";

pub const DEFAULT_TEMPLATE_FILE: &str = "ProjectTemplateV2Design.json";
pub const DEFAULT_DOCUMENTS_LIST: &str = "Documents";
pub const DEFAULT_DOCUMENTS_LIST_RENAME: &str = "01. Project Management";

const TEMPLATES_DIR: &str = "Templates";
const FILES_DIR: &str = "Files";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    pub client_id: String,
    pub client_secret: String,
    pub root_site_url: String,
    /// Holds the `Templates` and `Files` directories
    pub base_dir: PathBuf,
    pub template_file: String,
    pub documents_list_title: String,
    pub documents_list_rename: String,
    pub project_site_url: Option<String>,
    pub project_list_title: Option<String>,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Humantime duration, e.g. `"20m"`
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "pwsh".to_string(),
            args: vec!["-NoProfile".to_string(), "-File".to_string(), "Apply-Template.ps1".to_string()],
            timeout: None,
        }
    }
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            root_site_url: String::new(),
            base_dir: default_base_dir(),
            template_file: DEFAULT_TEMPLATE_FILE.to_string(),
            documents_list_title: DEFAULT_DOCUMENTS_LIST.to_string(),
            documents_list_rename: DEFAULT_DOCUMENTS_LIST_RENAME.to_string(),
            project_site_url: None,
            project_list_title: None,
            engine: EngineConfig::default(),
        }
    }
}

impl std::fmt::Debug for ProvisionerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionerConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("root_site_url", &self.root_site_url)
            .field("base_dir", &self.base_dir)
            .field("template_file", &self.template_file)
            .field("documents_list_title", &self.documents_list_title)
            .field("documents_list_rename", &self.documents_list_rename)
            .field("project_site_url", &self.project_site_url)
            .field("project_list_title", &self.project_list_title)
            .field("engine", &self.engine)
            .finish()
    }
}

/// Directory of the running executable, falling back to the working directory
fn default_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl ProvisionerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Empty values are ignored.
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get(ENV_CLIENT_ID) {
            self.client_id = id;
        }
        if let Some(secret) = get(ENV_CLIENT_SECRET) {
            self.client_secret = secret;
        }
        if let Some(url) = get(ENV_ROOT_SITE_URL) {
            self.root_site_url = url;
        }
        if let Some(title) = get(ENV_PROJECT_LIST_TITLE) {
            self.project_list_title = Some(title);
        }
        if let Some(url) = get(ENV_PROJECT_SITE_URL) {
            self.project_site_url = Some(url);
        }
        if let Some(dir) = get(ENV_BASE_DIR) {
            self.base_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            (ENV_CLIENT_ID, &self.client_id),
            (ENV_CLIENT_SECRET, &self.client_secret),
            (ENV_ROOT_SITE_URL, &self.root_site_url),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ProvisionError::config_with_code(
                    ErrorCode::CONFIG_MISSING_REQUIRED,
                    format!("{key} is not configured"),
                ));
            }
        }

        Url::parse(self.root_site_url.trim()).map_err(|e| {
            ProvisionError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("{ENV_ROOT_SITE_URL} '{}' is not a valid URL", self.root_site_url),
            )
            .with_source(e)
        })?;

        if self.engine.program.trim().is_empty() {
            return Err(ProvisionError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "engine.program must not be empty",
            ));
        }
        Ok(())
    }

    pub fn template_dir(&self) -> PathBuf {
        self.base_dir.join(TEMPLATES_DIR)
    }

    pub fn asset_dir(&self) -> PathBuf {
        self.base_dir.join(FILES_DIR)
    }

    /// Enrichment source, only when both site and list are set
    pub fn project_list_source(&self) -> Option<ProjectListSource> {
        let site_url = self.project_site_url.as_deref()?.trim();
        let list_title = self.project_list_title.as_deref()?.trim();
        if site_url.is_empty() || list_title.is_empty() {
            return None;
        }
        Some(ProjectListSource {
            site_url: site_url.to_string(),
            list_title: list_title.to_string(),
        })
    }
}
