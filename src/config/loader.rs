use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::ProvisionerConfig;
use crate::error::{ErrorCode, ProvisionError, Result};

/// Load configuration from `path` (if any), apply environment overrides and
/// validate the result.
pub async fn load_config(path: Option<&Path>) -> Result<ProvisionerConfig> {
    let mut config = match path {
        Some(path) => load_file(path).await?,
        None => ProvisionerConfig::new(),
    };
    config.merge_env_vars();
    config.validate()?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Parse a TOML configuration file without applying overrides
pub async fn load_file(path: &Path) -> Result<ProvisionerConfig> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        let code = if e.kind() == std::io::ErrorKind::NotFound {
            ErrorCode::CONFIG_NOT_FOUND
        } else {
            ErrorCode::CONFIG_GENERIC
        };
        ProvisionError::config_with_code(
            code,
            format!("Failed to read configuration file {}", path.display()),
        )
        .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        ProvisionError::config_with_code(
            ErrorCode::CONFIG_PARSE_ERROR,
            format!("Failed to parse configuration file {}", path.display()),
        )
        .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("provisioner.toml");
        tokio::fs::write(
            &path,
            "client_id = \"id\"\nbase_dir = \"/opt/job\"\ndocuments_list_rename = \"Project Files\"\n",
        )
        .await
        .unwrap();

        let config = load_file(&path).await.unwrap();
        assert_eq!(config.client_id, "id");
        assert_eq!(config.documents_list_rename, "Project Files");
        assert_eq!(config.template_dir(), Path::new("/opt/job/Templates"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("absent.toml")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        tokio::fs::write(&path, "client_id = [").await.unwrap();
        let err = load_file(&path).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_PARSE_ERROR);
    }
}
