use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File-system asset connector handed to the provisioning engine.
///
/// The engine resolves relative asset references in the template against
/// `root`/`container`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileSystemConnector {
    pub root: PathBuf,
    #[serde(default)]
    pub container: String,
}

impl FileSystemConnector {
    pub fn new(root: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            container: container.into(),
        }
    }

    /// Directory assets are read from
    pub fn base_path(&self) -> PathBuf {
        if self.container.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&self.container)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_path_without_container() {
        let connector = FileSystemConnector::new("/srv/job/Files", "");
        assert_eq!(connector.base_path(), PathBuf::from("/srv/job/Files"));
    }

    #[test]
    fn test_base_path_with_container() {
        let connector = FileSystemConnector::new("/srv/job/Files", "branding");
        assert_eq!(
            connector.base_path(),
            PathBuf::from("/srv/job/Files/branding")
        );
    }
}
