//! In-memory site used by tests and dry runs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::auth::AccessToken;
use super::error::{SiteError, SiteResult};
use super::{ListItem, NavigationNode, SiteConnector, SiteSession};

/// Observable state shared by a mock connector and its sessions
#[derive(Debug, Default)]
pub struct MockSiteState {
    pub web_title: String,
    pub fail_connect: bool,
    pub fail_rename: bool,
    pub fail_list_lookup: bool,
    /// Keyed by (list title, item title)
    pub list_items: HashMap<(String, String), ListItem>,
    pub navigation_nodes: Vec<NavigationNode>,
    pub renamed_lists: Vec<(String, String)>,
    pub connections: usize,
    pub open_sessions: usize,
}

#[derive(Clone, Default)]
pub struct MockSiteConnector {
    state: Arc<Mutex<MockSiteState>>,
}

impl MockSiteConnector {
    pub fn new(web_title: &str) -> Self {
        let connector = Self::default();
        connector.state.lock().unwrap().web_title = web_title.to_string();
        connector
    }

    /// Mutate the shared state, e.g. to inject failures
    pub fn configure(&self, f: impl FnOnce(&mut MockSiteState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn with_list_item(self, list_title: &str, item_title: &str, item: ListItem) -> Self {
        self.state
            .lock()
            .unwrap()
            .list_items
            .insert((list_title.to_string(), item_title.to_string()), item);
        self
    }

    pub fn navigation_nodes(&self) -> Vec<NavigationNode> {
        self.state.lock().unwrap().navigation_nodes.clone()
    }

    pub fn renamed_lists(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().renamed_lists.clone()
    }

    pub fn connections(&self) -> usize {
        self.state.lock().unwrap().connections
    }

    pub fn open_sessions(&self) -> usize {
        self.state.lock().unwrap().open_sessions
    }
}

#[async_trait]
impl SiteConnector for MockSiteConnector {
    async fn connect(&self, site_url: &str) -> SiteResult<Box<dyn SiteSession>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_connect {
            return Err(SiteError::Authentication {
                status: 401,
                body: "invalid_client (mock)".to_string(),
            });
        }
        state.connections += 1;
        state.open_sessions += 1;

        Ok(Box::new(MockSiteSession {
            site_url: site_url.trim_end_matches('/').to_string(),
            token: AccessToken::new("mock-token"),
            state: Arc::clone(&self.state),
        }))
    }
}

pub struct MockSiteSession {
    site_url: String,
    token: AccessToken,
    state: Arc<Mutex<MockSiteState>>,
}

impl Drop for MockSiteSession {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.open_sessions = state.open_sessions.saturating_sub(1);
        }
    }
}

#[async_trait]
impl SiteSession for MockSiteSession {
    fn site_url(&self) -> &str {
        &self.site_url
    }

    fn access_token(&self) -> &AccessToken {
        &self.token
    }

    async fn web_title(&self) -> SiteResult<String> {
        Ok(self.state.lock().unwrap().web_title.clone())
    }

    async fn add_navigation_node(&self, node: &NavigationNode) -> SiteResult<()> {
        self.state
            .lock()
            .unwrap()
            .navigation_nodes
            .push(node.clone());
        Ok(())
    }

    async fn rename_list(&self, current_title: &str, new_title: &str) -> SiteResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_rename {
            return Err(SiteError::ListNotFound(current_title.to_string()));
        }
        state
            .renamed_lists
            .push((current_title.to_string(), new_title.to_string()));
        Ok(())
    }

    async fn find_list_item(
        &self,
        list_title: &str,
        item_title: &str,
    ) -> SiteResult<Option<ListItem>> {
        let state = self.state.lock().unwrap();
        if state.fail_list_lookup {
            return Err(SiteError::Status {
                method: "GET".to_string(),
                url: format!("{}/_api/web/lists", self.site_url),
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        Ok(state
            .list_items
            .get(&(list_title.to_string(), item_title.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_release_is_tracked() {
        let connector = MockSiteConnector::new("Project 1234");
        {
            let session = connector.connect("https://x.example/sites/a/").await.unwrap();
            assert_eq!(session.site_url(), "https://x.example/sites/a");
            assert_eq!(session.web_title().await.unwrap(), "Project 1234");
            assert_eq!(connector.open_sessions(), 1);
        }
        assert_eq!(connector.open_sessions(), 0);
        assert_eq!(connector.connections(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let connector = MockSiteConnector::new("x");
        connector.configure(|s| s.fail_connect = true);
        assert!(connector.connect("https://x.example/sites/a").await.is_err());
        assert_eq!(connector.open_sessions(), 0);
    }
}
