//! Authenticated access to the target site
//!
//! [`SiteConnector`] hands out one [`SiteSession`] per invocation. The session
//! is released when it is dropped, on success and failure alike.

pub mod auth;
pub mod error;
pub mod mock;
pub mod rest;

pub use auth::{AccessToken, AppOnlyAuthenticator};
pub use error::{SiteError, SiteResult};
pub use mock::{MockSiteConnector, MockSiteState};
pub use rest::{RestSiteConnector, RestSiteSession};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A list row as returned by the site, keyed by internal field name
pub type ListItem = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationLocation {
    TopNavigationBar,
}

impl NavigationLocation {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::TopNavigationBar => "TopNavigationBar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationNode {
    pub title: String,
    pub url: String,
    pub location: NavigationLocation,
}

/// Operations the provisioner performs against one site
#[async_trait]
pub trait SiteSession: Send + Sync {
    fn site_url(&self) -> &str;

    /// Bearer token the external engine reuses for the same site
    fn access_token(&self) -> &AccessToken;

    async fn web_title(&self) -> SiteResult<String>;

    async fn add_navigation_node(&self, node: &NavigationNode) -> SiteResult<()>;

    async fn rename_list(&self, current_title: &str, new_title: &str) -> SiteResult<()>;

    /// First item in `list_title` whose Title equals `item_title`
    async fn find_list_item(&self, list_title: &str, item_title: &str)
        -> SiteResult<Option<ListItem>>;
}

#[async_trait]
pub trait SiteConnector: Send + Sync {
    async fn connect(&self, site_url: &str) -> SiteResult<Box<dyn SiteSession>>;
}
