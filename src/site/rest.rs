//! SharePoint REST implementation of the site traits

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use super::auth::{AccessToken, AppOnlyAuthenticator};
use super::error::{SiteError, SiteResult};
use super::{ListItem, NavigationNode, SiteConnector, SiteSession};

const ODATA_JSON: &str = "application/json;odata=nometadata";

pub struct RestSiteConnector {
    client: reqwest::Client,
    authenticator: Arc<AppOnlyAuthenticator>,
}

impl RestSiteConnector {
    pub fn new(client: reqwest::Client, authenticator: AppOnlyAuthenticator) -> Self {
        Self {
            client,
            authenticator: Arc::new(authenticator),
        }
    }
}

#[async_trait]
impl SiteConnector for RestSiteConnector {
    async fn connect(&self, site_url: &str) -> SiteResult<Box<dyn SiteSession>> {
        let token = self.authenticator.acquire_token(site_url).await?;
        info!("Acquired app-only token for {}", site_url);
        Ok(Box::new(RestSiteSession::new(
            self.client.clone(),
            site_url,
            token,
        )))
    }
}

pub struct RestSiteSession {
    client: reqwest::Client,
    site_url: String,
    token: AccessToken,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WebResponse {
    title: String,
}

#[derive(Deserialize)]
struct ItemsResponse {
    value: Vec<ListItem>,
}

impl RestSiteSession {
    pub fn new(client: reqwest::Client, site_url: &str, token: AccessToken) -> Self {
        Self {
            client,
            site_url: site_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Absolute URL for a site-relative `_api` path
    pub fn api_url(&self, path: &str) -> SiteResult<Url> {
        Ok(Url::parse(&format!("{}/_api/{}", self.site_url, path))?)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.token.secret())
            .header(ACCEPT, HeaderValue::from_static(ODATA_JSON))
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> SiteResult<reqwest::Response> {
        let request = builder.build()?;
        let method = request.method().to_string();
        let url = request.url().to_string();
        debug!("{} {}", method, url);

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SiteError::Status {
            method,
            url,
            status: status.as_u16(),
            body,
        })
    }
}

/// Quote a value for an OData string literal
pub fn odata_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl SiteSession for RestSiteSession {
    fn site_url(&self) -> &str {
        &self.site_url
    }

    fn access_token(&self) -> &AccessToken {
        &self.token
    }

    async fn web_title(&self) -> SiteResult<String> {
        let url = self.api_url("web?$select=Title")?;
        let web: WebResponse = self
            .send(self.request(Method::GET, url))
            .await?
            .json()
            .await
            .map_err(|e| SiteError::invalid_response(format!("web: {e}")))?;
        Ok(web.title)
    }

    async fn add_navigation_node(&self, node: &NavigationNode) -> SiteResult<()> {
        let url = self.api_url(&format!("web/navigation/{}", node.location.endpoint()))?;
        let body = json!({
            "Title": node.title,
            "Url": node.url,
            "IsExternal": true,
        });

        self.send(
            self.request(Method::POST, url)
                .header(CONTENT_TYPE, HeaderValue::from_static(ODATA_JSON))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn rename_list(&self, current_title: &str, new_title: &str) -> SiteResult<()> {
        let url = self.api_url(&format!(
            "web/lists/GetByTitle({})",
            odata_literal(current_title)
        ))?;

        let result = self
            .send(
                self.request(Method::POST, url)
                    .header(CONTENT_TYPE, HeaderValue::from_static(ODATA_JSON))
                    .header("X-HTTP-Method", "MERGE")
                    .header("IF-MATCH", "*")
                    .json(&json!({ "Title": new_title })),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(SiteError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(SiteError::ListNotFound(current_title.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn find_list_item(
        &self,
        list_title: &str,
        item_title: &str,
    ) -> SiteResult<Option<ListItem>> {
        let mut url = self.api_url(&format!(
            "web/lists/GetByTitle({})/items",
            odata_literal(list_title)
        ))?;
        url.query_pairs_mut()
            .append_pair("$filter", &format!("Title eq {}", odata_literal(item_title)))
            .append_pair("$top", "1");

        let items: ItemsResponse = match self.send(self.request(Method::GET, url)).await {
            Ok(response) => response
                .json()
                .await
                .map_err(|e| SiteError::invalid_response(format!("list items: {e}")))?,
            Err(SiteError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(SiteError::ListNotFound(list_title.to_string()))
            }
            Err(e) => return Err(e),
        };

        Ok(items.value.into_iter().next())
    }
}
