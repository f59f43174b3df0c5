//! App-only (client credential) authentication against SharePoint Online
//!
//! The site is probed anonymously to learn the tenant realm from its
//! `WWW-Authenticate` challenge, then the access control service issues a
//! token for the site's host.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::error::{SiteError, SiteResult};

/// Well-known principal id of SharePoint Online
pub const SHAREPOINT_PRINCIPAL: &str = "00000003-0000-0ff1-ce00-000000000000";

const DEFAULT_ACS_ENDPOINT: &str = "https://accounts.accesscontrol.windows.net";

static REALM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)realm="([^"]+)""#).expect("valid realm regex"));

/// Bearer token. The value is kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct AppOnlyAuthenticator {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    acs_endpoint: String,
}

impl AppOnlyAuthenticator {
    pub fn new(
        client: reqwest::Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            acs_endpoint: DEFAULT_ACS_ENDPOINT.to_string(),
        }
    }

    /// Point token requests at a different access control service
    pub fn with_acs_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.acs_endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Acquire an app-only token for the site's host
    pub async fn acquire_token(&self, site_url: &str) -> SiteResult<AccessToken> {
        let site = Url::parse(site_url)?;
        let realm = self.discover_realm(&site).await?;
        let host = site
            .host_str()
            .ok_or_else(|| SiteError::invalid_response(format!("{site_url} has no host")))?;

        let token_url = format!("{}/{}/tokens/OAuth/2", self.acs_endpoint, realm);
        let client_id = format!("{}@{}", self.client_id, realm);
        let resource = resource_for(host, &realm);

        debug!("Requesting app-only token for {} from {}", host, token_url);

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("resource", resource.as_str()),
        ];

        let response = self.client.post(&token_url).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteError::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| SiteError::invalid_response(format!("token response: {e}")))?;

        Ok(AccessToken::new(payload.access_token))
    }

    async fn discover_realm(&self, site: &Url) -> SiteResult<String> {
        let probe = Url::parse(&format!(
            "{}/_vti_bin/client.svc",
            site.as_str().trim_end_matches('/')
        ))?;

        let response = self
            .client
            .get(probe)
            .header(AUTHORIZATION, "Bearer")
            .send()
            .await?;

        response
            .headers()
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(parse_realm)
            .ok_or_else(|| SiteError::RealmNotFound(site.to_string()))
    }
}

/// Extract `realm="..."` from a `WWW-Authenticate` challenge
pub fn parse_realm(header: &str) -> Option<String> {
    REALM_PATTERN
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|realm| !realm.is_empty())
}

/// Resource identifier the access control service expects for a host
pub fn resource_for(host: &str, realm: &str) -> String {
    format!("{SHAREPOINT_PRINCIPAL}/{host}@{realm}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_realm_from_challenge() {
        let header = r#"Bearer realm="927c0756-779d-44e0-baa5-8f0ea58bd36e",client_id="00000003-0000-0ff1-ce00-000000000000",trusted_issuers="00000001-0000-0000-c000-000000000000@*",authorization_uri="https://login.windows.net/common/oauth2/authorize""#;
        assert_eq!(
            parse_realm(header).as_deref(),
            Some("927c0756-779d-44e0-baa5-8f0ea58bd36e")
        );
    }

    #[test]
    fn test_parse_realm_missing() {
        assert_eq!(parse_realm("NTLM"), None);
        assert_eq!(parse_realm(r#"Bearer realm="""#), None);
    }

    #[test]
    fn test_resource_for_host() {
        assert_eq!(
            resource_for("contoso.sharepoint.com", "abc"),
            "00000003-0000-0ff1-ce00-000000000000/contoso.sharepoint.com@abc"
        );
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("eyJ0eXAi");
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
        assert_eq!(token.secret(), "eyJ0eXAi");
    }

    #[test]
    fn test_acs_endpoint_override_trims_slash() {
        let auth = AppOnlyAuthenticator::new(reqwest::Client::new(), "id", "secret")
            .with_acs_endpoint("http://127.0.0.1:9000/");
        assert_eq!(auth.acs_endpoint, "http://127.0.0.1:9000");
    }
}
