//! Queue message payload describing the site to provision

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ErrorCode, ProvisionError, Result};

/// Per-site values delivered on the provisioning queue.
///
/// Only `site_url` is required. Every other field may be absent or blank, in
/// which case the corresponding template region is blanked or left untouched.
/// The record is read-only once parsed; rendered values live in
/// [`crate::substitution::RenderedDates`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteInformation {
    #[serde(alias = "siteUrl")]
    pub site_url: String,
    #[serde(default, alias = "description")]
    pub description: Option<String>,
    #[serde(default, alias = "proposalStartDate")]
    pub proposal_start_date: Option<String>,
    #[serde(default, alias = "proposalDeadLineDate")]
    pub proposal_dead_line_date: Option<String>,
    #[serde(default, alias = "proposalManager")]
    pub proposal_manager: Option<String>,
    #[serde(default, alias = "proposalDirector")]
    pub proposal_director: Option<String>,
    #[serde(default, alias = "isTopNavigation")]
    pub is_top_navigation: bool,
    #[serde(default, alias = "projectLocationName")]
    pub project_location_name: Option<String>,
    #[serde(default, alias = "projectLocationAddress")]
    pub project_location_address: Option<String>,
    #[serde(default, alias = "planId")]
    pub plan_id: Option<String>,
}

impl SiteInformation {
    /// Parse a queue message body
    pub fn from_message(body: &str) -> Result<Self> {
        let info: SiteInformation = serde_json::from_str(body.trim_start_matches('\u{feff}'))
            .map_err(|e| {
                ProvisionError::input_with_code(
                    ErrorCode::INPUT_INVALID_MESSAGE,
                    "Queue message is not a valid site information payload",
                    None,
                )
                .with_source(e)
            })?;
        info.validate()?;
        debug!("Parsed queue message for site {}", info.site_url);
        Ok(info)
    }

    /// Check the required site URL
    pub fn validate(&self) -> Result<()> {
        if self.site_url.trim().is_empty() {
            return Err(ProvisionError::input_with_code(
                ErrorCode::INPUT_MISSING_SITE_URL,
                "SiteUrl is required",
                Some("SiteUrl".to_string()),
            ));
        }
        Url::parse(self.site_url.trim()).map_err(|e| {
            ProvisionError::input_with_code(
                ErrorCode::INPUT_MISSING_SITE_URL,
                format!("SiteUrl '{}' is not a valid URL", self.site_url),
                Some("SiteUrl".to_string()),
            )
            .with_source(e)
        })?;
        Ok(())
    }

    pub fn description(&self) -> &str {
        non_blank(&self.description).unwrap_or_default()
    }

    pub fn manager(&self) -> PersonField {
        PersonField::parse(self.proposal_manager.as_deref())
    }

    pub fn director(&self) -> PersonField {
        PersonField::parse(self.proposal_director.as_deref())
    }
}

/// A "Display Name;email" pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonField {
    pub display_name: String,
    pub email: String,
}

impl PersonField {
    /// Split on the first `;`. A value without a separator is all display name.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            return Self::default();
        };

        match value.split_once(';') {
            Some((name, email)) => {
                // Extra segments after the email are ignored.
                let email = email.split(';').next().unwrap_or_default();
                Self {
                    display_name: name.to_string(),
                    email: email.to_string(),
                }
            }
            None => Self {
                display_name: value.to_string(),
                email: String::new(),
            },
        }
    }
}

/// `Some` only when the value has non-whitespace content
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
