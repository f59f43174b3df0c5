//! Best-effort enrichment from the central project list
//!
//! When a project site and list are configured, the row whose Title equals the
//! new site's web title supplies description, dates, people and location.
//! Lookup failures are logged and the queue message values are kept.

use serde_json::Value;
use tracing::{debug, error, info};

use crate::message::SiteInformation;
use crate::site::{ListItem, SiteConnector, SiteResult};

/// Where project rows live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListSource {
    pub site_url: String,
    pub list_title: String,
}

/// Internal field names of the project list, in the order they are applied
const FIELD_DESCRIPTION: &str = "Description";
const FIELD_DIRECTOR: &str = "PD_x002f_PM";
const FIELD_DEADLINE: &str = "ProposalDeadline";
const FIELD_START: &str = "ProjectStartDate";
const FIELD_MANAGER: &str = "ProposalManager";
const FIELD_LOCATION_NAME: &str = "ProjectLocationName";
const FIELD_LOCATION_ADDRESS: &str = "ProjectLocationAddress";

/// Return `info` updated from the project list row titled `web_title`.
///
/// Never fails: on any lookup error the original values are returned.
pub async fn enrich_from_project_list(
    connector: &dyn SiteConnector,
    source: &ProjectListSource,
    web_title: &str,
    info: &SiteInformation,
) -> SiteInformation {
    match lookup(connector, source, web_title).await {
        Ok(Some(item)) => {
            info!(
                "Applying project list values from '{}' for '{}'",
                source.list_title, web_title
            );
            apply_item(info, &item)
        }
        Ok(None) => {
            debug!(
                "No row titled '{}' in project list '{}'",
                web_title, source.list_title
            );
            info.clone()
        }
        Err(e) => {
            error!("Error when reading project list '{}': {}", source.list_title, e);
            info.clone()
        }
    }
}

async fn lookup(
    connector: &dyn SiteConnector,
    source: &ProjectListSource,
    web_title: &str,
) -> SiteResult<Option<ListItem>> {
    let session = connector.connect(&source.site_url).await?;
    let project_web = session.web_title().await?;
    debug!("Connected to project site '{}'", project_web);
    session.find_list_item(&source.list_title, web_title).await
}

/// Copy the project row's values over the message values. Null or missing
/// columns leave the message value in place.
pub fn apply_item(info: &SiteInformation, item: &ListItem) -> SiteInformation {
    let mut enriched = info.clone();
    let targets: [(&str, &mut Option<String>); 7] = [
        (FIELD_DESCRIPTION, &mut enriched.description),
        (FIELD_DIRECTOR, &mut enriched.proposal_director),
        (FIELD_DEADLINE, &mut enriched.proposal_dead_line_date),
        (FIELD_START, &mut enriched.proposal_start_date),
        (FIELD_MANAGER, &mut enriched.proposal_manager),
        (FIELD_LOCATION_NAME, &mut enriched.project_location_name),
        (FIELD_LOCATION_ADDRESS, &mut enriched.project_location_address),
    ];

    for (field, target) in targets {
        if let Some(value) = item.get(field).and_then(field_text) {
            *target = Some(value);
        }
    }
    enriched
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
