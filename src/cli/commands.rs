//! `provision` and `render` command implementations

use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::config::load_config;
use crate::engine::CommandTemplateEngine;
use crate::error::{ErrorCode, ProvisionError, Result};
use crate::message::SiteInformation;
use crate::provision::{substitute_home, ProvisionReport, Provisioner};
use crate::site::{AppOnlyAuthenticator, RestSiteConnector};
use crate::subprocess::TokioProcessRunner;
use crate::template::{FileSystemTemplateProvider, TemplateProvider, HOME_PAGE_TITLE};

const STDIN_MARKER: &str = "-";

/// Read and parse a queue message from a file or stdin
pub async fn read_message(source: &str) -> Result<SiteInformation> {
    let body = if source == STDIN_MARKER {
        let mut body = String::new();
        tokio::io::stdin()
            .read_to_string(&mut body)
            .await
            .map_err(|e| message_read_error("stdin", e))?;
        body
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| message_read_error(source, e))?
    };
    SiteInformation::from_message(&body)
}

fn message_read_error(source: &str, err: std::io::Error) -> ProvisionError {
    ProvisionError::input_with_code(
        ErrorCode::INPUT_INVALID_MESSAGE,
        format!("Failed to read queue message from {source}"),
        None,
    )
    .with_source(err)
}

pub async fn run_provision(message: &str, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path).await?;
    let site = read_message(message).await?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("site-provisioner/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProvisionError::site("Failed to build HTTP client").with_source(e))?;

    let authenticator =
        AppOnlyAuthenticator::new(client.clone(), &config.client_id, &config.client_secret);
    let connector = RestSiteConnector::new(client, authenticator);
    let templates = FileSystemTemplateProvider::new(config.template_dir());
    let engine = CommandTemplateEngine::new(
        Arc::new(TokioProcessRunner),
        &config.engine.program,
        config.engine.args.clone(),
    )
    .with_timeout(config.engine.timeout)
    .with_working_dir(Some(config.base_dir.clone()));

    debug!("Template directory: {}", config.template_dir().display());
    let provisioner = Provisioner::new(
        config,
        Arc::new(connector),
        Arc::new(templates),
        Arc::new(engine),
    );

    let report = provisioner.provision(&site).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &ProvisionReport) {
    println!("Provisioned '{}' ({})", report.web_title, report.site_url);
    if report.enriched {
        println!("  values enriched from project list");
    }
    if report.navigation_nodes_added > 0 {
        println!("  {} navigation links added", report.navigation_nodes_added);
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}

/// Offline dry run of the substitution step
pub async fn run_render(message: &str, template_path: &Path, home_only: bool) -> Result<()> {
    let site = read_message(message).await?;

    let dir = template_path.parent().unwrap_or_else(|| Path::new("."));
    let name = template_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ProvisionError::template_with_code(
                ErrorCode::TEMPLATE_NOT_FOUND,
                "Template path has no file name",
                Some(template_path.to_path_buf()),
            )
        })?;

    let mut template = FileSystemTemplateProvider::new(dir).get_template(name).await?;
    if substitute_home(&mut template, &site)? {
        info!("Rendered '{}' page for {}", HOME_PAGE_TITLE, site.site_url);
    }

    let rendered = if home_only {
        let page = template.find_page(HOME_PAGE_TITLE).ok_or_else(|| {
            ProvisionError::template_with_code(
                ErrorCode::TEMPLATE_NOT_FOUND,
                format!("Template has no '{HOME_PAGE_TITLE}' page"),
                Some(template_path.to_path_buf()),
            )
        })?;
        serde_json::to_string_pretty(page)
    } else {
        serde_json::to_string_pretty(&template)
    }
    .map_err(|e| {
        ProvisionError::template_with_code(
            ErrorCode::TEMPLATE_PARSE_ERROR,
            "Failed to serialize rendered template",
            None,
        )
        .with_source(e)
    })?;

    println!("{rendered}");
    Ok(())
}
