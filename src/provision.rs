//! Provisioning driver
//!
//! One [`Provisioner::provision`] call handles one queue message end to end:
//! connect, optionally enrich, load the template, rewrite the Home page,
//! apply the template, add hub navigation and rename the documents list.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::ProvisionerConfig;
use crate::engine::{ProgressEvent, TemplateEngine};
use crate::enrich::enrich_from_project_list;
use crate::error::Result;
use crate::message::SiteInformation;
use crate::navigation::top_navigation_links;
use crate::site::{SiteConnector, SiteSession};
use crate::substitution::substitute_home_page;
use crate::template::{FileSystemConnector, ProvisioningTemplate, TemplateProvider, HOME_PAGE_TITLE};

/// Outcome of a successful provisioning run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub site_url: String,
    pub web_title: String,
    pub enriched: bool,
    pub home_page_substituted: bool,
    pub navigation_nodes_added: usize,
    pub list_renamed: bool,
    /// Non-fatal problems encountered along the way
    pub warnings: Vec<String>,
}

pub struct Provisioner {
    config: ProvisionerConfig,
    connector: Arc<dyn SiteConnector>,
    templates: Arc<dyn TemplateProvider>,
    engine: Arc<dyn TemplateEngine>,
}

impl Provisioner {
    pub fn new(
        config: ProvisionerConfig,
        connector: Arc<dyn SiteConnector>,
        templates: Arc<dyn TemplateProvider>,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        Self {
            config,
            connector,
            templates,
            engine,
        }
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    /// Provision the site described by `site`. Failures are logged before
    /// being returned.
    pub async fn provision(&self, site: &SiteInformation) -> Result<ProvisionReport> {
        match self.run(site).await {
            Ok(report) => {
                info!("Provisioning of {} completed", report.site_url);
                Ok(report)
            }
            Err(e) => {
                error!("Provisioning of {} failed: {}", site.site_url, e);
                Err(e)
            }
        }
    }

    async fn run(&self, site: &SiteInformation) -> Result<ProvisionReport> {
        site.validate()?;
        let site_url = site.site_url.trim();
        info!("Provisioning site {}", site_url);

        let session = self.connector.connect(site_url).await?;
        let web_title = session.web_title().await?;
        info!("Connected to '{}'", web_title);

        let mut report = ProvisionReport {
            site_url: session.site_url().to_string(),
            web_title: web_title.clone(),
            ..Default::default()
        };

        let site = match self.config.project_list_source() {
            Some(source) => {
                let enriched =
                    enrich_from_project_list(self.connector.as_ref(), &source, &web_title, site).await;
                report.enriched = &enriched != site;
                enriched
            }
            None => site.clone(),
        };

        let mut template = self.templates.get_template(&self.config.template_file).await?;
        info!("Loaded template '{}'", template.id);

        report.home_page_substituted = substitute_home(&mut template, &site)?;

        let assets = FileSystemConnector::new(self.config.asset_dir(), "");
        debug!("Attaching asset connector at {}", assets.base_path().display());
        template.connector = Some(assets);

        let progress = |event: &ProgressEvent| info!("{}", event);
        self.engine
            .apply(session.as_ref(), &template, &progress)
            .await?;
        info!("Template applied to {}", report.site_url);

        if site.is_top_navigation {
            report.navigation_nodes_added = self.add_navigation(session.as_ref()).await?;
        }

        match session
            .rename_list(&self.config.documents_list_title, &self.config.documents_list_rename)
            .await
        {
            Ok(()) => {
                info!(
                    "Renamed list '{}' to '{}'",
                    self.config.documents_list_title, self.config.documents_list_rename
                );
                report.list_renamed = true;
            }
            Err(e) => {
                let message = format!(
                    "Could not rename list '{}': {}",
                    self.config.documents_list_title, e
                );
                warn!("{}", message);
                report.warnings.push(message);
            }
        }

        Ok(report)
    }

    async fn add_navigation(&self, session: &dyn SiteSession) -> Result<usize> {
        let nodes = top_navigation_links(&self.config.root_site_url);
        for node in &nodes {
            session.add_navigation_node(node).await?;
            debug!("Added navigation link '{}' -> {}", node.title, node.url);
        }
        info!("Added {} top navigation links", nodes.len());
        Ok(nodes.len())
    }
}

/// Rewrite the Home page in place. Returns false when the template has none.
pub fn substitute_home(template: &mut ProvisioningTemplate, site: &SiteInformation) -> Result<bool> {
    let Some(page) = template.find_page_mut(HOME_PAGE_TITLE) else {
        info!("Template has no '{}' page; skipping substitution", HOME_PAGE_TITLE);
        return Ok(false);
    };
    let original = std::mem::take(page);
    *page = substitute_home_page(original, site)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockTemplateEngine;
    use crate::error::{ErrorCode, ProvisionError};
    use crate::site::{MockSiteConnector, NavigationLocation};
    use crate::template::{CanvasControl, CanvasSection, ClientSidePage};
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticTemplates(ProvisioningTemplate);

    #[async_trait]
    impl TemplateProvider for StaticTemplates {
        async fn get_template(&self, _name: &str) -> Result<ProvisioningTemplate> {
            Ok(self.0.clone())
        }
    }

    fn config() -> ProvisionerConfig {
        ProvisionerConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            root_site_url: "https://contoso.sharepoint.com".to_string(),
            base_dir: "/srv/job".into(),
            ..Default::default()
        }
    }

    fn text(html: &str) -> CanvasControl {
        let mut control = CanvasControl::default();
        control.set_text(html.to_string());
        control
    }

    fn template(page_title: &str) -> ProvisioningTemplate {
        ProvisioningTemplate {
            id: "PROJECT".to_string(),
            client_side_pages: vec![ClientSidePage {
                title: page_title.to_string(),
                sections: vec![CanvasSection {
                    controls: vec![text("DESCRIPTION"), text("DATES")],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn site() -> SiteInformation {
        SiteInformation {
            site_url: "https://contoso.sharepoint.com/sites/P1".to_string(),
            description: Some("Flora survey".to_string()),
            ..Default::default()
        }
    }

    fn provisioner(
        connector: &MockSiteConnector,
        engine: &MockTemplateEngine,
        template: ProvisioningTemplate,
        config: ProvisionerConfig,
    ) -> Provisioner {
        Provisioner::new(
            config,
            Arc::new(connector.clone()),
            Arc::new(StaticTemplates(template)),
            Arc::new(engine.clone()),
        )
    }

    #[tokio::test]
    async fn test_provision_applies_substituted_template() {
        let connector = MockSiteConnector::new("P1");
        let engine = MockTemplateEngine::new();
        let p = provisioner(&connector, &engine, template("Home"), config());

        let report = p.provision(&site()).await.unwrap();

        assert!(report.home_page_substituted);
        assert!(report.list_renamed);
        assert_eq!(report.web_title, "P1");
        assert_eq!(report.navigation_nodes_added, 0);
        assert!(connector.navigation_nodes().is_empty());
        assert_eq!(
            connector.renamed_lists(),
            vec![("Documents".to_string(), "01. Project Management".to_string())]
        );

        let applied = engine.last_template().unwrap();
        let home = applied.find_page("Home").unwrap();
        assert!(home.control(0, 0).unwrap().text().unwrap().contains("Flora survey"));
        assert_eq!(
            applied.connector,
            Some(FileSystemConnector::new("/srv/job/Files", ""))
        );
        assert_eq!(connector.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_missing_home_page_applies_template_unchanged() {
        let connector = MockSiteConnector::new("P1");
        let engine = MockTemplateEngine::new();
        let p = provisioner(&connector, &engine, template("Landing"), config());

        let report = p.provision(&site()).await.unwrap();

        assert!(!report.home_page_substituted);
        let applied = engine.last_template().unwrap();
        assert_eq!(applied.client_side_pages, template("Landing").client_side_pages);
    }

    #[tokio::test]
    async fn test_top_navigation_only_when_flagged() {
        let connector = MockSiteConnector::new("P1");
        let engine = MockTemplateEngine::new();
        let p = provisioner(&connector, &engine, template("Home"), config());

        let info = SiteInformation {
            is_top_navigation: true,
            ..site()
        };
        let report = p.provision(&info).await.unwrap();

        assert_eq!(report.navigation_nodes_added, 6);
        let nodes = connector.navigation_nodes();
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes[0].url, "https://contoso.sharepoint.com/SitePages/Home.aspx");
        assert!(nodes
            .iter()
            .all(|n| n.location == NavigationLocation::TopNavigationBar));
    }

    #[tokio::test]
    async fn test_list_rename_failure_is_not_fatal() {
        let connector = MockSiteConnector::new("P1");
        connector.configure(|s| s.fail_rename = true);
        let engine = MockTemplateEngine::new();
        let p = provisioner(&connector, &engine, template("Home"), config());

        let report = p.provision(&site()).await.unwrap();

        assert!(!report.list_renamed);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Documents"));
    }

    #[tokio::test]
    async fn test_session_released_when_engine_fails() {
        let connector = MockSiteConnector::new("P1");
        let engine = MockTemplateEngine::new().failing("apply failed");
        let p = provisioner(&connector, &engine, template("Home"), config());

        let err = p.provision(&site()).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ENGINE_FAILED);
        assert_eq!(connector.connections(), 1);
        assert_eq!(connector.open_sessions(), 0);
        assert!(connector.renamed_lists().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_date_stops_before_apply() {
        let connector = MockSiteConnector::new("P1");
        let engine = MockTemplateEngine::new();
        let p = provisioner(&connector, &engine, template("Home"), config());

        let info = SiteInformation {
            proposal_dead_line_date: Some("next tuesday".to_string()),
            ..site()
        };
        let err = p.provision(&info).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::INPUT_INVALID_DATE);
        match err {
            ProvisionError::Input { field, .. } => {
                assert_eq!(field.as_deref(), Some("ProposalDeadLineDate"))
            }
            other => panic!("Expected input error, got {other:?}"),
        }
        assert!(engine.applied().is_empty());
        assert_eq!(connector.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_connect_failure_is_returned() {
        let connector = MockSiteConnector::new("P1");
        connector.configure(|s| s.fail_connect = true);
        let engine = MockTemplateEngine::new();
        let p = provisioner(&connector, &engine, template("Home"), config());

        let err = p.provision(&site()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SITE_AUTH_FAILED);
        assert!(engine.applied().is_empty());
    }

    #[tokio::test]
    async fn test_enrichment_from_project_list() {
        let row = json!({"Description": "From project list"});
        let connector = MockSiteConnector::new("P1").with_list_item(
            "Projects",
            "P1",
            row.as_object().cloned().unwrap(),
        );
        let engine = MockTemplateEngine::new();
        let config = ProvisionerConfig {
            project_site_url: Some("https://contoso.sharepoint.com/sites/projects".to_string()),
            project_list_title: Some("Projects".to_string()),
            ..config()
        };
        let p = provisioner(&connector, &engine, template("Home"), config);

        let report = p.provision(&site()).await.unwrap();

        assert!(report.enriched);
        assert_eq!(connector.connections(), 2);
        let applied = engine.last_template().unwrap();
        let description = applied
            .find_page("Home")
            .and_then(|p| p.control(0, 0))
            .and_then(|c| c.text())
            .unwrap()
            .to_string();
        assert!(description.contains("From project list"));
    }
}
