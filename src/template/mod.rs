//! Provisioning template model
//!
//! Only the parts the substitution engine touches are modeled. Everything
//! else in the template document is carried through `extra` so the
//! provisioning engine receives it untouched.

pub mod connector;
pub mod provider;

pub use connector::FileSystemConnector;
pub use provider::{FileSystemTemplateProvider, TemplateProvider};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property key holding a text control's HTML
pub const TEXT_PROPERTY: &str = "Text";

/// Title of the page the substitution engine rewrites
pub const HOME_PAGE_TITLE: &str = "Home";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningTemplate {
    pub id: String,
    #[serde(default)]
    pub client_side_pages: Vec<ClientSidePage>,
    /// Asset connector, attached by the driver before apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<FileSystemConnector>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProvisioningTemplate {
    pub fn find_page(&self, title: &str) -> Option<&ClientSidePage> {
        self.client_side_pages.iter().find(|p| p.title == title)
    }

    pub fn find_page_mut(&mut self, title: &str) -> Option<&mut ClientSidePage> {
        self.client_side_pages.iter_mut().find(|p| p.title == title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientSidePage {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    #[serde(default)]
    pub sections: Vec<CanvasSection>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ClientSidePage {
    /// Control at a fixed layout position, if the template has one there
    pub fn control_mut(&mut self, section: usize, control: usize) -> Option<&mut CanvasControl> {
        self.sections
            .get_mut(section)
            .and_then(|s| s.controls.get_mut(control))
    }

    pub fn control(&self, section: usize, control: usize) -> Option<&CanvasControl> {
        self.sections
            .get(section)
            .and_then(|s| s.controls.get(control))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CanvasSection {
    #[serde(default)]
    pub controls: Vec<CanvasControl>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CanvasControl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_part_type: Option<String>,
    #[serde(default)]
    pub control_properties: BTreeMap<String, String>,
    /// Serialized widget configuration owned by the front-end component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_control_data: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CanvasControl {
    pub fn text(&self) -> Option<&str> {
        self.control_properties.get(TEXT_PROPERTY).map(String::as_str)
    }

    /// Replace the `Text` property wholesale
    pub fn set_text(&mut self, html: String) {
        self.control_properties
            .insert(TEXT_PROPERTY.to_string(), html);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_template_parts_survive_round_trip() {
        let raw = r#"{
            "Id": "PROJECT-TEMPLATE",
            "Lists": [{"Title": "Documents"}],
            "ClientSidePages": [{
                "Title": "Home",
                "PromoteAsNewsArticle": false,
                "Sections": [{"Order": 1, "Controls": [{"WebPartType": "Text", "ControlProperties": {"Text": "x"}}]}]
            }]
        }"#;

        let template: ProvisioningTemplate = serde_json::from_str(raw).unwrap();
        assert_eq!(template.id, "PROJECT-TEMPLATE");
        assert!(template.extra.contains_key("Lists"));

        let page = template.find_page(HOME_PAGE_TITLE).unwrap();
        assert!(page.extra.contains_key("PromoteAsNewsArticle"));
        assert_eq!(page.sections[0].extra["Order"], 1);
        assert_eq!(page.control(0, 0).and_then(|c| c.text()), Some("x"));

        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["Lists"][0]["Title"], "Documents");
        assert_eq!(json["ClientSidePages"][0]["PromoteAsNewsArticle"], false);
    }

    #[test]
    fn test_control_lookup_out_of_range() {
        let mut page = ClientSidePage {
            title: HOME_PAGE_TITLE.to_string(),
            sections: vec![CanvasSection::default()],
            ..Default::default()
        };
        assert!(page.control(0, 0).is_none());
        assert!(page.control_mut(2, 1).is_none());
    }

    #[test]
    fn test_set_text_replaces_existing() {
        let mut control = CanvasControl::default();
        control.set_text("old".to_string());
        control.set_text("new".to_string());
        assert_eq!(control.text(), Some("new"));
        assert_eq!(control.control_properties.len(), 1);
    }
}
