//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEMPLATE_FILE: &str = "ProjectTemplateV2Design.json";

pub const MANAGER_JSON: &str = r#"{"persons":[{"id":"i:0#.f|membership|kdavies@umwelt.com.au","upn":"kdavies@umwelt.com.au","role":"Proposal Manager","text":"kirsty davies"}],"layout":1}"#;
pub const DIRECTOR_JSON: &str = r#"{"persons":[{"id":"i:0#.f|membership|jmerrell@umwelt.com.au","upn":"jmerrell@umwelt.com.au","role":"Proposal Director","text":"John Merrell"}],"layout":1}"#;
pub const LOCATION_JSON: &str = r#"{"title":"","defaultTitle":"","address":"","defaultAddress":"","zoomLevel":12}"#;

/// Template document shaped like the production project template
pub fn project_template_json() -> String {
    serde_json::json!({
        "Id": "PROJECT-TEMPLATE-V2",
        "Version": 2,
        "Lists": [{"Title": "Documents", "TemplateType": 101}],
        "ClientSidePages": [
            {
                "Title": "Home",
                "PageName": "Home.aspx",
                "PromoteAsNewsArticle": false,
                "Sections": [
                    {
                        "Order": 1,
                        "Controls": [
                            {"WebPartType": "Text", "ControlProperties": {"Text": "<h4>Project Description -</h4>"}},
                            {"WebPartType": "Text", "ControlProperties": {"Text": "<h4>Project Start Date -</h4>"}}
                        ]
                    },
                    {
                        "Order": 2,
                        "Controls": [{"WebPartType": "News"}]
                    },
                    {
                        "Order": 3,
                        "Controls": [
                            {"WebPartType": "People", "JsonControlData": DIRECTOR_JSON},
                            {"WebPartType": "People", "JsonControlData": MANAGER_JSON},
                            {"WebPartType": "Custom", "JsonControlData": LOCATION_JSON}
                        ]
                    }
                ]
            },
            {"Title": "Contacts", "Sections": []}
        ]
    })
    .to_string()
}

pub fn full_message() -> String {
    serde_json::json!({
        "SiteUrl": "https://contoso.sharepoint.com/sites/P1234",
        "Description": "Flora survey",
        "ProposalStartDate": "2021-06-01 09:00",
        "ProposalDeadLineDate": "2021-06-03 14:30",
        "ProposalManager": "Jo Smith;jsmith@contoso.com",
        "ProposalDirector": "Sam Lee;slee@contoso.com",
        "IsTopNavigation": true,
        "ProjectLocationName": "Hunter Valley",
        "ProjectLocationAddress": "1 Main Rd, Cessnock"
    })
    .to_string()
}

/// Job directory laid out like a deployment: `Templates/` and `Files/`
pub struct JobDir {
    temp_dir: TempDir,
}

impl JobDir {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("Templates"))?;
        fs::create_dir_all(temp_dir.path().join("Files"))?;
        Ok(Self { temp_dir })
    }

    /// Job directory with the project template installed
    pub fn with_project_template() -> Result<Self> {
        let job = Self::new()?;
        job.write_template(TEMPLATE_FILE, &project_template_json())?;
        Ok(job)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn template_dir(&self) -> PathBuf {
        self.path().join("Templates")
    }

    pub fn template_path(&self) -> PathBuf {
        self.template_dir().join(TEMPLATE_FILE)
    }

    pub fn write_template(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.template_dir().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn write_message(&self, content: &str) -> Result<PathBuf> {
        let path = self.path().join("message.json");
        fs::write(&path, content)?;
        Ok(path)
    }
}
