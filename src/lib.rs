//! # site-provisioner
//!
//! Queue-triggered provisioning of SharePoint project sites from a template.
//!
//! ## Usage
//!
//! ```bash
//! site-provisioner provision --message message.json [--config provisioner.toml]
//! site-provisioner render --message message.json --template Templates/ProjectTemplateV2Design.json
//! ```
//!
//! ## Modules
//!
//! - `cli` - Argument parsing and command handlers
//! - `config` - Configuration from defaults, TOML file and environment
//! - `engine` - Applying a template to a site through an external engine
//! - `enrich` - Best-effort lookup of project metadata from a project list
//! - `error` - Unified error type with numeric codes
//! - `message` - Queue message payload
//! - `navigation` - Hub links added to the top navigation bar
//! - `provision` - The provisioning driver
//! - `site` - Authenticated site sessions (REST and in-memory)
//! - `subprocess` - Process runner abstraction used by the engine
//! - `substitution` - Per-site rewriting of the template's Home page
//! - `template` - Template model and template store
pub mod cli;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod message;
pub mod navigation;
pub mod provision;
pub mod site;
pub mod subprocess;
pub mod substitution;
pub mod template;

pub use error::{ProvisionError, Result};
pub use message::SiteInformation;
pub use provision::{ProvisionReport, Provisioner};
