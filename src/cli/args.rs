//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Provision SharePoint project sites from a template
#[derive(Parser)]
#[command(name = "site-provisioner")]
#[command(about = "site-provisioner - Apply the project site template for a queue message", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision the site described by a queue message
    #[command(name = "provision")]
    Provision {
        /// Queue message file, or `-` for stdin
        #[arg(short = 'm', long, default_value = "-")]
        message: String,

        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },

    /// Substitute a queue message into a template and print the result
    #[command(name = "render")]
    Render {
        /// Queue message file, or `-` for stdin
        #[arg(short = 'm', long, default_value = "-")]
        message: String,

        /// Template file to render
        #[arg(short = 't', long)]
        template: PathBuf,

        /// Print only the Home page instead of the whole template
        #[arg(long)]
        home_only: bool,
    },
}
