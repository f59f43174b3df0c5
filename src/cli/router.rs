//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::{run_provision, run_render};
use crate::error::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Provision { message, config } => run_provision(&message, config.as_deref()).await,
        Commands::Render {
            message,
            template,
            home_only,
        } => run_render(&message, &template, home_only).await,
    }
}
