//! CLI command handlers
//!
//! Argument parsing lives in [`args`]; [`router::execute_command`] builds the
//! concrete site client, template store and engine from configuration and
//! hands off to the library.

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;

/// Map the `-v` count to a tracing filter. Without `-v`, `env_level` is used.
pub fn get_log_level(verbose: u8, env_level: Option<&str>) -> String {
    match verbose {
        0 => env_level
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or("info")
            .to_string(),
        1 => "debug".to_string(),
        2 => "trace".to_string(),
        _ => "trace,hyper=debug,reqwest=debug".to_string(), // -vvv includes dependencies
    }
}
