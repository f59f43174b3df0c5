use clap::Parser;
use site_provisioner::cli::{execute_command, get_log_level, Cli};
use site_provisioner::ProvisionError;
use tracing::{debug, error, trace};

const ENV_LOG_LEVEL: &str = "PROVISIONER_LOG_LEVEL";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_level = std::env::var(ENV_LOG_LEVEL).ok();
    let log_level = get_log_level(cli.verbose, env_level.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("site-provisioner started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        match e.downcast_ref::<ProvisionError>() {
            Some(pe) => {
                eprintln!("Error: {}", pe.user_message());
                std::process::exit(pe.exit_code());
            }
            None => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    execute_command(cli.command).await?;
    Ok(())
}
