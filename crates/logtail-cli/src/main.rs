//! CLI entry point - the composition root.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use logtail_cli::{Cli, CliError, TailPlan, default_log_filter, tail};

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let plan = TailPlan::from_cli(&cli)?;
    tail::run(plan).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        eprintln!("Error: {err}");
        std::process::exit(code);
    }
}
