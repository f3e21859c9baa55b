//! CLI bootstrap: turns parsed arguments into client settings and targets.
//!
//! This is the only place CLI flags are interpreted. The tail handler
//! receives a finished [`TailPlan`] and never looks at [`Cli`] again.

use std::collections::HashSet;
use std::time::Duration;

use logtail_client::TailClientConfig;
use logtail_core::TailTarget;

use crate::error::CliError;
use crate::parser::Cli;

/// Everything needed to run one `logtail` invocation.
#[derive(Debug, Clone)]
pub struct TailPlan {
    pub client: TailClientConfig,
    /// One target per phase, in command-line order.
    pub targets: Vec<TailTarget>,
    pub initial_offset: u64,
    /// Prefix output lines with their phase.
    pub labels: bool,
    /// Forward session events to stderr.
    pub events: bool,
}

impl TailPlan {
    /// Validate arguments and build the plan.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut seen = HashSet::new();
        for phase in &cli.phases {
            if phase.trim().is_empty() {
                return Err(CliError::Arguments("phase names must not be empty".to_string()));
            }
            if !seen.insert(phase.as_str()) {
                return Err(CliError::Arguments(format!("phase '{phase}' given twice")));
            }
        }

        let client = TailClientConfig::new()
            .with_optional_token(cli.token.clone().filter(|t| !t.is_empty()))
            .with_connect_timeout(Duration::from_secs(cli.connect_timeout))
            .with_max_backoff_secs(cli.max_backoff);

        let targets = cli
            .phases
            .iter()
            .map(|phase| {
                let mut target = TailTarget::new(cli.endpoint.clone(), phase.clone());
                if let Some(run_id) = &cli.run_id {
                    target = target.with_run_id(run_id.clone());
                }
                if let Some(stream) = &cli.stream {
                    target = target.with_stream(stream.clone());
                }
                target
            })
            .collect::<Vec<_>>();

        Ok(Self {
            client,
            labels: targets.len() > 1,
            targets,
            initial_offset: cli.offset,
            events: cli.events,
        })
    }
}

/// Log filter directive for a `-v` count, used when `RUST_LOG` is unset.
pub const fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,logtail_cli=info,logtail_client=info",
        1 => "info,logtail_cli=debug,logtail_client=debug",
        _ => "debug,logtail_cli=trace,logtail_client=trace",
    }
}
