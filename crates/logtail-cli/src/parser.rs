//! Command-line parser.

use clap::{ArgAction, Parser};

/// Follow the logs of a run's phases as they are written.
#[derive(Debug, Parser)]
#[command(name = "logtail")]
#[command(about = "Tail run phase logs over server-sent events")]
#[command(version)]
pub struct Cli {
    /// Log stream endpoint (http or https)
    #[arg(long, env = "LOGTAIL_ENDPOINT")]
    pub endpoint: String,

    /// Run whose logs to follow
    #[arg(long = "run-id", env = "LOGTAIL_RUN_ID")]
    pub run_id: Option<String>,

    /// Phase to follow; repeat for several phases
    #[arg(long = "phase", default_value = "plan")]
    pub phases: Vec<String>,

    /// Stream selector passed through to the server
    #[arg(long)]
    pub stream: Option<String>,

    /// Offset to resume from
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Bearer token
    #[arg(long, env = "LOGTAIL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Longest wait between reconnects, in seconds
    #[arg(
        long = "max-backoff",
        default_value_t = 64,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_backoff: u32,

    /// Connect timeout, in seconds
    #[arg(
        long = "connect-timeout",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout: u64,

    /// Write session events to stderr as JSON lines
    #[arg(long)]
    pub events: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}
