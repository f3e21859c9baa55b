#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

// Silence unused dev-dependency warnings
#[cfg(test)]
use axum as _;
#[cfg(test)]
use futures_util as _;

pub mod bootstrap;
pub mod error;
pub mod parser;
pub mod tail;

// Re-export primary types for convenient access
pub use bootstrap::{TailPlan, default_log_filter};
pub use error::CliError;
pub use parser::Cli;
