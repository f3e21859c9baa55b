//! Common test utilities.
//!
//! This module provides an in-process SSE log server and helpers for
//! building the events it replays.

pub mod server;
