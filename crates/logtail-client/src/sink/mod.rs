//! Display sinks.
//!
//! - [`TerminalSink`] - plain text on any writer, optionally labelled per phase
//! - [`DocumentSink`] - in-memory page model with containers and a viewport

mod document;
mod terminal;

pub use document::{DEFAULT_LINE_HEIGHT_PX, DEFAULT_VIEWPORT_HEIGHT_PX, DocumentSink};
pub use terminal::TerminalSink;
