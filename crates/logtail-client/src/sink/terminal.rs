//! Terminal sink: renders appended markup as plain text.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use logtail_core::{TailSinkPort, Viewport, html_to_text};

struct TerminalState<W> {
    writer: W,
    /// Whether the next byte for a container starts a new line.
    at_line_start: HashMap<String, bool>,
}

/// Writes each appended fragment to `W` as text.
///
/// One sink may be shared by the sessions of several phases. With labels
/// enabled every line is prefixed with `[<phase>] `. A terminal always
/// follows its output, so the viewport reports itself pinned to the bottom.
pub struct TerminalSink<W: Write + Send> {
    state: Mutex<TerminalState<W>>,
    labels: bool,
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(TerminalState {
                writer,
                at_line_start: HashMap::new(),
            }),
            labels: false,
        }
    }

    /// Prefix every line with its phase.
    #[must_use]
    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Phase name from a `tailed-<phase>-logs` container id.
fn phase_label(container_id: &str) -> &str {
    container_id
        .strip_prefix("tailed-")
        .and_then(|rest| rest.strip_suffix("-logs"))
        .unwrap_or(container_id)
}

fn labelled(text: &str, label: &str, at_line_start: &mut bool) -> String {
    let mut out = String::with_capacity(text.len() + label.len() + 3);
    for line in text.split_inclusive('\n') {
        if *at_line_start {
            out.push('[');
            out.push_str(label);
            out.push_str("] ");
        }
        out.push_str(line);
        *at_line_start = line.ends_with('\n');
    }
    out
}

impl<W: Write + Send> TailSinkPort for TerminalSink<W> {
    fn viewport(&self) -> Viewport {
        Viewport::pinned_to_bottom()
    }

    fn append(&self, container_id: &str, html: &str) {
        let text = html_to_text(html);
        if text.is_empty() {
            return;
        }

        let mut state = self.lock();
        let output = if self.labels {
            let at_line_start = state
                .at_line_start
                .entry(container_id.to_string())
                .or_insert(true);
            labelled(&text, phase_label(container_id), at_line_start)
        } else {
            text
        };

        if let Err(e) = state
            .writer
            .write_all(output.as_bytes())
            .and_then(|()| state.writer.flush())
        {
            warn!(container = container_id, error = %e, "Failed to write log output");
        }
    }

    fn scroll_to_bottom(&self) {}
}
