//! In-memory document sink.
//!
//! Models a page holding one container per phase and a scrollable viewport.
//! Document height is derived from the rendered line count, so the
//! stick-to-bottom rule behaves as it would on screen. Line counts are kept
//! up to date on append; measuring the document never re-renders it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use logtail_core::{TailSinkPort, Viewport, html_to_text};

/// Default viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT_PX: u64 = 600;

/// Default rendered line height in pixels.
pub const DEFAULT_LINE_HEIGHT_PX: u64 = 20;

#[derive(Debug)]
struct Container {
    id: String,
    /// Appended markup.
    html: String,
    /// Line breaks in the rendered text.
    breaks: u64,
    /// Rendered text ends mid-line.
    open_line: bool,
}

impl Container {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            html: String::new(),
            breaks: 0,
            open_line: false,
        }
    }

    fn line_count(&self) -> u64 {
        self.breaks + u64::from(self.open_line)
    }
}

#[derive(Debug, Default)]
struct Document {
    /// Containers in creation order.
    containers: Vec<Container>,
    /// Sum of every container's line count.
    lines: u64,
    scroll_position: u64,
}

impl Document {
    fn find(&self, container_id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == container_id)
    }

    fn append(&mut self, container_id: &str, html: &str) {
        let text = html_to_text(html);
        let index = match self.containers.iter().position(|c| c.id == container_id) {
            Some(index) => index,
            None => {
                self.containers.push(Container::new(container_id));
                self.containers.len() - 1
            }
        };

        let container = &mut self.containers[index];
        let before = container.line_count();
        container.html.push_str(html);
        container.breaks += text.matches('\n').count() as u64;
        if !text.is_empty() {
            container.open_line = !text.ends_with('\n');
        }
        let after = container.line_count();
        self.lines = self.lines - before + after;
    }
}

/// Page model sink with per-phase containers and a scroll position.
#[derive(Debug)]
pub struct DocumentSink {
    document: Mutex<Document>,
    viewport_height_px: u64,
    line_height_px: u64,
}

impl Default for DocumentSink {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_HEIGHT_PX, DEFAULT_LINE_HEIGHT_PX)
    }
}

impl DocumentSink {
    /// Create an empty document.
    pub fn new(viewport_height_px: u64, line_height_px: u64) -> Self {
        Self {
            document: Mutex::new(Document::default()),
            viewport_height_px,
            line_height_px: line_height_px.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn height_of(&self, document: &Document) -> u64 {
        document.lines * self.line_height_px
    }

    /// Accumulated markup of a container.
    pub fn container(&self, container_id: &str) -> Option<String> {
        self.lock().find(container_id).map(|c| c.html.clone())
    }

    /// Container content rendered as text.
    pub fn text(&self, container_id: &str) -> Option<String> {
        self.container(container_id).map(|html| html_to_text(&html))
    }

    /// Container ids in creation order.
    pub fn container_ids(&self) -> Vec<String> {
        self.lock().containers.iter().map(|c| c.id.clone()).collect()
    }

    pub fn document_height(&self) -> u64 {
        let document = self.lock();
        self.height_of(&document)
    }

    pub fn scroll_position(&self) -> u64 {
        self.lock().scroll_position
    }

    /// Move the viewport, as a reader scrolling would. Clamped to the
    /// scrollable range.
    pub fn scroll_to(&self, position: u64) {
        let mut document = self.lock();
        let max = self
            .height_of(&document)
            .saturating_sub(self.viewport_height_px);
        document.scroll_position = position.min(max);
    }
}

impl TailSinkPort for DocumentSink {
    fn viewport(&self) -> Viewport {
        let document = self.lock();
        Viewport {
            scroll_position: document.scroll_position,
            viewport_height: self.viewport_height_px,
            document_height: self.height_of(&document),
        }
    }

    fn append(&self, container_id: &str, html: &str) {
        self.lock().append(container_id, html);
    }

    fn scroll_to_bottom(&self) {
        let mut document = self.lock();
        document.scroll_position = self
            .height_of(&document)
            .saturating_sub(self.viewport_height_px);
    }
}
