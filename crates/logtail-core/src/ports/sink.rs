//! Display sink port.
//!
//! This port abstracts where tailed output is rendered, allowing different
//! implementations for the terminal (stdout) and an in-memory document model
//! with per-phase containers and a scrollable viewport.

use crate::render::Viewport;

/// Port for rendering appended log fragments.
///
/// Implementations should be thread-safe and non-blocking where possible.
/// Failures are the sink's own concern; nothing is reported back to the
/// session.
pub trait TailSinkPort: Send + Sync {
    /// Current scroll geometry, read before each append.
    fn viewport(&self) -> Viewport;

    /// Append a fragment to the container.
    ///
    /// # Arguments
    ///
    /// * `container_id` - Container for the phase (`tailed-<phase>-logs`)
    /// * `html` - Markup fragment exactly as delivered by the server
    fn append(&self, container_id: &str, html: &str);

    /// Bring the end of the document into view.
    fn scroll_to_bottom(&self);
}
