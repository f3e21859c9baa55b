//! Rendering helpers: stick-to-bottom logic and markup-to-text conversion.

use crate::ports::TailSinkPort;

/// Distance from the bottom, in pixels, still treated as "at the bottom".
pub const DEFAULT_NEAR_BOTTOM_THRESHOLD_PX: u32 = 100;

/// Byte prefixed to the first chunk of a log.
pub const CHUNK_START_MARKER: char = '\u{2}';

/// Byte suffixed to the last chunk of a log.
pub const CHUNK_END_MARKER: char = '\u{3}';

/// Scroll geometry of a display, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Distance scrolled from the top.
    pub scroll_position: u64,
    /// Height of the visible area.
    pub viewport_height: u64,
    /// Height of the whole document.
    pub document_height: u64,
}

impl Viewport {
    /// A viewport that always shows the end of the document.
    pub const fn pinned_to_bottom() -> Self {
        Self {
            scroll_position: 0,
            viewport_height: 0,
            document_height: 0,
        }
    }

    pub fn is_near_bottom(&self, threshold_px: u32) -> bool {
        is_near_bottom(
            self.scroll_position,
            self.viewport_height,
            self.document_height,
            threshold_px,
        )
    }
}

/// Whether the visible area ends within `threshold_px` of the document end.
pub fn is_near_bottom(
    scroll_position: u64,
    viewport_height: u64,
    document_height: u64,
    threshold_px: u32,
) -> bool {
    scroll_position.saturating_add(viewport_height)
        >= document_height.saturating_sub(u64::from(threshold_px))
}

/// Append a fragment, following the output only if the reader was already
/// at the bottom before the append.
///
/// Returns whether the sink was scrolled.
pub fn apply_chunk(sink: &dyn TailSinkPort, container_id: &str, html: &str, threshold_px: u32) -> bool {
    let follow = sink.viewport().is_near_bottom(threshold_px);
    sink.append(container_id, html);
    if follow {
        sink.scroll_to_bottom();
    }
    follow
}

/// Convert a server-rendered fragment to plain terminal text.
///
/// `<br>` becomes a newline, other tags are dropped, common entities are
/// decoded and chunk marker bytes are removed.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find(['<', '&', CHUNK_START_MARKER, CHUNK_END_MARKER]) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with(CHUNK_START_MARKER) || rest.starts_with(CHUNK_END_MARKER) {
            rest = &rest[1..];
        } else if rest.starts_with('<') {
            match rest.find('>') {
                Some(end) => {
                    if is_line_break(&rest[1..end]) {
                        out.push('\n');
                    }
                    rest = &rest[end + 1..];
                }
                None => {
                    out.push_str(rest);
                    rest = "";
                }
            }
        } else {
            match decode_entity(rest) {
                Some((decoded, consumed)) => {
                    out.push(decoded);
                    rest = &rest[consumed..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_line_break(tag: &str) -> bool {
    let name = tag.trim().trim_end_matches('/').trim_end();
    name.eq_ignore_ascii_case("br")
}

/// Decode an entity at the start of `s`; returns the char and bytes consumed.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let (end, _) = s.char_indices().take(12).find(|&(_, c)| c == ';')?;
    let name = &s[1..end];
    let decoded = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" | "#39" => '\'',
        "nbsp" => ' ',
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, end + 1))
}
