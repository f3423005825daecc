//! Frame grammar and streaming parser.
//!
//! Frames are groups of newline-terminated lines ending with a blank line.
//! The parser is fed one byte at a time from the UART and never fails:
//! every malformed input degrades (truncated line, dropped byte, dropped
//! overflow line) rather than erroring, so the return type is simply
//! `Option<Frame>`.

use heapless::Vec;

/// Maximum content bytes per line (the display is 20 columns wide).
pub const LINE_WIDTH: usize = 20;

/// Maximum lines per frame.
pub const FRAME_MAX_LINES: usize = 12;

/// One display line: 0..20 bytes of printable ASCII.
pub type Line = heapless::String<LINE_WIDTH>;

/// A complete frame: 1..12 lines.
///
/// The parser only ever emits non-empty frames; a blank line with nothing
/// accumulated is a no-op on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub lines: Vec<Line, FRAME_MAX_LINES>,
}

impl Frame {
    /// First line of the frame. Frames from the parser have at least one.
    pub fn first(&self) -> &str {
        self.lines.first().map(|l| l.as_str()).unwrap_or("")
    }
}

/// Streaming line/frame parser.
///
/// Holds a line staging buffer and a frame staging array. For each byte:
/// - `\r` is ignored,
/// - `\n` terminates the current line, or commits the frame when the line
///   staging is empty,
/// - printable ASCII accumulates into the line staging while it has room,
/// - everything else is dropped (the display has no glyph for it).
#[derive(Debug, Default)]
pub struct LineParser {
    line: Line,
    lines: Vec<Line, FRAME_MAX_LINES>,
}

impl LineParser {
    pub const fn new() -> Self {
        Self {
            line: heapless::String::new(),
            lines: Vec::new(),
        }
    }

    /// Feed a single byte.
    ///
    /// Returns `Some(frame)` when a blank line commits a non-empty frame.
    /// Oversize lines are truncated at [`LINE_WIDTH`]; lines beyond
    /// [`FRAME_MAX_LINES`] are dropped whole.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match byte {
            b'\r' => None,
            b'\n' => {
                if self.line.is_empty() {
                    if self.lines.is_empty() {
                        return None;
                    }
                    let lines = core::mem::take(&mut self.lines);
                    Some(Frame { lines })
                } else {
                    let line = core::mem::take(&mut self.line);
                    let _ = self.lines.push(line);
                    None
                }
            }
            0x20..=0x7E => {
                let _ = self.line.push(byte as char);
                None
            }
            _ => None,
        }
    }

    /// Feed a byte slice, invoking `commit` for every completed frame.
    pub fn feed_slice(&mut self, bytes: &[u8], mut commit: impl FnMut(Frame)) {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte) {
                commit(frame);
            }
        }
    }
}
