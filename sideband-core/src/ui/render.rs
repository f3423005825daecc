//! Screen renderer.
//!
//! A pure projection of (mode, model, link liveness, animation phase)
//! into a 4×20 character screen. The firmware flushes the screen to the
//! LCD; tests read the rows directly. Every row is always exactly 20
//! bytes, space-padded.

use core::fmt::Write;

use crate::buffer::ScrollBuffer;
use crate::link::LinkSupervisor;
use crate::ui::{Mode, UiModel, VISIBLE_ROWS};

/// Display columns.
pub const COLS: usize = 20;

/// Waiting-screen spinner glyphs, one per animation phase.
const SPINNER: [u8; 4] = [b'|', b'/', b'-', b'\\'];

/// In-memory 4×20 screen buffer.
pub struct Screen {
    rows: [[u8; COLS]; VISIBLE_ROWS],
}

impl Screen {
    pub const fn new() -> Self {
        Self {
            rows: [[b' '; COLS]; VISIBLE_ROWS],
        }
    }

    pub fn clear(&mut self) {
        self.rows = [[b' '; COLS]; VISIBLE_ROWS];
    }

    /// Overwrite a row with `text`, truncated and space-padded to 20.
    fn set_row(&mut self, row: usize, text: &[u8]) {
        let line = &mut self.rows[row];
        line.fill(b' ');
        let len = text.len().min(COLS);
        line[..len].copy_from_slice(&text[..len]);
    }

    /// Raw row bytes, always exactly 20.
    pub fn row(&self, row: usize) -> &[u8; COLS] {
        &self.rows[row]
    }

    /// Row as `&str`; rows only ever hold printable ASCII.
    pub fn row_str(&self, row: usize) -> &str {
        core::str::from_utf8(&self.rows[row]).unwrap_or("")
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the current UI state into `screen`.
pub fn paint(model: &UiModel, buffer: &ScrollBuffer, link: &LinkSupervisor, screen: &mut Screen) {
    screen.clear();

    if !link.have_data() {
        paint_waiting(link, screen);
        return;
    }

    match model.mode {
        Mode::Telemetry => {
            for row in 0..VISIBLE_ROWS {
                screen.set_row(row, buffer.get(model.scroll + row));
            }
        }
        Mode::CommandsWaiting => {
            screen.set_row(0, b"> Loading commands...");
        }
        Mode::Commands => paint_menu(model, screen),
    }
}

fn paint_waiting(link: &LinkSupervisor, screen: &mut Screen) {
    let row0 = &mut screen.rows[0];
    row0[..16].copy_from_slice(b"Waiting for data");
    row0[COLS - 1] = SPINNER[(link.wait_anim() & 3) as usize];

    let mut line: heapless::String<COLS> = heapless::String::new();
    let timeout_ms = link.display_timeout_ms();
    if timeout_ms == 0 {
        let _ = line.push_str("Timeout: --");
    } else {
        let _ = write!(line, "Timeout: {}s", (timeout_ms + 500) / 1000);
    }
    screen.set_row(1, line.as_bytes());
}

fn paint_menu(model: &UiModel, screen: &mut Screen) {
    let total = model.menu_total();
    for row in 0..VISIBLE_ROWS {
        let idx = model.window_start + row;
        if idx >= total {
            continue;
        }
        let line = &mut screen.rows[row];
        line[0] = if idx == model.cursor_index { b'>' } else { b' ' };
        let label = if idx == model.commands.len() {
            "Exit"
        } else {
            model.commands[idx].label.as_str()
        };
        let len = label.len().min(COLS - 2);
        line[2..2 + len].copy_from_slice(&label.as_bytes()[..len]);
    }
}
