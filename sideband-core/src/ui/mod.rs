//! UI model: display mode, scroll position, command menu cursor.
//!
//! `mode` is what the screen shows; `requested_mode` is what the operator
//! asked for. They differ while the command menu is being fetched: a long
//! press requests `Commands` but the mode stays `CommandsWaiting` until
//! the host's COMMANDS frame lands.

pub mod render;

use heapless::Vec;
use sideband_protocol::{Command, MAX_COMMANDS};

pub use render::Screen;

/// Visible display rows.
pub const VISIBLE_ROWS: usize = 4;

/// What the screen currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Telemetry,
    CommandsWaiting,
    Commands,
}

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestedMode {
    Telemetry,
    Commands,
}

/// Mutable UI state owned by the main loop.
#[derive(Debug)]
pub struct UiModel {
    pub mode: Mode,
    pub requested_mode: RequestedMode,
    /// Top visible telemetry line, clamped to `[0, size - 4]`.
    pub scroll: usize,
    pub commands: Vec<Command, MAX_COMMANDS>,
    /// Selected menu entry; `commands.len()` selects the synthetic Exit.
    pub cursor_index: usize,
    /// Top-most visible menu index.
    pub window_start: usize,
}

impl UiModel {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Telemetry,
            requested_mode: RequestedMode::Telemetry,
            scroll: 0,
            commands: Vec::new(),
            cursor_index: 0,
            window_start: 0,
        }
    }

    /// Navigable menu entries, including the synthetic Exit.
    pub fn menu_total(&self) -> usize {
        self.commands.len() + 1
    }

    /// True when the cursor sits on the synthetic Exit entry.
    pub fn cursor_on_exit(&self) -> bool {
        self.cursor_index == self.commands.len()
    }

    /// Scroll the telemetry view by whole detents.
    pub fn scroll_by(&mut self, detents: i16, buffer_len: usize) {
        let max = buffer_len.saturating_sub(VISIBLE_ROWS) as i32;
        let target = self.scroll as i32 + detents as i32;
        self.scroll = target.clamp(0, max) as usize;
    }

    /// Re-clamp the scroll position after the buffer was repopulated,
    /// keeping the operator's view where possible.
    pub fn clamp_scroll(&mut self, buffer_len: usize) {
        let max = buffer_len.saturating_sub(VISIBLE_ROWS);
        self.scroll = self.scroll.min(max);
    }

    /// Move the menu cursor one step in the direction of `detents`,
    /// shifting the window the minimum amount that keeps the cursor
    /// visible.
    pub fn move_cursor(&mut self, detents: i16) {
        if detents == 0 {
            return;
        }
        let last = self.menu_total() - 1;
        self.cursor_index = if detents > 0 {
            (self.cursor_index + 1).min(last)
        } else {
            self.cursor_index.saturating_sub(1)
        };

        if self.cursor_index < self.window_start {
            self.window_start = self.cursor_index;
        } else if self.cursor_index >= self.window_start + VISIBLE_ROWS {
            self.window_start = self.cursor_index + 1 - VISIBLE_ROWS;
        }
        self.window_start = self
            .window_start
            .min(self.menu_total().saturating_sub(VISIBLE_ROWS));
    }

    /// Long press in telemetry: ask the host for its menu.
    pub fn enter_commands_waiting(&mut self) {
        self.requested_mode = RequestedMode::Commands;
        self.mode = Mode::CommandsWaiting;
        self.cursor_index = 0;
        self.window_start = 0;
    }

    /// A COMMANDS frame landed: show the menu.
    pub fn load_commands(&mut self, commands: Vec<Command, MAX_COMMANDS>) {
        self.commands = commands;
        self.cursor_index = 0;
        self.window_start = 0;
        self.requested_mode = RequestedMode::Commands;
        self.mode = Mode::Commands;
    }

    /// Leave the menu (long press, or Exit selected).
    pub fn to_telemetry(&mut self) {
        self.requested_mode = RequestedMode::Telemetry;
        self.mode = Mode::Telemetry;
        self.scroll = 0;
    }

    /// Watchdog trip: back to a pristine telemetry view.
    pub fn reset_link_lost(&mut self) {
        self.mode = Mode::Telemetry;
        self.requested_mode = RequestedMode::Telemetry;
        self.commands.clear();
        self.cursor_index = 0;
        self.window_start = 0;
        self.scroll = 0;
    }
}

impl Default for UiModel {
    fn default() -> Self {
        Self::new()
    }
}
