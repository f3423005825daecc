//! The console aggregate: everything the 5 ms loop owns.
//!
//! One struct ties the scroll buffer, UI model, gesture classifier and
//! link supervisor together and routes committed frames into them. The
//! firmware task feeds it frames, encoder detents, button levels and
//! ticks; it answers with a dirty flag, outbound messages and LED levels.
//! No hardware types appear here, so the whole control plane runs on the
//! host under test.

use heapless::Deque;
use sideband_protocol::{classify, DeviceMessage, Frame, HostFrame, Line};

use crate::buffer::ScrollBuffer;
use crate::input::{ButtonClassifier, Gesture};
use crate::link::{LinkEvent, LinkSupervisor};
use crate::ui::{render, Mode, RequestedMode, Screen, UiModel};

/// Line shown after a watchdog trip until fresh telemetry arrives.
const WAITING_LINE: &[u8] = b"Waiting for data...";

/// Pending outbound messages; drained every tick.
const OUTBOUND_DEPTH: usize = 4;

pub struct Console {
    buffer: ScrollBuffer,
    model: UiModel,
    button: ButtonClassifier,
    link: LinkSupervisor,
    outbound: Deque<DeviceMessage, OUTBOUND_DEPTH>,
    dirty: bool,
}

impl Console {
    pub fn new() -> Self {
        Self {
            buffer: ScrollBuffer::new(),
            model: UiModel::new(),
            button: ButtonClassifier::new(),
            link: LinkSupervisor::new(),
            outbound: Deque::new(),
            // Paint the waiting screen on the first tick.
            dirty: true,
        }
    }

    /// Route a committed frame by its first line.
    pub fn on_frame(&mut self, frame: &Frame, now: u32) {
        let was_live = self.link.have_data();

        match classify(frame) {
            HostFrame::Meta { interval, body } => {
                if let Some(seconds) = interval {
                    self.link.apply_meta(seconds);
                }
                if body.is_empty() {
                    // Keepalive: liveness refresh only, no green pulse and
                    // no repaint of telemetry content.
                    self.link.frame_received(now, false);
                    if !was_live {
                        self.dirty = true;
                    }
                } else {
                    self.commit_telemetry(body, now);
                }
            }
            HostFrame::Commands(commands) => {
                self.model.load_commands(commands);
                self.link.frame_received(now, false);
                self.dirty = true;
            }
            HostFrame::Telemetry(lines) => self.commit_telemetry(lines, now),
        }
    }

    fn commit_telemetry(&mut self, lines: &[Line], now: u32) {
        self.buffer.clear();
        for line in lines {
            self.buffer.push(line.as_bytes());
        }
        // Keep the operator's view, re-clamped to the new frame.
        self.model.clamp_scroll(self.buffer.size());
        if self.model.requested_mode == RequestedMode::Telemetry {
            self.model.mode = Mode::Telemetry;
        }
        self.link.frame_received(now, true);
        self.dirty = true;
    }

    /// Apply drained encoder detents.
    pub fn on_movement(&mut self, detents: i16) {
        if detents == 0 {
            return;
        }
        match self.model.mode {
            Mode::Telemetry => self.model.scroll_by(detents, self.buffer.size()),
            Mode::Commands | Mode::CommandsWaiting => self.model.move_cursor(detents),
        }
        self.dirty = true;
    }

    /// Feed the debounced button level for this tick.
    pub fn on_button(&mut self, pressed: bool, now: u32) {
        if let Some(gesture) = self.button.update(pressed, now) {
            self.on_gesture(gesture, now);
        }
    }

    fn on_gesture(&mut self, gesture: Gesture, now: u32) {
        match gesture {
            Gesture::Long => match self.model.mode {
                Mode::Telemetry => {
                    self.model.enter_commands_waiting();
                    self.send(DeviceMessage::ReqCommands);
                    self.dirty = true;
                }
                Mode::Commands | Mode::CommandsWaiting => {
                    self.model.to_telemetry();
                    self.dirty = true;
                }
            },
            Gesture::Double => {
                if self.model.mode != Mode::Commands {
                    return;
                }
                if self.model.cursor_on_exit() {
                    self.model.to_telemetry();
                    self.dirty = true;
                } else {
                    let id = self.model.commands[self.model.cursor_index].id.clone();
                    self.send(DeviceMessage::Select(id));
                    self.link.red_ack(now);
                }
            }
            // Single short presses have no effect in the current UI.
            Gesture::Short => {}
        }
    }

    /// Advance timers; handles the watchdog trip and waiting animation.
    pub fn tick(&mut self, now: u32) {
        match self.link.tick(now) {
            Some(LinkEvent::Lost) => {
                self.model.reset_link_lost();
                self.buffer.clear();
                self.buffer.push(WAITING_LINE);
                self.dirty = true;
            }
            Some(LinkEvent::AnimAdvanced) => self.dirty = true,
            None => {}
        }
    }

    /// Take the repaint flag; at most one paint per tick.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Project the current state into `screen`.
    pub fn render(&self, screen: &mut Screen) {
        render::paint(&self.model, &self.buffer, &self.link, screen);
    }

    /// Next queued outbound message, oldest first.
    pub fn take_outbound(&mut self) -> Option<DeviceMessage> {
        self.outbound.pop_front()
    }

    /// (green, red) LED levels for this instant.
    pub fn led_levels(&self, now: u32) -> (bool, bool) {
        (self.link.green_lit(now), self.link.red_lit(now))
    }

    fn send(&mut self, msg: DeviceMessage) {
        // Depth covers every gesture the loop can produce per drain.
        let _ = self.outbound.push_back(msg);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sideband_protocol::LineParser;

    /// Feed raw serial bytes, committing frames at time `now`.
    fn feed(console: &mut Console, parser: &mut LineParser, bytes: &[u8], now: u32) {
        for &byte in bytes {
            if let Some(frame) = parser.feed(byte) {
                console.on_frame(&frame, now);
            }
        }
    }

    fn rendered(console: &Console) -> Screen {
        let mut screen = Screen::new();
        console.render(&mut screen);
        screen
    }

    fn long_press(console: &mut Console, at: u32) {
        console.on_button(true, at);
        console.on_button(false, at + 800);
    }

    fn double_press(console: &mut Console, at: u32) {
        console.on_button(true, at);
        console.on_button(false, at + 50);
        console.on_button(true, at + 150);
        console.on_button(false, at + 250);
    }

    #[test]
    fn test_boot_shows_waiting_screen() {
        let mut console = Console::new();
        assert!(console.take_dirty());

        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "Waiting for data   |");
        assert_eq!(screen.row_str(1), "Timeout: --         ");

        // 250 ms later the spinner advances and the red LED breathes.
        console.tick(250);
        assert!(console.take_dirty());
        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "Waiting for data   /");
        assert_eq!(console.led_levels(250), (false, true));
    }

    #[test]
    fn test_first_telemetry_frame() {
        let mut console = Console::new();
        let mut parser = LineParser::new();
        console.take_dirty();

        feed(&mut console, &mut parser, b"L1\nL2\nL3\n\n", 100);
        assert!(console.take_dirty());

        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "L1                  ");
        assert_eq!(screen.row_str(1), "L2                  ");
        assert_eq!(screen.row_str(2), "L3                  ");
        assert_eq!(screen.row_str(3), "                    ");

        // Green data pulse for 120 ms.
        assert_eq!(console.led_levels(100), (true, false));
        assert_eq!(console.led_levels(100 + 120), (false, false));
    }

    #[test]
    fn test_meta_then_telemetry_body() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"META interval=2.0\nA\n\n", 0);
        assert_eq!(console.link.heartbeat_interval_ms(), 2000);
        assert_eq!(console.link.frame_timeout_ms(), 20_000);

        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "A                   ");
        // The body counted as a telemetry commit.
        assert!(console.led_levels(10).0);
    }

    #[test]
    fn test_meta_only_keepalive() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"x\n\n", 0);
        console.take_dirty();

        // Keepalive at 9 s holds the link without touching the buffer.
        feed(&mut console, &mut parser, b"META interval=1.0\n\n", 9_000);
        assert!(!console.led_levels(9_001).0);
        assert!(!console.take_dirty());

        console.tick(12_000);
        assert!(console.link.have_data());
        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "x                   ");
    }

    #[test]
    fn test_meta_payload_equivalent_to_plain_telemetry() {
        let mut with_meta = Console::new();
        let mut plain = Console::new();
        let mut p1 = LineParser::new();
        let mut p2 = LineParser::new();

        feed(&mut with_meta, &mut p1, b"META interval=2.0\nA\nB\n\n", 0);
        feed(&mut plain, &mut p2, b"A\nB\n\n", 0);

        let s1 = rendered(&with_meta);
        let s2 = rendered(&plain);
        for row in 0..4 {
            assert_eq!(s1.row(row), s2.row(row));
        }
    }

    #[test]
    fn test_commands_entry_flow() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"up 3d\n\n", 0);

        // Long press requests the menu.
        long_press(&mut console, 1_000);
        assert_eq!(console.take_outbound(), Some(DeviceMessage::ReqCommands));
        assert_eq!(console.take_outbound(), None);
        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "> Loading commands..");

        // Host answers with the menu.
        feed(
            &mut console,
            &mut parser,
            b"COMMANDS v1\n7 Reboot now\n9 Shutdown\n\n",
            2_000,
        );
        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "> Reboot now        ");
        assert_eq!(screen.row_str(1), "  Shutdown          ");
        assert_eq!(screen.row_str(2), "  Exit              ");
        assert_eq!(screen.row_str(3), "                    ");
        // COMMANDS refreshes the watchdog without the green pulse.
        assert!(!console.led_levels(2_001).0);

        // One detent down selects Shutdown; double press fires it.
        console.on_movement(1);
        double_press(&mut console, 3_000);
        match console.take_outbound() {
            Some(DeviceMessage::Select(id)) => assert_eq!(id.as_str(), "9"),
            other => panic!("expected SELECT, got {:?}", other),
        }
        // Red ack pulse for 150 ms.
        assert!(console.led_levels(3_300).1);
        assert!(!console.led_levels(3_250 + 150).1);
    }

    #[test]
    fn test_double_press_on_exit_returns_to_telemetry() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"t\n\n", 0);
        long_press(&mut console, 1_000);
        assert_eq!(console.take_outbound(), Some(DeviceMessage::ReqCommands));
        feed(&mut console, &mut parser, b"COMMANDS v1\n1 One\n\n", 2_000);

        console.on_movement(1); // cursor on Exit
        double_press(&mut console, 3_000);
        assert_eq!(console.take_outbound(), None);
        assert_eq!(console.model.mode, Mode::Telemetry);
        assert_eq!(console.model.requested_mode, RequestedMode::Telemetry);
    }

    #[test]
    fn test_long_press_leaves_menu_and_resets_scroll() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        let mut frame = heapless::Vec::<u8, 64>::new();
        for i in 0..8u8 {
            let _ = frame.push(b'0' + i);
            let _ = frame.push(b'\n');
        }
        let _ = frame.push(b'\n');
        feed(&mut console, &mut parser, &frame, 0);

        console.on_movement(3);
        assert_eq!(console.model.scroll, 3);

        long_press(&mut console, 1_000);
        long_press(&mut console, 3_000);
        assert_eq!(console.model.mode, Mode::Telemetry);
        assert_eq!(console.model.scroll, 0);
    }

    #[test]
    fn test_telemetry_refresh_preserves_scroll_view() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        let mut frame = heapless::Vec::<u8, 64>::new();
        for i in 0..12u8 {
            let _ = frame.push(b'a' + i);
            let _ = frame.push(b'\n');
        }
        let _ = frame.push(b'\n');
        feed(&mut console, &mut parser, &frame, 0);

        console.on_movement(5);
        assert_eq!(console.model.scroll, 5);

        // A shorter frame arrives: the view is re-clamped, not reset.
        feed(&mut console, &mut parser, b"1\n2\n3\n4\n5\n6\n\n", 1_000);
        assert_eq!(console.model.scroll, 2);
        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "3                   ");
    }

    #[test]
    fn test_commands_frame_while_in_telemetry_opens_menu() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"t\n\n", 0);
        feed(&mut console, &mut parser, b"COMMANDS v1\n1 One\n\n", 100);
        assert_eq!(console.model.mode, Mode::Commands);
        assert_eq!(console.model.requested_mode, RequestedMode::Commands);
    }

    #[test]
    fn test_telemetry_while_waiting_for_menu_does_not_steal_mode() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"t\n\n", 0);
        long_press(&mut console, 1_000);
        assert_eq!(console.model.mode, Mode::CommandsWaiting);

        // Telemetry keeps flowing while the menu request is in flight.
        feed(&mut console, &mut parser, b"u\n\n", 2_000);
        assert_eq!(console.model.mode, Mode::CommandsWaiting);
        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "> Loading commands..");
    }

    #[test]
    fn test_watchdog_trip_resets_everything() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"t\n\n", 0);
        long_press(&mut console, 1_000);
        feed(&mut console, &mut parser, b"COMMANDS v1\n1 One\n\n", 2_000);
        console.take_dirty();

        // Silence past the default 10 s timeout (from the last frame).
        console.tick(12_000);
        console.tick(12_001);
        console.tick(12_005);

        assert!(console.take_dirty());
        assert!(!console.link.have_data());
        assert_eq!(console.model.mode, Mode::Telemetry);
        assert!(console.model.commands.is_empty());
        assert_eq!(console.led_levels(12_005), (false, false));

        let screen = rendered(&console);
        assert_eq!(screen.row_str(0), "Waiting for data   |");
        // No META was ever seen, so no timeout is advertised.
        assert_eq!(screen.row_str(1), "Timeout: --         ");

        // The buffer now holds the placeholder line for when the host
        // comes back in telemetry mode.
        assert_eq!(console.buffer.get(0), b"Waiting for data...");
    }

    #[test]
    fn test_trip_uses_meta_timeout() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"META interval=2.0\nA\n\n", 0);
        console.tick(20_000);
        assert!(console.link.have_data());
        console.tick(20_001);
        assert!(!console.link.have_data());
    }

    #[test]
    fn test_scrolling_does_not_touch_liveness() {
        let mut console = Console::new();
        let mut parser = LineParser::new();

        feed(&mut console, &mut parser, b"a\nb\nc\nd\ne\n\n", 0);
        for t in 0..5u32 {
            console.on_movement(1);
            console.tick(9_990 + t);
        }
        // Scrolling kept repainting but the watchdog still trips on time.
        console.tick(10_001);
        assert!(!console.link.have_data());
    }
}
