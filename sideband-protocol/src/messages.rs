//! Frame classification and outbound device messages.
//!
//! The first line of a frame selects its kind:
//! - `META k=v ...`: link metadata; recognized key is `interval=<seconds>`.
//! - `COMMANDS v1`: command menu; following lines are `<id> <label>`.
//! - anything else: telemetry, shown verbatim.

use heapless::Vec;

use crate::frame::{Frame, Line};

/// Maximum number of stored menu commands.
pub const MAX_COMMANDS: usize = 12;

/// Maximum bytes kept of a command id.
pub const COMMAND_ID_MAX: usize = 7;

/// Maximum bytes kept of a command label.
pub const COMMAND_LABEL_MAX: usize = 19;

/// Header line introducing a command list frame.
pub const COMMANDS_HEADER: &str = "COMMANDS v1";

const META_KEYWORD: &str = "META";

/// One host-advertised menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub id: heapless::String<COMMAND_ID_MAX>,
    pub label: heapless::String<COMMAND_LABEL_MAX>,
}

/// A classified inbound frame.
#[derive(Debug, PartialEq)]
pub enum HostFrame<'a> {
    /// Metadata frame. `interval` is the validated `interval=` value in
    /// seconds (present and positive), `body` is any trailing telemetry
    /// payload with the META line stripped.
    Meta {
        interval: Option<f32>,
        body: &'a [Line],
    },
    /// Command menu. Malformed entry lines have already been skipped.
    Commands(Vec<Command, MAX_COMMANDS>),
    /// Telemetry: every line is displayed verbatim.
    Telemetry(&'a [Line]),
}

/// Classify a committed frame.
///
/// Only line 0 discriminates, so a frame opening with `COMMANDS v1` is
/// never treated as META and a mid-frame `META` line stays telemetry.
pub fn classify(frame: &Frame) -> HostFrame<'_> {
    let first = frame.first();

    if first == COMMANDS_HEADER {
        let mut commands = Vec::new();
        for line in frame.lines.iter().skip(1) {
            if let Some(cmd) = parse_command(line.as_str()) {
                let _ = commands.push(cmd);
            }
        }
        return HostFrame::Commands(commands);
    }

    if first == META_KEYWORD || first.starts_with("META ") {
        return HostFrame::Meta {
            interval: parse_meta_interval(first),
            body: &frame.lines[1..],
        };
    }

    HostFrame::Telemetry(&frame.lines[..])
}

/// Extract a positive `interval=<seconds>` value from a META line.
fn parse_meta_interval(line: &str) -> Option<f32> {
    for token in line.split_whitespace().skip(1) {
        if let Some(value) = token.strip_prefix("interval=") {
            return value.parse::<f32>().ok().filter(|v| *v > 0.0);
        }
    }
    None
}

/// Parse a `<id> <label>` menu line.
///
/// The id runs up to the first space and must be non-empty; both fields
/// are truncated to their stored widths. Lines with no space are skipped.
fn parse_command(line: &str) -> Option<Command> {
    let (id, label) = line.split_once(' ')?;
    if id.is_empty() {
        return None;
    }

    let mut cmd = Command {
        id: heapless::String::new(),
        label: heapless::String::new(),
    };
    let _ = cmd.id.push_str(&id[..id.len().min(COMMAND_ID_MAX)]);
    let _ = cmd
        .label
        .push_str(&label[..label.len().min(COMMAND_LABEL_MAX)]);
    Some(cmd)
}

/// Messages sent from the console to the host, each one line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMessage {
    /// Emitted once at boot after display init.
    StartingUp,
    /// Request the command menu (long press).
    ReqCommands,
    /// Select a menu entry (double press).
    Select(heapless::String<COMMAND_ID_MAX>),
}

impl DeviceMessage {
    /// Encode as wire bytes, `\n`-terminated. `\r` is never emitted.
    pub fn encode(&self) -> Vec<u8, 24> {
        let mut out = Vec::new();
        match self {
            DeviceMessage::StartingUp => {
                let _ = out.extend_from_slice(b"Starting up\n");
            }
            DeviceMessage::ReqCommands => {
                let _ = out.extend_from_slice(b"REQ COMMANDS\n");
            }
            DeviceMessage::Select(id) => {
                let _ = out.extend_from_slice(b"SELECT ");
                let _ = out.extend_from_slice(id.as_bytes());
                let _ = out.push(b'\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::LineParser;

    fn parse_one(input: &[u8]) -> Frame {
        let mut parser = LineParser::new();
        let mut found = None;
        parser.feed_slice(input, |f| found = Some(f));
        found.expect("input should commit one frame")
    }

    #[test]
    fn test_classify_telemetry() {
        let frame = parse_one(b"cpu 42%\nmem 1.2G\n\n");
        match classify(&frame) {
            HostFrame::Telemetry(lines) => assert_eq!(lines.len(), 2),
            other => panic!("expected telemetry, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_meta_with_interval() {
        let frame = parse_one(b"META interval=2.0\n\n");
        match classify(&frame) {
            HostFrame::Meta { interval, body } => {
                assert_eq!(interval, Some(2.0));
                assert!(body.is_empty());
            }
            other => panic!("expected meta, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_meta_with_body() {
        let frame = parse_one(b"META interval=1.5\nA\nB\n\n");
        match classify(&frame) {
            HostFrame::Meta { interval, body } => {
                assert_eq!(interval, Some(1.5));
                assert_eq!(body.len(), 2);
                assert_eq!(body[0].as_str(), "A");
            }
            other => panic!("expected meta, got {:?}", other),
        }
    }

    #[test]
    fn test_meta_malformed_interval_rejected() {
        for input in [
            b"META interval=0\n\n".as_slice(),
            b"META interval=-3\n\n",
            b"META interval=abc\n\n",
            b"META other=1\n\n",
            b"META\n\n",
        ] {
            let frame = parse_one(input);
            match classify(&frame) {
                HostFrame::Meta { interval, .. } => assert_eq!(interval, None),
                other => panic!("expected meta, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_meta_requires_keyword_boundary() {
        let frame = parse_one(b"METALLICA\n\n");
        assert!(matches!(classify(&frame), HostFrame::Telemetry(_)));
    }

    #[test]
    fn test_mid_frame_meta_stays_telemetry() {
        let frame = parse_one(b"load 0.3\nMETA interval=9\n\n");
        assert!(matches!(classify(&frame), HostFrame::Telemetry(_)));
    }

    #[test]
    fn test_classify_commands() {
        let frame = parse_one(b"COMMANDS v1\n7 Reboot now\n9 Shutdown\n\n");
        match classify(&frame) {
            HostFrame::Commands(cmds) => {
                assert_eq!(cmds.len(), 2);
                assert_eq!(cmds[0].id.as_str(), "7");
                assert_eq!(cmds[0].label.as_str(), "Reboot now");
                assert_eq!(cmds[1].id.as_str(), "9");
            }
            other => panic!("expected commands, got {:?}", other),
        }
    }

    #[test]
    fn test_commands_header_beats_meta() {
        let frame = parse_one(b"COMMANDS v1\nMETA interval=5\n\n");
        match classify(&frame) {
            // "META interval=5" parses as id "META", label "interval=5"
            HostFrame::Commands(cmds) => assert_eq!(cmds[0].id.as_str(), "META"),
            other => panic!("expected commands, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_command_lines_skipped() {
        let frame = parse_one(b"COMMANDS v1\nnospace\n ledby-space\nok Fine\n\n");
        match classify(&frame) {
            HostFrame::Commands(cmds) => {
                assert_eq!(cmds.len(), 1);
                assert_eq!(cmds[0].id.as_str(), "ok");
            }
            other => panic!("expected commands, got {:?}", other),
        }
    }

    #[test]
    fn test_command_id_truncated() {
        // Line arrives already capped at 20 bytes, so only the id cap bites.
        let frame = parse_one(b"COMMANDS v1\nlongerid A too long!\n\n");
        match classify(&frame) {
            HostFrame::Commands(cmds) => {
                assert_eq!(cmds[0].id.as_str(), "longeri");
                assert_eq!(cmds[0].label.as_str(), "A too long!");
            }
            other => panic!("expected commands, got {:?}", other),
        }
    }

    #[test]
    fn test_device_message_encoding() {
        assert_eq!(DeviceMessage::StartingUp.encode(), b"Starting up\n");
        assert_eq!(DeviceMessage::ReqCommands.encode(), b"REQ COMMANDS\n");

        let mut id = heapless::String::new();
        let _ = id.push_str("9");
        assert_eq!(DeviceMessage::Select(id).encode(), b"SELECT 9\n");
    }
}
