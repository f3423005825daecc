//! Sideband host link protocol
//!
//! This crate defines the line-oriented UART protocol between the host
//! daemon and the sideband console. The host pushes *frames*: short groups
//! of display lines terminated by a blank line.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌──────────┬──────────┬─────┬──────────┬───────────┐
//! │ LINE \n  │ LINE \n  │ ... │ LINE \n  │ \n (blank)│
//! │ ≤20 B    │ ≤20 B    │     │ ≤20 B    │           │
//! └──────────┴──────────┴─────┴──────────┴───────────┘
//! ```
//!
//! A frame carries 1..12 lines of printable ASCII. The first line selects
//! the frame kind: `META ...` (link metadata), `COMMANDS v1` (command menu),
//! anything else is telemetry shown verbatim. The console answers with
//! single-line messages (`REQ COMMANDS`, `SELECT <id>`).
//!
//! There is no checksum and no flow control; a stalled host is detected by
//! the console's frame watchdog, not by the wire format.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{Frame, Line, LineParser, FRAME_MAX_LINES, LINE_WIDTH};
pub use messages::{classify, Command, DeviceMessage, HostFrame, MAX_COMMANDS};
