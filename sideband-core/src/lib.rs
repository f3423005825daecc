//! Board-agnostic control plane for the sideband status console
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Scroll buffer for the most recent telemetry frame
//! - Quadrature decoder state machine
//! - Button debounce and gesture classification
//! - Link watchdog, LED pulses and waiting animation
//! - UI model (mode, scroll, command cursor) and screen renderer
//! - The `Console` aggregate driven by the firmware's 5 ms tick
//!
//! Everything here runs identically on the host, which is where the test
//! suite lives.

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod console;
pub mod decoder;
pub mod input;
pub mod link;
pub mod ui;

pub use buffer::ScrollBuffer;
pub use console::Console;
pub use decoder::QuadratureDecoder;
pub use input::{ButtonClassifier, Gesture};
pub use link::LinkSupervisor;
pub use ui::{Mode, Screen, UiModel};
