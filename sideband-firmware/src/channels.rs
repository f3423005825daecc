//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy
//! tasks, plus the decoder state shared with the encoder edge handler.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;

use sideband_core::QuadratureDecoder;
use sideband_protocol::{DeviceMessage, Frame};

/// Channel capacity for parsed host frames.
const FRAME_CHANNEL_SIZE: usize = 2;

/// Channel capacity for outbound device messages.
const OUTBOUND_CHANNEL_SIZE: usize = 4;

/// Committed host frames, RX task -> console task.
pub static FRAME_CHANNEL: Channel<CriticalSectionRawMutex, Frame, FRAME_CHANNEL_SIZE> =
    Channel::new();

/// Outbound messages, console task -> TX task. FIFO order guarantees a
/// REQ COMMANDS is on the wire before any SELECT it enabled.
pub static OUTBOUND: Channel<CriticalSectionRawMutex, DeviceMessage, OUTBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Quadrature decoder shared between the encoder edge handler and the
/// console tick. The console drains whole detents inside one lock; the
/// quarter-step residue stays behind, so edges landing mid-drain are
/// never lost.
pub static ENCODER: Mutex<CriticalSectionRawMutex, RefCell<QuadratureDecoder>> =
    Mutex::new(RefCell::new(QuadratureDecoder::new(true, true)));
