//! Host UART receive task
//!
//! Drains the buffered UART into the streaming line parser and hands
//! committed frames to the console task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{Duration, Timer};
use embedded_io_async::Read;

use sideband_protocol::LineParser;

use crate::channels::FRAME_CHANNEL;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Host RX task - parses the inbound byte stream into frames
#[embassy_executor::task]
pub async fn uart_rx_task(mut rx: BufferedUartRx) {
    info!("UART RX task started");

    let mut parser = LineParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    if let Some(frame) = parser.feed(byte) {
                        debug!("Frame committed: {} line(s)", frame.lines.len());
                        FRAME_CHANNEL.send(frame).await;
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
                Timer::after(Duration::from_millis(10)).await;
            }
        }
    }
}
