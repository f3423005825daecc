//! Host UART transmit task
//!
//! Serializes outbound device messages onto the wire in queue order.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::OUTBOUND;

/// Host TX task - writes queued device messages
#[embassy_executor::task]
pub async fn uart_tx_task(mut tx: BufferedUartTx) {
    info!("UART TX task started");

    loop {
        let msg = OUTBOUND.receive().await;
        let bytes = msg.encode();
        match tx.write_all(&bytes).await {
            Ok(()) => trace!("TX: {} bytes", bytes.len()),
            Err(e) => warn!("UART write error: {:?}", e),
        }
    }
}
