//! Sideband - Serial Status Console Firmware
//!
//! RP2040 firmware for a UART-attached status console: a host daemon
//! streams line-framed telemetry which is rendered on a 20x4 character
//! LCD. A rotary encoder scrolls the view, the encoder button enters a
//! host-advertised command menu, and two LEDs show link health.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use sideband_protocol::DeviceMessage;

use crate::channels::OUTBOUND;
use crate::hd44780::Hd44780;

mod channels;
mod hd44780;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Sideband firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Setup LCD on the 4-bit bus (RS=GP8, E=GP9, D4..D7=GP10..GP13)
    let mut lcd = Hd44780::new(
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_9, Level::Low),
        [
            Output::new(p.PIN_10, Level::Low),
            Output::new(p.PIN_11, Level::Low),
            Output::new(p.PIN_12, Level::Low),
            Output::new(p.PIN_13, Level::Low),
        ],
    );
    lcd.init().await;
    info!("LCD initialized");

    // Setup UART for host communication (GP0=TX, GP1=RX)
    let uart_config = UartConfig::default(); // 115200 8-N-1 default

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    // Announce boot to the host, once, after display init.
    OUTBOUND.send(DeviceMessage::StartingUp).await;

    // Setup encoder (GP2=A, GP3=B) and button (GP4), all pulled up
    let enc_a = Input::new(p.PIN_2, Pull::Up);
    let enc_b = Input::new(p.PIN_3, Pull::Up);
    let button = Input::new(p.PIN_4, Pull::Up);

    // Status LEDs: green = data (GP6), red = alert (GP7)
    let green = Output::new(p.PIN_6, Level::Low);
    let red = Output::new(p.PIN_7, Level::Low);

    // Spawn tasks
    spawner.spawn(tasks::uart_rx_task(rx)).unwrap();
    spawner.spawn(tasks::uart_tx_task(tx)).unwrap();
    spawner.spawn(tasks::encoder_task(enc_a, enc_b)).unwrap();
    spawner
        .spawn(tasks::console_task(lcd, button, green, red))
        .unwrap();

    info!("All tasks spawned");
}
