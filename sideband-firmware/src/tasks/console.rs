//! Console tick task
//!
//! The cooperative main loop: every 5 ms it drains committed frames and
//! encoder detents into the control plane, polls the button, advances the
//! watchdog, drives the LEDs and repaints the LCD at most once per tick.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_time::{Duration, Instant, Ticker};

use sideband_core::{Console, Screen};
use sideband_core::ui::VISIBLE_ROWS;

use crate::channels::{ENCODER, FRAME_CHANNEL, OUTBOUND};
use crate::hd44780::Hd44780;

/// Loop period. Short enough that button debounce timing stays accurate.
const TICK_INTERVAL_MS: u64 = 5;

/// Console task - owns the control plane and the display
#[embassy_executor::task]
pub async fn console_task(
    mut lcd: Hd44780,
    button: Input<'static>,
    mut green: Output<'static>,
    mut red: Output<'static>,
) {
    info!("Console task started");

    let mut console = Console::new();
    let mut screen = Screen::new();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let start = Instant::now();

    loop {
        ticker.next().await;
        let now = start.elapsed().as_millis() as u32;

        // Committed frames mutate the model atomically within this tick.
        while let Ok(frame) = FRAME_CHANNEL.try_receive() {
            console.on_frame(&frame, now);
        }

        let detents = ENCODER.lock(|enc| enc.borrow_mut().take_movement());
        console.on_movement(detents);

        console.on_button(button.is_low(), now);
        console.tick(now);

        while let Some(msg) = console.take_outbound() {
            if OUTBOUND.try_send(msg).is_err() {
                warn!("Outbound channel full, dropping message");
            }
        }

        let (green_on, red_on) = console.led_levels(now);
        green.set_level(green_on.into());
        red.set_level(red_on.into());

        if console.take_dirty() {
            console.render(&mut screen);
            flush(&mut lcd, &screen).await;
            trace!("Display updated");
        }
    }
}

/// Write the rendered screen out, one full 20-byte row at a time.
async fn flush(lcd: &mut Hd44780, screen: &Screen) {
    for row in 0..VISIBLE_ROWS {
        lcd.set_cursor(0, row as u8).await;
        lcd.print(screen.row(row)).await;
    }
}
