//! HD44780 Character LCD Driver
//!
//! Driver for 20x4 HD44780-compatible character LCDs on a 4-bit GPIO bus
//! (RS, E, D4..D7; R/W tied to ground). Timing follows the datasheet's
//! worst-case execution times rather than polling the busy flag.

use embassy_rp::gpio::Output;
use embassy_time::Timer;

/// HD44780 commands
#[allow(dead_code)]
mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const HOME: u8 = 0x02;
    pub const ENTRY_MODE: u8 = 0x04;
    pub const ENTRY_INCREMENT: u8 = 0x02;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const CURSOR_ON: u8 = 0x02;
    pub const BLINK_ON: u8 = 0x01;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const FUNCTION_4BIT_2LINE: u8 = 0x08;
    pub const SET_DDRAM_ADDR: u8 = 0x80;
}

/// DDRAM base address of each display row.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// HD44780 driver over six push-pull outputs.
pub struct Hd44780 {
    rs: Output<'static>,
    en: Output<'static>,
    data: [Output<'static>; 4],
}

impl Hd44780 {
    pub fn new(rs: Output<'static>, en: Output<'static>, data: [Output<'static>; 4]) -> Self {
        Self { rs, en, data }
    }

    /// Run the 4-bit initialization dance and configure the display.
    pub async fn init(&mut self) {
        // Controller needs >40 ms after power-on before it accepts input.
        Timer::after_millis(50).await;
        self.rs.set_low();

        // Three 8-bit function-set probes, then the switch to 4-bit mode.
        self.write_nibble(0x3).await;
        Timer::after_millis(5).await;
        self.write_nibble(0x3).await;
        Timer::after_micros(150).await;
        self.write_nibble(0x3).await;
        Timer::after_micros(150).await;
        self.write_nibble(0x2).await;
        Timer::after_micros(150).await;

        self.command(cmd::FUNCTION_SET | cmd::FUNCTION_4BIT_2LINE).await;
        self.command(cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON).await;
        self.command(cmd::ENTRY_MODE | cmd::ENTRY_INCREMENT).await;
        self.clear().await;
    }

    /// Blank the display and return the cursor home.
    pub async fn clear(&mut self) {
        self.command(cmd::CLEAR).await;
        // Clear is the one slow instruction (~1.5 ms).
        Timer::after_millis(2).await;
    }

    /// Move the write position to `(col, row)`.
    pub async fn set_cursor(&mut self, col: u8, row: u8) {
        let row = (row as usize).min(ROW_OFFSETS.len() - 1);
        self.command(cmd::SET_DDRAM_ADDR | (ROW_OFFSETS[row] + col)).await;
    }

    /// Write bytes at the current position.
    pub async fn print(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte, true).await;
        }
    }

    async fn command(&mut self, command: u8) {
        self.write_byte(command, false).await;
    }

    async fn write_byte(&mut self, byte: u8, is_data: bool) {
        if is_data {
            self.rs.set_high();
        } else {
            self.rs.set_low();
        }
        self.write_nibble(byte >> 4).await;
        self.write_nibble(byte & 0x0F).await;
        // Worst-case instruction execution time.
        Timer::after_micros(50).await;
    }

    async fn write_nibble(&mut self, nibble: u8) {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << bit) != 0 {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
        // Latch on the falling edge of E.
        self.en.set_high();
        Timer::after_micros(1).await;
        self.en.set_low();
        Timer::after_micros(1).await;
    }
}
