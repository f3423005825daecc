//! Encoder edge task
//!
//! Waits on either encoder pin changing, samples both pins and feeds the
//! shared quadrature decoder. This is the interrupt-context half of the
//! decoder; the console task drains detents on its tick.

use defmt::*;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;

use crate::channels::ENCODER;

/// Encoder edge task - decodes quadrature transitions
#[embassy_executor::task]
pub async fn encoder_task(mut a: Input<'static>, mut b: Input<'static>) {
    info!("Encoder task started");

    // Seed the decoder with the pins' actual idle state.
    {
        let (level_a, level_b) = (a.is_high(), b.is_high());
        ENCODER.lock(|enc| *enc.borrow_mut() = sideband_core::QuadratureDecoder::new(level_a, level_b));
    }

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;

        let (level_a, level_b) = (a.is_high(), b.is_high());
        ENCODER.lock(|enc| enc.borrow_mut().on_edge(level_a, level_b));
    }
}
