//! Limit sensor task
//!
//! Latches sensor edges into the limit monitor and mirrors the sticky state
//! onto the external endstop output. The levels are also sampled on every
//! refresh so a press whose edge was missed still latches.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::Timer;

use tribed_core::MotionEngine;

use crate::board::{Endstop, Limits};

/// Sampling period when no edge arrives
///
/// Sticky bits are also cleared from the main context.
const SAMPLE_PERIOD_MS: u64 = 5;

#[embassy_executor::task]
pub async fn limits_task(
    engine: &'static MotionEngine,
    mut limits: Limits,
    mut endstop: Endstop,
) {
    info!("Limits task started");

    let sticky = limits.latch(engine.limits());
    endstop.set(sticky.any());

    loop {
        match select(limits.wait_for_change(), Timer::after_millis(SAMPLE_PERIOD_MS)).await {
            Either::First(levels) => {
                let sticky = engine.limits().on_edge(levels);
                endstop.set(sticky.any());
                debug!("Limit levels {:b}, sticky {:b}", levels.bits(), sticky.bits());
            }
            Either::Second(()) => {
                let sticky = limits.latch(engine.limits());
                endstop.set(sticky.any());
            }
        }
    }
}
