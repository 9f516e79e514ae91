//! Step tick task
//!
//! Runs the motion engine tick at the configured fixed rate on the
//! highest-priority executor.

use defmt::*;
use embassy_time::{Duration, Ticker};

use tribed_core::MotionEngine;

use crate::board::Steppers;

/// Step tick task - one engine tick per period
#[embassy_executor::task]
pub async fn step_tick_task(engine: &'static MotionEngine, mut steppers: Steppers) {
    let period_us = engine.config().tick_period_us;
    info!("Step tick task started ({}us period)", period_us);

    let mut ticker = Ticker::every(Duration::from_micros(period_us as u64));

    loop {
        ticker.next().await;
        engine.tick(&mut steppers);
    }
}
