//! Abort input task
//!
//! An asserted abort line raises the hard fault immediately from interrupt
//! context and wakes the controller task to run the reset path.

use defmt::*;
use embassy_time::Timer;

use tribed_core::MotionEngine;

use crate::board::Abort;
use crate::channels::FAULT;

/// Poll period while waiting for the abort line to be released
const RELEASE_POLL_MS: u64 = 20;

#[embassy_executor::task]
pub async fn abort_task(engine: &'static MotionEngine, mut abort: Abort) {
    info!("Abort task started");

    loop {
        abort.wait_for_assert().await;
        engine.fault().raise();
        FAULT.signal(());
        warn!("Abort input asserted, motion stopped");

        while abort.is_asserted() {
            Timer::after_millis(RELEASE_POLL_MS).await;
        }
        debug!("Abort input released");
    }
}
