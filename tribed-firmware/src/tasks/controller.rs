//! Controller task
//!
//! Runs dispatcher requests one at a time. Requests block the thread-mode
//! executor while the bed moves; stepping and limit latching continue on
//! the interrupt executors.

use defmt::*;
use embassy_futures::select::{select, Either};

use crate::channels::{FAULT, REQUESTS, RESPONSE};
use crate::controller::{handle, BoardController};

#[embassy_executor::task]
pub async fn controller_task(mut controller: BoardController) {
    info!("Controller task started");

    loop {
        let request = match select(REQUESTS.receive(), FAULT.wait()).await {
            Either::First(request) => request,
            Either::Second(()) => {
                controller.reset();
                continue;
            }
        };

        debug!("Request: {:?}", request);
        let response = handle(&mut controller, request);

        if controller.engine().fault().is_set() {
            warn!("Hard fault after {:?}, resetting", request);
            controller.reset();
            FAULT.reset();
        }

        RESPONSE.signal(response);
    }
}
