//! Inter-task communication channels
//!
//! Static embassy-sync primitives connecting the dispatcher, the controller
//! task and the abort task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::controller::{Request, Response};

/// Queued requests for the controller task
const REQUEST_CHANNEL_SIZE: usize = 4;

/// Requests from the command dispatcher
pub static REQUESTS: Channel<CriticalSectionRawMutex, Request, REQUEST_CHANNEL_SIZE> =
    Channel::new();

/// Outcome of the most recent request (overwritten by the next one)
pub static RESPONSE: Signal<CriticalSectionRawMutex, Response> = Signal::new();

/// Raised by the abort task after setting the hard fault
pub static FAULT: Signal<CriticalSectionRawMutex, ()> = Signal::new();
