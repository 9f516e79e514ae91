//! Safety state shared between interrupt and main contexts
//!
//! The limit monitor latches sensor activations; the hard fault flag is the
//! global emergency stop.

pub mod fault;
pub mod limits;

pub use fault::HardFault;
pub use limits::LimitMonitor;
