//! Embassy async tasks
//!
//! The step tick and the limit/abort inputs run on interrupt executors so
//! they preempt the blocking controller task in thread mode.

pub mod abort;
pub mod controller;
pub mod limits;
pub mod stepper;

pub use abort::abort_task;
pub use controller::controller_task;
pub use limits::limits_task;
pub use stepper::step_tick_task;
