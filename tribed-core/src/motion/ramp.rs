//! Trapezoidal speed profile
//!
//! Speeds are accumulator increments per tick. Acceleration is expressed as
//! a speed change per half-step over `max_ramp` half-steps, so every move
//! accelerates and decelerates with the same slope. Moves too short to
//! reach cruise speed get a proportionally lower plateau.

use crate::config::MotionConfig;

/// Ramp length of a move covering `distance` half-steps
///
/// Never longer than half the move, so the bed can decelerate as gently as
/// it accelerated.
pub const fn ramp_length(max_ramp: u32, distance: u32) -> u32 {
    let half = distance / 2;
    if half < max_ramp {
        half
    } else {
        max_ramp
    }
}

/// Speed for the next tick of a move
///
/// `cruise` is the move's programmed speed, `ramp` its ramp length. The
/// result is floored at 1 so a move always completes.
pub fn profile_speed(
    config: &MotionConfig,
    cruise: u32,
    ramp: u32,
    steps_from_source: u32,
    steps_to_dest: u32,
) -> u32 {
    let min = config.min_speed as i64;
    let span = cruise as i64 - min;
    let max_ramp = config.max_ramp.max(1) as i64;

    let speed = if steps_to_dest < ramp {
        min + span * steps_to_dest as i64 / max_ramp
    } else if steps_from_source < ramp {
        min + span * steps_from_source as i64 / max_ramp
    } else {
        cruise as i64 * ramp as i64 / max_ramp
    };

    speed.clamp(1, u32::MAX as i64) as u32
}
