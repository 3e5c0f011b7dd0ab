//! Motion formulas shared by the player side and the terrain generator
//!
//! The generator's virtual jumper and the scrolling world never share state;
//! they stay in step because both advance through these functions.

use crate::consts::*;
use crate::fixed::Fixed;

/// Horizontal acceleration toward `PLAYER_MAX_SPEED` (pixels/s²)
pub fn speed_accel() -> Fixed {
    (PLAYER_MAX_SPEED - PLAYER_INITIAL_SPEED) / SPEED_RAMP_SECONDS
}

/// Advance the horizontal speed ramp by one step, clamped at the max speed
pub fn advance_speed(speed: Fixed, dt: Fixed) -> Fixed {
    if speed >= PLAYER_MAX_SPEED {
        return speed;
    }
    (speed + speed_accel() * dt).min(PLAYER_MAX_SPEED)
}

/// Apply gravity to a vertical speed for one step
#[inline]
pub fn apply_gravity(speed_y: Fixed, dt: Fixed) -> Fixed {
    speed_y + GRAVITY_ACCEL * dt
}

/// Apex height of a jump started at rest: v² / 2g
pub fn jump_height() -> Fixed {
    PLAYER_JUMP_SPEED * PLAYER_JUMP_SPEED / (GRAVITY_ACCEL * 2)
}

/// Lowest y (highest on screen) from which the generator may start a jump
/// without carrying the jumper past `JUMPER_POS_Y_MIN`
pub fn jumpable_min_y() -> Fixed {
    JUMPER_POS_Y_MIN + jump_height() + Fixed::ONE
}

/// Fall time across the whole jumper band: sqrt(2 * (max_y - min_y) / g)
pub fn max_jump_interval() -> f64 {
    let span = (JUMPER_POS_Y_MAX - JUMPER_POS_Y_MIN).to_f64();
    (2.0 * span / GRAVITY_ACCEL.to_f64()).sqrt()
}
