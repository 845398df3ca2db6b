use crate::ramp_error::Result;
use crate::ramp_units::{Acceleration, UpdatePeriod};

/// Capability set shared by speed profiles driven from a periodic update.
///
/// Position arguments are part of the signature so that position-aware
/// profiles (distance-based deceleration) can plug into the same executor.
/// A profile that ignores them must not imply it tracks position.
pub trait SpeedProfile {
    /// Begins a new motion command, discarding any ramp in progress.
    fn prepare_rotation(
        &mut self,
        current_position: i32,
        target_speed: i32,
        acceleration: Acceleration,
        update_period: UpdatePeriod,
        speed_factor: f64,
    ) -> Result<()>;

    /// Advances the profile by one update period and returns the new speed.
    fn update_speed(&mut self, current_position: i32) -> i32;

    /// Commands a controlled stop. The returned value is advisory.
    fn initiate_stopping(&mut self, current_position: i32) -> i32;

    /// Halts immediately, without ramping.
    fn e_stop(&mut self);

    /// Rescales the commanded target speed.
    fn override_speed(&mut self, factor: f64) -> Result<()>;

    /// Rescales the commanded acceleration.
    fn override_acceleration(&mut self, factor: f64);

    fn is_moving(&self) -> bool;
}
