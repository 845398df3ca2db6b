use crate::ramp_error::{RampError, Result};
use crate::ramp_settings::RampSettings;
use crate::ramp_units::{Acceleration, SpeedRounding, UpdatePeriod};
use crate::speed_profile::SpeedProfile;

/// Coarse state of the ramp, derived from its speed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampPhase {
    /// Current speed is zero and no delta is armed.
    Idle,
    /// Current speed differs from the target speed.
    Ramping,
    /// Current speed sits on a nonzero target speed.
    Holding,
    /// A controlled stop has brought the speed to zero. The delta stays
    /// armed until the next command or an emergency stop.
    Stopped,
}

/// Linear speed ramp for one axis.
///
/// Each call to [`LinSpeedRamp::update_speed`] moves the current speed one
/// delta toward the target and clamps it there, so the target is never
/// overshot. The delta is derived from the acceleration and the update
/// period, which means `update_speed` has to be called at that period for
/// the ramp rate to be physically right. The ramp does not time itself.
///
/// Speeds are computed in `f64` as `anchor + steps * delta`, where `anchor`
/// is the speed at which the current delta took effect. Rounding error
/// therefore does not build up over long ramps, and a ramp from zero reaches
/// its target after exactly `ceil(|target| / delta)` updates.
///
/// All operations are O(1) and never allocate. The ramp is a single-owner
/// handle and is not `Clone`; commands from other execution contexts go
/// through [`RampExecutor`](crate::RampExecutor).
#[derive(Debug)]
pub struct LinSpeedRamp {
    /// Target speed as commanded, before the speed factor.
    target_base: f64,

    /// Effective target speed: `target_base * speed_factor`.
    target: f64,

    /// Speed computed on the last update.
    current: f64,

    /// Speed at which the current delta took effect.
    anchor: f64,

    /// Updates applied since `anchor` was taken.
    steps: u64,

    /// Per-update increment at acceleration factor 1.0.
    delta_base: f64,

    /// Per-update increment magnitude: `delta_base * accel_factor`. Never negative.
    delta_mag: f64,

    /// Signed increment applied on each update.
    delta: f64,

    /// Conversion of the internal speed to the integer output.
    rounding: SpeedRounding,
}

/// A default ramp is idle with zeroed fields.
impl Default for LinSpeedRamp {
    fn default() -> Self {
        LinSpeedRamp {
            target_base: 0.0,
            target: 0.0,
            current: 0.0,
            anchor: 0.0,
            steps: 0,
            delta_base: 0.0,
            delta_mag: 0.0,
            delta: 0.0,
            rounding: SpeedRounding::Truncate,
        }
    }
}

impl LinSpeedRamp {
    /// Creates an idle ramp that truncates speeds toward zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an idle ramp with an explicit output rounding.
    pub fn with_rounding(rounding: SpeedRounding) -> Self {
        LinSpeedRamp {
            rounding,
            ..Self::default()
        }
    }

    /// Begins a new motion command toward `target_speed`.
    ///
    /// The ramp restarts from zero speed; any ramp in progress is discarded.
    /// `current_position` is not used by a linear profile.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `speed_factor` is negative or not finite. The
    /// ramp is left untouched in that case.
    pub fn prepare_rotation(
        &mut self,
        _current_position: i32,
        target_speed: i32,
        acceleration: Acceleration,
        update_period: UpdatePeriod,
        speed_factor: f64,
    ) -> Result<()> {
        check_speed_factor(speed_factor)?;

        self.target_base = f64::from(target_speed);
        self.delta_base = update_period.delta_per_update(acceleration);
        self.current = 0.0;

        self.override_acceleration(1.0);
        self.apply_speed_factor(speed_factor);

        debug!(
            "ramp prepared: target {} delta {} per {} us",
            self.target,
            self.delta_base,
            update_period.as_micros()
        );
        Ok(())
    }

    /// Same as [`prepare_rotation`](Self::prepare_rotation) with a speed factor of 1.0.
    pub fn prepare_rotation_default(
        &mut self,
        current_position: i32,
        target_speed: i32,
        acceleration: Acceleration,
        update_period: UpdatePeriod,
    ) -> Result<()> {
        self.prepare_rotation(current_position, target_speed, acceleration, update_period, 1.0)
    }

    /// Begins a new motion command using validated settings.
    pub fn prepare_with(
        &mut self,
        settings: &RampSettings,
        current_position: i32,
        target_speed: i32,
    ) -> Result<()> {
        let (acceleration, update_period) = settings.validate()?;
        self.rounding = settings.rounding;
        self.prepare_rotation(
            current_position,
            target_speed,
            acceleration,
            update_period,
            settings.speed_factor,
        )
    }

    /// Advances the ramp by one update period and returns the new speed.
    ///
    /// Once the target is reached this is a no-op that keeps returning it.
    ///
    /// The clamp direction follows the sign of the delta: a positive delta
    /// clamps with `min(target, speed)`, anything else with
    /// `max(target, speed)`. With a zero delta (zero acceleration) this is
    /// asymmetric. A target above the current speed is reached on the first
    /// update, while a target below it is never approached and the speed
    /// holds.
    #[inline]
    pub fn update_speed(&mut self, _current_position: i32) -> i32 {
        if self.current == self.target {
            return self.rounding.apply(self.target);
        }

        self.steps = self.steps.saturating_add(1);
        let next = self.anchor + self.steps as f64 * self.delta;
        self.current = if self.delta > 0.0 {
            self.target.min(next)
        } else {
            self.target.max(next)
        };

        if self.current == self.target {
            trace!("ramp reached target {}", self.target);
        }
        self.rounding.apply(self.current)
    }

    /// Ramps down to zero at the current acceleration.
    ///
    /// Returns 0 right away as an advisory value; the speed actually decays
    /// over the following updates.
    pub fn initiate_stopping(&mut self, _current_position: i32) -> i32 {
        debug!("ramp stopping from {}", self.current);
        self.apply_speed_factor(0.0);
        0
    }

    /// Halts at once without ramping. Safe to call repeatedly.
    ///
    /// The armed delta is cleared too, so [`is_moving`](Self::is_moving)
    /// reports `false` afterwards.
    pub fn e_stop(&mut self) {
        if self.is_moving() {
            warn!("ramp emergency stop at speed {}", self.current);
        }
        self.current = 0.0;
        self.target = 0.0;
        self.set_delta(0.0);
    }

    /// Rescales the target to `target_base * factor` without touching the
    /// current speed. A factor of 0 expresses a stop.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `factor` is negative or not finite.
    pub fn override_speed(&mut self, factor: f64) -> Result<()> {
        check_speed_factor(factor)?;
        self.apply_speed_factor(factor);
        debug!("ramp speed override x{}: target {}", factor, self.target);
        Ok(())
    }

    /// Rescales the ramp rate to `delta_base * factor`, keeping direction.
    ///
    /// A factor that is not strictly positive is ignored and the previous
    /// rate stays in force. This is the intended policy for invalid tuning
    /// input, not an error path.
    pub fn override_acceleration(&mut self, factor: f64) {
        if factor.is_nan() || factor <= 0.0 {
            return;
        }
        self.delta_mag = self.delta_base * factor;
        // keep |delta| == delta_mag so repeated overrides do not compound
        let delta = if self.delta > 0.0 {
            self.delta_mag
        } else if self.delta < 0.0 {
            -self.delta_mag
        } else {
            0.0
        };
        self.set_delta(delta);
    }

    /// `true` while the speed is nonzero or a delta is armed.
    pub fn is_moving(&self) -> bool {
        self.current != 0.0 || self.delta != 0.0
    }

    fn apply_speed_factor(&mut self, factor: f64) {
        self.target = self.target_base * factor;
        let delta = if self.target > self.current {
            self.delta_mag
        } else {
            -self.delta_mag
        };
        self.set_delta(delta);
    }

    /// Re-anchors the step count at the current speed.
    fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
        self.anchor = self.current;
        self.steps = 0;
    }

    // -----------------------------------------------------------------
    //  Getter methods
    // -----------------------------------------------------------------

    /// Current speed, before integer conversion.
    pub fn current_speed(&self) -> f64 {
        self.current
    }

    /// Effective target speed.
    pub fn target_speed(&self) -> f64 {
        self.target
    }

    /// Signed per-update increment.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Per-update increment magnitude.
    pub fn delta_magnitude(&self) -> f64 {
        self.delta_mag
    }

    /// Conversion applied to speeds returned by `update_speed`.
    pub fn rounding(&self) -> SpeedRounding {
        self.rounding
    }

    /// Coarse state derived from the current speed, target and delta.
    pub fn phase(&self) -> RampPhase {
        if !self.is_moving() {
            RampPhase::Idle
        } else if self.current != self.target {
            RampPhase::Ramping
        } else if self.target == 0.0 {
            RampPhase::Stopped
        } else {
            RampPhase::Holding
        }
    }
}

fn check_speed_factor(factor: f64) -> Result<()> {
    if !factor.is_finite() {
        return Err(RampError::invalid("speed_factor", "must be finite"));
    }
    if factor < 0.0 {
        return Err(RampError::invalid("speed_factor", "must not be negative"));
    }
    Ok(())
}

impl SpeedProfile for LinSpeedRamp {
    fn prepare_rotation(
        &mut self,
        current_position: i32,
        target_speed: i32,
        acceleration: Acceleration,
        update_period: UpdatePeriod,
        speed_factor: f64,
    ) -> Result<()> {
        LinSpeedRamp::prepare_rotation(
            self,
            current_position,
            target_speed,
            acceleration,
            update_period,
            speed_factor,
        )
    }

    fn update_speed(&mut self, current_position: i32) -> i32 {
        LinSpeedRamp::update_speed(self, current_position)
    }

    fn initiate_stopping(&mut self, current_position: i32) -> i32 {
        LinSpeedRamp::initiate_stopping(self, current_position)
    }

    fn e_stop(&mut self) {
        LinSpeedRamp::e_stop(self)
    }

    fn override_speed(&mut self, factor: f64) -> Result<()> {
        LinSpeedRamp::override_speed(self, factor)
    }

    fn override_acceleration(&mut self, factor: f64) {
        LinSpeedRamp::override_acceleration(self, factor)
    }

    fn is_moving(&self) -> bool {
        LinSpeedRamp::is_moving(self)
    }
}
