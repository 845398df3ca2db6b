//! Strong unit types for ramp parameters.
//!
//! Acceleration is kept in speed units per second squared and the update
//! period in microseconds. The only place the two meet is
//! [`UpdatePeriod::delta_per_update`], which owns the `1e6` scale.

use core::time::Duration;

use crate::ramp_error::{RampError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Acceleration in speed units per second squared (e.g. steps/s²).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acceleration(f64);

impl Acceleration {
    /// Zero acceleration: the ramp never leaves its current speed.
    pub const ZERO: Acceleration = Acceleration(0.0);

    /// Creates an acceleration, rejecting negative and non-finite values.
    pub fn per_sec2(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(RampError::invalid("acceleration", "must be finite"));
        }
        if value < 0.0 {
            return Err(RampError::invalid("acceleration", "must not be negative"));
        }
        Ok(Acceleration(value))
    }

    /// Raw value in speed units per second squared.
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Fixed interval between two `update_speed` calls, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdatePeriod(u32);

impl UpdatePeriod {
    const MICROS_PER_SEC: f64 = 1e6;

    /// Creates an update period, rejecting zero.
    pub fn from_micros(micros: u32) -> Result<Self> {
        if micros == 0 {
            return Err(RampError::invalid("update_period", "must be greater than zero"));
        }
        Ok(UpdatePeriod(micros))
    }

    /// Creates an update period from a `Duration`, truncated to whole
    /// microseconds. Periods below one microsecond or above `u32::MAX`
    /// microseconds are rejected.
    pub fn from_duration(period: Duration) -> Result<Self> {
        let micros = u32::try_from(period.as_micros())
            .map_err(|_| RampError::invalid("update_period", "does not fit in u32 microseconds"))?;
        Self::from_micros(micros)
    }

    pub fn as_micros(self) -> u32 {
        self.0
    }

    /// Speed increment produced by `acc` over one update period.
    pub fn delta_per_update(self, acc: Acceleration) -> f64 {
        (acc.0 * self.0 as f64) / Self::MICROS_PER_SEC
    }
}

/// How the internal `f64` speed is turned into the integer speed handed
/// to the pulse generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpeedRounding {
    /// Truncate toward zero. Slow ramps read slightly low.
    #[default]
    Truncate,
    /// Round half away from zero.
    Nearest,
}

impl SpeedRounding {
    /// Converts an internal speed to integer speed units. Values beyond the
    /// `i32` range saturate.
    #[inline]
    pub fn apply(self, speed: f64) -> i32 {
        match self {
            SpeedRounding::Truncate => speed as i32,
            SpeedRounding::Nearest => libm::round(speed) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(500.0, 1000, 0.5)]
    #[case(1000.0, 1000, 1.0)]
    #[case(20_000.0, 50, 1.0)]
    #[case(0.0, 1000, 0.0)]
    #[case(100.0, 1000, 0.1)]
    #[case(130.0, 1000, 0.13)]
    fn delta_per_update_scales_by_period(
        #[case] acc: f64,
        #[case] period_us: u32,
        #[case] expected: f64,
    ) {
        let acc = Acceleration::per_sec2(acc).unwrap();
        let period = UpdatePeriod::from_micros(period_us).unwrap();
        assert_eq!(period.delta_per_update(acc), expected);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn acceleration_rejects_out_of_range(#[case] value: f64) {
        assert!(matches!(
            Acceleration::per_sec2(value),
            Err(RampError::InvalidParameter { name: "acceleration", .. })
        ));
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            UpdatePeriod::from_micros(0),
            Err(RampError::InvalidParameter { name: "update_period", .. })
        ));
        assert!(UpdatePeriod::from_duration(Duration::from_nanos(999)).is_err());
    }

    #[test]
    fn period_from_duration() {
        let period = UpdatePeriod::from_duration(Duration::from_millis(2)).unwrap();
        assert_eq!(period.as_micros(), 2000);
        assert!(UpdatePeriod::from_duration(Duration::from_secs(5000)).is_err());
    }

    #[rstest]
    #[case(SpeedRounding::Truncate, 9.99, 9)]
    #[case(SpeedRounding::Truncate, -9.99, -9)]
    #[case(SpeedRounding::Nearest, 9.5, 10)]
    #[case(SpeedRounding::Nearest, -9.5, -10)]
    #[case(SpeedRounding::Nearest, 9.49, 9)]
    fn rounding_modes(#[case] mode: SpeedRounding, #[case] speed: f64, #[case] expected: i32) {
        assert_eq!(mode.apply(speed), expected);
    }
}
