use crate::ramp_error::{RampError, Result};
use crate::ramp_units::{Acceleration, SpeedRounding, UpdatePeriod};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ramp parameters in plain numbers, as stored or sent by the integrating
/// system. Call [`RampSettings::validate`] (or
/// [`LinSpeedRamp::prepare_with`](crate::LinSpeedRamp::prepare_with)) before use.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RampSettings {
    /// Speed units per second squared.
    pub acceleration: f64,
    /// Microseconds between two updates.
    pub update_period_us: u32,
    pub speed_factor: f64,
    pub rounding: SpeedRounding,
}

impl Default for RampSettings {
    fn default() -> Self {
        RampSettings {
            acceleration: 1000.0,  // 1 speed unit per update at 1 kHz
            update_period_us: 1000, // 1 kHz update rate
            speed_factor: 1.0,
            rounding: SpeedRounding::Truncate,
        }
    }
}

impl RampSettings {
    /// Checks every field and returns the strong unit values.
    pub fn validate(&self) -> Result<(Acceleration, UpdatePeriod)> {
        let acceleration = Acceleration::per_sec2(self.acceleration)?;
        let update_period = UpdatePeriod::from_micros(self.update_period_us)?;
        if !self.speed_factor.is_finite() || self.speed_factor < 0.0 {
            return Err(RampError::invalid(
                "speed_factor",
                "must be finite and not negative",
            ));
        }
        Ok((acceleration, update_period))
    }

    /// Per-update increment these settings produce, at acceleration factor 1.0.
    pub fn delta_per_update(&self) -> Result<f64> {
        let (acceleration, update_period) = self.validate()?;
        Ok(update_period.delta_per_update(acceleration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = RampSettings::default();
        assert_eq!(settings.delta_per_update(), Ok(1.0));
    }

    #[test]
    fn validate_reports_first_bad_field() {
        let settings = RampSettings {
            acceleration: -5.0,
            update_period_us: 0,
            ..RampSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(RampError::InvalidParameter { name: "acceleration", .. })
        ));

        let settings = RampSettings {
            update_period_us: 0,
            ..RampSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(RampError::InvalidParameter { name: "update_period", .. })
        ));

        let settings = RampSettings {
            speed_factor: -1.0,
            ..RampSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(RampError::InvalidParameter { name: "speed_factor", .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_from_toml_with_defaults() {
        let settings: RampSettings = toml::from_str(
            r#"
            acceleration = 500.0
            rounding = "nearest"
            "#,
        )
        .unwrap();
        assert_eq!(settings.acceleration, 500.0);
        assert_eq!(settings.update_period_us, 1000);
        assert_eq!(settings.speed_factor, 1.0);
        assert_eq!(settings.rounding, SpeedRounding::Nearest);
        assert_eq!(settings.delta_per_update(), Ok(0.5));
    }
}
