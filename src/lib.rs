//! # linspeed_ramp
//!
//! A small library computing the instantaneous speed of one axis under a
//! linear acceleration profile, for stepper and servo drivers.
//!
//! This library provides the following modules:
//! - `lin_speed` for the linear speed ramp itself.
//! - `speed_profile` for the capability set shared by speed profiles.
//! - `ramp_units` for acceleration, update period and output rounding types.
//! - `ramp_settings` for plain-number ramp parameters (optionally serde).
//! - `ramp_command` for commands and the bounded queue that carries them,
//!   split into a sender and a receiver.
//! - `ramp_executor` for driving a profile from one owning context.
//!
//! ```
//! use linspeed_ramp::{Acceleration, LinSpeedRamp, UpdatePeriod};
//!
//! let mut ramp = LinSpeedRamp::new();
//! ramp.prepare_rotation_default(
//!     0,
//!     1000,
//!     Acceleration::per_sec2(500.0)?,
//!     UpdatePeriod::from_micros(1000)?,
//! )?;
//! let mut speed = 0;
//! for _ in 0..2000 {
//!     speed = ramp.update_speed(0);
//! }
//! assert_eq!(speed, 1000);
//! # Ok::<(), linspeed_ramp::RampError>(())
//! ```
//!
//! Author: Anton Khrustalev, creapunk

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(not(feature = "std"), test))]
#[macro_use]
extern crate std;

mod fmt;

pub mod lin_speed;
pub mod ramp_command;
pub mod ramp_error;
pub mod ramp_executor;
pub mod ramp_settings;
pub mod ramp_units;
pub mod speed_profile;

// Re-export main structs for convenience:
pub use lin_speed::*;
pub use ramp_command::*;
pub use ramp_error::*;
pub use ramp_executor::*;
pub use ramp_settings::*;
pub use ramp_units::*;
pub use speed_profile::*;
