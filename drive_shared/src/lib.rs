//! `drive_shared`
//!
//! The vehicle dynamics core used by the driving session and its tests.
//!
//! Design goals:
//! - Single-threaded tick; settings shared through a lockable store and read
//!   as one snapshot per tick.
//! - Explicit per-frame input instead of flags that must be reset by hand.
//! - Bad configuration is rejected or clamped, never turned into NaN state.
//! - No `unsafe`.

pub mod config;
pub mod console;
pub mod load;
pub mod math;
pub mod object;
pub mod physics;
pub mod settings;
pub mod telemetry;
pub mod vehicle;
pub mod wheel;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::math::*;
    pub use crate::physics::{VehicleInput, VehiclePhysics};
    pub use crate::settings::*;
    pub use crate::vehicle::Vehicle;
}
