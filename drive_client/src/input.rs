//! Input handling.
//!
//! Raw capture (keyboard events, touch sticks) lives in the host. This module
//! takes the sampled state for a frame and turns it into vehicle control,
//! the same way every frame: arrows first, then the touch stick.

use drive_shared::{settings::SettingKey, vehicle::Vehicle};
use serde::{Deserialize, Serialize};

/// Sampled input for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Touch stick throttle, -1 (full brake) .. 1 (full throttle).
    pub touch_power: f32,
    /// Touch stick steering, -1 (left) .. 1 (right).
    pub touch_steer: f32,
}

impl InputState {
    pub fn throttle() -> Self {
        Self {
            up: true,
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Applies one frame of input to the vehicle. Steering input is scaled by
/// the `steeringRate` setting.
pub fn apply_input(vehicle: &mut Vehicle, input: &InputState) {
    let rate = vehicle.setting_key(SettingKey::SteeringRate);

    if input.left {
        vehicle.apply_steering(-rate);
    }
    if input.right {
        vehicle.apply_steering(rate);
    }
    if input.up {
        vehicle.apply_accelerator(1.0);
    }
    if input.down {
        vehicle.apply_brake(1.0);
    }

    let steer = input.touch_steer.clamp(-1.0, 1.0);
    if steer != 0.0 {
        vehicle.apply_steering(steer * rate);
    }
    let power = input.touch_power.clamp(-1.0, 1.0);
    if power > 0.0 {
        vehicle.apply_accelerator(power);
    }
    if power < 0.0 {
        vehicle.apply_brake(-power);
    }
}
