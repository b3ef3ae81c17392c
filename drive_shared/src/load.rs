//! Weight transfer ("load") and traction loss.
//!
//! Load is a proxy, not a force: longitudinal load follows the rate of change
//! of momentum, lateral load follows yaw rate times momentum. Both are
//! smoothed so a single spiky tick does not break traction. When the smoothed
//! load exceeds `slipLimit * tyreGrip` the tyres slip and the traction factor
//! drops below one; the next tick scales drive force and yaw by it.

use serde::Serialize;

use crate::settings::VehicleSettings;

/// One tick of physics output, as seen by the load model.
#[derive(Debug, Clone, Copy)]
pub struct LoadSample {
    pub dt: f32,
    pub momentum: f32,
    pub momentum_delta: f32,
    pub yaw_delta: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadModel {
    /// +ve under acceleration, -ve under braking.
    pub longitudinal: f32,
    pub lateral: f32,
    /// In [0, 1]; 1 means full grip.
    pub traction: f32,
    pub slipping: bool,
}

impl Default for LoadModel {
    fn default() -> Self {
        Self {
            longitudinal: 0.0,
            lateral: 0.0,
            traction: 1.0,
            slipping: false,
        }
    }
}

impl LoadModel {
    pub fn update(&mut self, settings: &VehicleSettings, sample: LoadSample) {
        if !(sample.dt.is_finite() && sample.dt > 0.0) {
            return;
        }

        let accel = sample.momentum_delta / sample.dt;
        let raw_long = if accel >= 0.0 {
            accel * settings.load_factor_pos_y
        } else {
            accel * settings.load_factor_neg_y
        };
        let yaw_rate = (sample.yaw_delta / sample.dt).to_radians();
        let raw_lat = yaw_rate * sample.momentum;

        let alpha = (settings.load_change_rate * sample.dt).clamp(0.0, 1.0);
        self.longitudinal += (raw_long - self.longitudinal) * alpha;
        self.lateral += (raw_lat - self.lateral) * alpha;

        let capacity = settings.slip_limit * settings.tyre_grip;
        let load = self.magnitude();
        if capacity > 0.0 && load > capacity {
            self.traction = (capacity / load).clamp(0.0, 1.0);
            self.slipping = true;
        } else {
            self.traction = 1.0;
            self.slipping = false;
        }
    }

    pub fn magnitude(&self) -> f32 {
        self.longitudinal.hypot(self.lateral)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
