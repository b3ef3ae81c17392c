//! Debug telemetry.
//!
//! A plain snapshot of the vehicle for overlays and logs. Serializes to JSON so
//! tools can record runs.

use serde::Serialize;

use crate::{load::LoadModel, math::Vec2, wheel::WheelId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelTelemetry {
    pub id: WheelId,
    pub rotation: f32,
    pub rotation_delta: f32,
    /// Torque consumed by the last tick.
    pub torque: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleTelemetry {
    pub tick: u64,
    pub forward_momentum: f32,
    /// Momentum change over the last frame, all sub-steps included.
    pub momentum_delta: f32,
    /// Heading change over the last frame, all sub-steps included.
    pub yaw_delta: f32,
    pub steering_angle: f32,
    pub heading: f32,
    pub position: Vec2,
    pub wheels: [WheelTelemetry; 4],
    pub load: LoadModel,
}

impl VehicleTelemetry {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// One-line summary for log output.
    pub fn summary(&self) -> String {
        format!(
            "tick {} | pos ({:.2}, {:.2}) | heading {:.1} | momentum {:.4} | steer {:.1} | traction {:.2}{}",
            self.tick,
            self.position.x,
            self.position.y,
            self.heading,
            self.forward_momentum,
            self.steering_angle,
            self.load.traction,
            if self.load.slipping { " SLIP" } else { "" },
        )
    }
}
