//! Configuration system.
//!
//! Loads simulation configuration from JSON strings/files.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::settings::VehicleSettings;

/// How `VehiclePhysics` reconciles the four wheels' cumulative rotation
/// before integrating a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WheelSync {
    /// Wheels keep their own rotation.
    Off,
    /// Every wheel is raised to the furthest-turned wheel.
    #[default]
    Leading,
    /// Every wheel is set to the mean rotation.
    Average,
}

/// Root configuration for a driving session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Largest integration step in seconds; longer frames are split.
    #[serde(default = "default_max_substep")]
    pub max_substep: f32,
    /// Wheel rotation reconciliation mode.
    #[serde(default)]
    pub wheel_sync: WheelSync,
    /// Target frame rate of the driving loop.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,
    /// Initial vehicle tuning.
    #[serde(default)]
    pub settings: VehicleSettings,
}

fn default_max_substep() -> f32 {
    1.0 / 30.0
}

fn default_frame_hz() -> u32 {
    60
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_substep: default_max_substep(),
            wheel_sync: WheelSync::default(),
            frame_hz: default_frame_hz(),
            settings: VehicleSettings::default(),
        }
    }
}

impl SimConfig {
    /// Parses config from JSON. Settings go through the same checks as a
    /// live write, so a bad value fails the load instead of the tick.
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.settings.validate().context("invalid settings")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// `max_substep` as used by the integrator: positive and finite.
    pub fn effective_substep(&self) -> f32 {
        if self.max_substep.is_finite() && self.max_substep > 0.0 {
            self.max_substep
        } else {
            default_max_substep()
        }
    }
}
