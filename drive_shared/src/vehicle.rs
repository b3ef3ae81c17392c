//! The vehicle the game drives.
//!
//! Accepts control once per frame, runs the physics, and integrates heading
//! and world position from what the physics produced. Control does not
//! persist: whatever was applied is consumed by the next `tick` and must be
//! applied again to stay in effect.

use tracing::{debug, trace, warn};

use crate::{
    config::SimConfig,
    math::Vec2,
    object::GameObject,
    physics::{decay_factor, VehicleInput, VehiclePhysics},
    settings::{SettingKey, SettingsStore, VehicleSettings},
    telemetry::{VehicleTelemetry, WheelTelemetry},
};

/// Upper bound on sub-steps per frame; a longer frame uses longer steps.
pub const MAX_SUBSTEPS: u32 = 64;

pub struct Vehicle {
    pub object: GameObject,
    steering_angle: f32, // degrees, -ve is left
    heading: f32,        // degrees, cumulative
    settings: SettingsStore,
    physics: VehiclePhysics,
    control: VehicleInput,
    max_substep: f32,
    tick: u64,
    frame_yaw: f32,
    frame_momentum_delta: f32,
}

impl Vehicle {
    pub fn new(cfg: &SimConfig) -> Self {
        Self::with_store(cfg, SettingsStore::new(cfg.settings))
    }

    /// Builds a vehicle over an existing store, so a UI can hold a clone.
    pub fn with_store(cfg: &SimConfig, settings: SettingsStore) -> Self {
        Self {
            object: GameObject::default(),
            steering_angle: 0.0,
            heading: 0.0,
            settings,
            physics: VehiclePhysics::new(cfg.wheel_sync),
            control: VehicleInput::default(),
            max_substep: cfg.effective_substep(),
            tick: 0,
            frame_yaw: 0.0,
            frame_momentum_delta: 0.0,
        }
    }

    /// Adds `delta` degrees of steering, clamped to the steering lock. The
    /// angle changes now; the latched input only marks the next tick as
    /// steering, so rebound is held off.
    pub fn apply_steering(&mut self, delta: f32) {
        self.steer_by(delta);
        self.control.steer = Some(self.control.steer.unwrap_or(0.0) + delta);
    }

    pub fn apply_accelerator(&mut self, value: f32) {
        self.control.accelerator = Some(value.clamp(0.0, 1.0));
    }

    pub fn apply_brake(&mut self, value: f32) {
        self.control.brake = Some(value.clamp(0.0, 1.0));
    }

    /// Control latched since the last tick.
    pub fn pending_input(&self) -> VehicleInput {
        self.control
    }

    /// Advances one frame using the control latched by the `apply_*` calls.
    pub fn tick(&mut self, dt: f32) {
        let input = std::mem::take(&mut self.control);
        self.integrate(dt, input);
    }

    /// Advances one frame with explicit control. `input.steer` is a delta
    /// applied once here. Anything latched through the `apply_*` calls is
    /// discarded.
    pub fn tick_with(&mut self, dt: f32, input: VehicleInput) {
        self.control = VehicleInput::default();
        if let Some(delta) = input.steer {
            self.steer_by(delta);
        }
        self.integrate(dt, input);
    }

    fn steer_by(&mut self, delta: f32) {
        let max = self.settings.snapshot().steering_lock();
        self.steering_angle = (self.steering_angle + delta).clamp(-max, max);
    }

    fn integrate(&mut self, dt: f32, input: VehicleInput) {
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, "Ignoring frame with invalid dt");
            return;
        }

        let wanted = (dt / self.max_substep).ceil().max(1.0);
        let steps = if wanted > MAX_SUBSTEPS as f32 {
            warn!(dt, max_substeps = MAX_SUBSTEPS, "Frame too long, capping sub-steps");
            MAX_SUBSTEPS
        } else {
            wanted as u32
        };
        let step = dt / steps as f32;
        if steps > 1 {
            debug!(dt, steps, "Sub-stepping long frame");
        }

        let settings = self.settings.snapshot();
        // The lock may have shrunk since the last frame.
        let max = settings.steering_lock();
        self.steering_angle = self.steering_angle.clamp(-max, max);

        self.frame_yaw = 0.0;
        self.frame_momentum_delta = 0.0;
        for _ in 0..steps {
            self.step(step, &input, &settings);
        }

        // Displacement is per frame, however many sub-steps it took.
        let momentum = self.physics.forward_momentum();
        self.object.angle = self.heading;
        self.object.motion_vector = Vec2::from_heading(self.heading).scale(momentum);
        self.object.tick();
        self.tick += 1;

        trace!(
            tick = self.tick,
            momentum = self.physics.forward_momentum(),
            heading = self.heading,
            steer = self.steering_angle,
            "Vehicle tick"
        );
    }

    fn step(&mut self, dt: f32, input: &VehicleInput, settings: &VehicleSettings) {
        self.physics.tick(dt, input, self.steering_angle, settings);

        if !input.is_steering() {
            self.steering_angle *= decay_factor(settings.steering_rebound, dt);
        }

        let yaw = self.physics.yaw_delta();
        self.heading += yaw;
        self.frame_yaw += yaw;
        self.frame_momentum_delta += self.physics.momentum_delta();
    }

    /// Writes a setting by name; rejected writes keep the prior value.
    pub fn update_setting(&self, name: &str, value: f32) -> anyhow::Result<()> {
        self.settings.update(name, value)
    }

    /// Reads a setting by name; unknown names read as 0.
    pub fn setting(&self, name: &str) -> f32 {
        self.settings.get(name)
    }

    pub fn setting_key(&self, key: SettingKey) -> f32 {
        self.settings.snapshot().get(key)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Back to rest at `(x, y)`, facing up. Settings are kept.
    pub fn reset(&mut self, x: f32, y: f32) {
        self.physics = VehiclePhysics::new(self.physics.sync());
        self.object = GameObject::at(x, y);
        self.steering_angle = 0.0;
        self.heading = 0.0;
        self.control = VehicleInput::default();
        self.frame_yaw = 0.0;
        self.frame_momentum_delta = 0.0;
        debug!(x, y, "Vehicle reset");
    }

    pub fn steering_angle(&self) -> f32 {
        self.steering_angle
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn position(&self) -> Vec2 {
        self.object.world_pos
    }

    pub fn physics(&self) -> &VehiclePhysics {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut VehiclePhysics {
        &mut self.physics
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn telemetry(&self) -> VehicleTelemetry {
        VehicleTelemetry {
            tick: self.tick,
            forward_momentum: self.physics.forward_momentum(),
            momentum_delta: self.frame_momentum_delta,
            yaw_delta: self.frame_yaw,
            steering_angle: self.steering_angle,
            heading: self.heading,
            position: self.object.world_pos,
            wheels: self.physics.wheels().map(|w| WheelTelemetry {
                id: w.id,
                rotation: w.rotation(),
                rotation_delta: w.rotation_delta(),
                torque: w.applied_torque(),
            }),
            load: *self.physics.load(),
        }
    }
}
