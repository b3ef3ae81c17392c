//! Vehicle dynamics integration.
//!
//! `VehiclePhysics::tick` runs once per (sub)step in a fixed order:
//! drive injection, wheel sync, braking, wheel integration, steering to yaw,
//! momentum update, resistance decay, load update. Settings arrive as a
//! snapshot taken by the caller for this tick.

use crate::{
    config::WheelSync,
    load::{LoadModel, LoadSample},
    settings::VehicleSettings,
    wheel::{Axle, Wheel},
};

/// Per-frame control intent. `None` means the control was not touched this
/// frame; nothing here outlives the frame it was built for.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleInput {
    /// Steering delta in degrees, applied once by the tick that consumes
    /// this input. `Vehicle::apply_steering` applies its delta immediately
    /// and only marks the frame as steering, so the sum it keeps here is
    /// not applied again.
    pub steer: Option<f32>,
    /// Accelerator amount, 0..1.
    pub accelerator: Option<f32>,
    /// Brake amount, 0..1.
    pub brake: Option<f32>,
}

impl VehicleInput {
    pub fn is_steering(&self) -> bool {
        self.steer.is_some()
    }

    pub fn is_accelerating(&self) -> bool {
        self.accelerator.is_some()
    }

    pub fn is_braking(&self) -> bool {
        self.brake.is_some()
    }
}

/// Splits `force` into `(front, rear)` shares; the rear gets `balance`.
pub fn balance_split(force: f32, balance: f32) -> (f32, f32) {
    let rear = force * balance;
    (force - rear, rear)
}

/// Multiplicative decay factor for one step; never negative.
pub fn decay_factor(rate: f32, dt: f32) -> f32 {
    (1.0 - rate * dt).max(0.0)
}

#[derive(Debug, Clone)]
pub struct VehiclePhysics {
    forward_momentum: f32,
    momentum_delta: f32,
    yaw_delta: f32,
    pub front: Axle,
    pub rear: Axle,
    load: LoadModel,
    sync: WheelSync,
}

impl Default for VehiclePhysics {
    fn default() -> Self {
        Self::new(WheelSync::default())
    }
}

impl VehiclePhysics {
    pub fn new(sync: WheelSync) -> Self {
        Self {
            forward_momentum: 0.0,
            momentum_delta: 0.0,
            yaw_delta: 0.0,
            front: Axle::front(),
            rear: Axle::rear(),
            load: LoadModel::default(),
            sync,
        }
    }

    pub fn tick(
        &mut self,
        dt: f32,
        input: &VehicleInput,
        steering_angle: f32,
        settings: &VehicleSettings,
    ) {
        let weight = settings.effective_weight();
        let traction = self.load.traction;

        if let Some(amount) = input.accelerator {
            let force = settings.power * 1000.0 / weight * dt * amount.clamp(0.0, 1.0);
            self.drive_vehicle(force * traction, settings.drive_balance);
        }

        self.equalize_wheel_rotation();

        if let Some(amount) = input.brake {
            let force = settings.braking_force * 1000.0 / weight * dt * amount.clamp(0.0, 1.0);
            self.brake(force, settings.brake_balance);
        }

        for wheel in self.wheels_mut() {
            wheel.tick(weight);
        }

        self.steer(settings.steering_force * 10.0 * steering_angle * dt * traction);

        let before = self.forward_momentum;
        self.momentum_delta = self.wheels().iter().map(|w| w.travel()).sum::<f32>() / 4.0;
        self.forward_momentum += self.momentum_delta;

        // Brakes stop the car, they never push it the other way.
        if input.is_braking()
            && ((before >= 0.0 && self.forward_momentum < 0.0)
                || (before < 0.0 && self.forward_momentum > 0.0))
        {
            self.forward_momentum = 0.0;
        }

        self.forward_momentum *= decay_factor(settings.resistance, dt);

        self.load.update(
            settings,
            LoadSample {
                dt,
                momentum: self.forward_momentum,
                momentum_delta: self.momentum_delta,
                yaw_delta: self.yaw_delta,
            },
        );
    }

    pub fn drive_vehicle(&mut self, force: f32, balance: f32) {
        let (front, rear) = balance_split(force, balance);
        self.front.drive(front);
        self.rear.drive(rear);
    }

    /// Brake torque opposes the current direction of travel.
    pub fn brake(&mut self, force: f32, balance: f32) {
        let force = if self.forward_momentum < 0.0 { -force } else { force };
        let (front, rear) = balance_split(force, balance);
        self.front.brake(front);
        self.rear.brake(rear);
    }

    /// Yaw is proportional to momentum, so a stationary car cannot pivot.
    pub fn steer(&mut self, angle: f32) {
        self.yaw_delta = angle * self.forward_momentum * 5.0;
    }

    /// Reconciles the wheels' cumulative rotation per the configured mode.
    /// Returns the furthest-turned rotation found.
    pub fn equalize_wheel_rotation(&mut self) -> f32 {
        let rotations = self.wheels().map(|w| w.rotation());
        let leading = rotations
            .iter()
            .copied()
            .fold(0.0_f32, |acc, r| if r.abs() > acc.abs() { r } else { acc });

        let target = match self.sync {
            WheelSync::Off => return leading,
            WheelSync::Leading => leading,
            WheelSync::Average => rotations.iter().sum::<f32>() / 4.0,
        };
        for wheel in self.wheels_mut() {
            wheel.set_rotation(target);
        }
        leading
    }

    /// Wheels in integration order: FL, FR, RL, RR.
    pub fn wheels(&self) -> [&Wheel; 4] {
        [
            &self.front.left,
            &self.front.right,
            &self.rear.left,
            &self.rear.right,
        ]
    }

    fn wheels_mut(&mut self) -> [&mut Wheel; 4] {
        [
            &mut self.front.left,
            &mut self.front.right,
            &mut self.rear.left,
            &mut self.rear.right,
        ]
    }

    pub fn forward_momentum(&self) -> f32 {
        self.forward_momentum
    }

    pub fn set_forward_momentum(&mut self, momentum: f32) {
        self.forward_momentum = momentum;
    }

    pub fn momentum_delta(&self) -> f32 {
        self.momentum_delta
    }

    pub fn yaw_delta(&self) -> f32 {
        self.yaw_delta
    }

    pub fn load(&self) -> &LoadModel {
        &self.load
    }

    pub fn sync(&self) -> WheelSync {
        self.sync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact() -> VehicleSettings {
        VehicleSettings {
            weight: 1000.0,
            power: 10.0,
            braking_force: 10.0,
            resistance: 0.2,
            steering_force: 0.1,
            slip_limit: 0.0,
            drive_balance: 0.5,
            brake_balance: 0.5,
            ..VehicleSettings::default()
        }
    }

    fn throttle() -> VehicleInput {
        VehicleInput {
            accelerator: Some(1.0),
            ..VehicleInput::default()
        }
    }

    #[test]
    fn balance_split_sums_to_force() {
        for b in [0.0, 0.25, 0.5, 0.8, 1.0] {
            let (front, rear) = balance_split(2.0, b);
            assert_eq!(rear, 2.0 * b);
            assert!((front - 2.0 * (1.0 - b)).abs() < 1e-6);
            assert!((front + rear - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn drive_goes_to_rear_by_balance() {
        let mut p = VehiclePhysics::new(WheelSync::Off);
        p.drive_vehicle(1.0, 1.0);
        assert_eq!(p.front.left.torque(), 0.0);
        assert!(p.rear.left.torque() > 0.0);
        assert_eq!(p.rear.left.torque(), p.rear.right.torque());
    }

    #[test]
    fn first_throttle_tick_matches_formula() {
        let mut p = VehiclePhysics::new(WheelSync::Off);
        p.tick(0.016, &throttle(), 0.0, &exact());
        // force 0.16 per wheel pair share, travel = share / 125, averaged over 4
        let expected_delta = 0.32 / 500.0;
        assert!((p.momentum_delta() - expected_delta).abs() < 1e-8);
        let expected = expected_delta * (1.0 - 0.2 * 0.016);
        assert!((p.forward_momentum() - expected).abs() < 1e-8);
    }

    #[test]
    fn torque_is_cleared_after_tick() {
        let mut p = VehiclePhysics::default();
        p.tick(0.016, &throttle(), 0.0, &exact());
        assert!(p.wheels().iter().all(|w| w.torque() == 0.0));
    }

    #[test]
    fn yaw_is_zero_at_rest() {
        let mut p = VehiclePhysics::default();
        p.tick(0.016, &VehicleInput::default(), 30.0, &exact());
        assert_eq!(p.yaw_delta(), 0.0);
    }

    #[test]
    fn yaw_matches_formula() {
        let mut p = VehiclePhysics::default();
        p.set_forward_momentum(50.0);
        p.tick(0.016, &VehicleInput::default(), 45.0, &exact());
        let expected = 0.1 * 10.0 * 45.0 * 0.016 * 50.0 * 5.0;
        assert!((p.yaw_delta() - expected).abs() < 1e-3);
    }

    #[test]
    fn slip_scales_next_tick_drive_and_yaw() {
        let s = VehicleSettings {
            slip_limit: 1.0,
            tyre_grip: 1.0,
            ..exact()
        };
        let mut p = VehiclePhysics::default();
        p.set_forward_momentum(10.0);
        p.tick(0.016, &throttle(), 20.0, &s);
        let traction = p.load().traction;
        assert!(p.load().slipping);
        assert!(traction > 0.0 && traction < 1.0);

        let momentum = p.forward_momentum();
        p.tick(0.016, &throttle(), 20.0, &s);

        let full_delta = 0.32 / 500.0;
        assert!((p.momentum_delta() - full_delta * traction).abs() < full_delta * 1e-4);
        let full_yaw = 0.1 * 10.0 * 20.0 * 0.016 * momentum * 5.0;
        assert!((p.yaw_delta() - full_yaw * traction).abs() < full_yaw * 1e-4);
    }

    #[test]
    fn braking_from_rest_does_not_reverse() {
        let mut p = VehiclePhysics::default();
        let input = VehicleInput {
            brake: Some(1.0),
            ..VehicleInput::default()
        };
        p.tick(0.016, &input, 0.0, &exact());
        assert_eq!(p.forward_momentum(), 0.0);
    }

    #[test]
    fn braking_in_reverse_pushes_toward_zero() {
        let mut p = VehiclePhysics::default();
        p.set_forward_momentum(-0.01);
        let input = VehicleInput {
            brake: Some(1.0),
            ..VehicleInput::default()
        };
        p.tick(0.016, &input, 0.0, &exact());
        assert!(p.forward_momentum() > -0.01);
        assert!(p.forward_momentum() <= 0.0);
    }

    #[test]
    fn zero_weight_does_not_poison_state() {
        let mut settings = exact();
        settings.weight = 0.0;
        let mut p = VehiclePhysics::default();
        p.tick(0.016, &throttle(), 10.0, &settings);
        assert!(p.forward_momentum().is_finite());
        assert!(p.wheels().iter().all(|w| w.rotation().is_finite()));
    }

    #[test]
    fn sync_off_leaves_wheels_apart() {
        let mut p = VehiclePhysics::new(WheelSync::Off);
        let mut s = exact();
        s.drive_balance = 1.0;
        p.tick(0.016, &throttle(), 0.0, &s);
        p.tick(0.016, &VehicleInput::default(), 0.0, &s);
        assert_eq!(p.front.left.rotation(), 0.0);
        assert!(p.rear.left.rotation() > 0.0);
    }

    #[test]
    fn sync_leading_raises_every_wheel() {
        let mut p = VehiclePhysics::new(WheelSync::Leading);
        let mut s = exact();
        s.drive_balance = 1.0;
        p.tick(0.016, &throttle(), 0.0, &s);
        let rear = p.rear.left.rotation();
        let leading = p.equalize_wheel_rotation();
        assert_eq!(leading, rear);
        assert!(p.wheels().iter().all(|w| w.rotation() == rear));
    }

    #[test]
    fn sync_average_uses_mean() {
        let mut p = VehiclePhysics::new(WheelSync::Average);
        let mut s = exact();
        s.drive_balance = 1.0;
        p.tick(0.016, &throttle(), 0.0, &s);
        let rear = p.rear.left.rotation();
        p.equalize_wheel_rotation();
        let mean = rear / 2.0;
        assert!(p.wheels().iter().all(|w| (w.rotation() - mean).abs() < 1e-7));
    }
}
