//! Wheels and axles.
//!
//! A wheel turns an applied force into angular displacement through a
//! solid-disc moment of inertia. An axle feeds the same force to both of its
//! wheels; there is no differential.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inches to metres.
pub const INCH_TO_METRE: f32 = 0.0254;

/// Wheel radius in display units (inches).
pub const WHEEL_RADIUS: f32 = 17.0;

#[inline]
pub fn inches_to_metres(inches: f32) -> f32 {
    inches * INCH_TO_METRE
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum WheelId {
    FL,
    FR,
    RL,
    RR,
}

impl WheelId {
    /// Fixed integration order.
    pub const ORDER: [WheelId; 4] = [WheelId::FL, WheelId::FR, WheelId::RL, WheelId::RR];

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FL => "FL",
            WheelId::FR => "FR",
            WheelId::RL => "RL",
            WheelId::RR => "RR",
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelId::FL | WheelId::FR)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Wheel {
    pub id: WheelId,
    radius: f32,         // display units
    torque: f32,         // pending, consumed by tick()
    applied_torque: f32, // what the last tick consumed
    rotation: f32,       // cumulative, unbounded
    rotation_delta: f32, // last tick
}

impl Wheel {
    pub fn new(id: WheelId) -> Self {
        Self {
            id,
            radius: WHEEL_RADIUS,
            torque: 0.0,
            applied_torque: 0.0,
            rotation: 0.0,
            rotation_delta: 0.0,
        }
    }

    pub fn radius_m(&self) -> f32 {
        inches_to_metres(self.radius)
    }

    /// Drive torque goes through the radius.
    pub fn drive(&mut self, force: f32) {
        self.torque = force * self.radius_m();
    }

    /// Brake torque is the raw force, with no radius conversion. This makes
    /// braking bite harder than driving for the same force.
    pub fn brake(&mut self, force: f32) {
        self.torque = -force;
    }

    /// 0.5 * m * r^2 with a quarter of the vehicle on each wheel.
    pub fn moment_of_inertia(&self, weight: f32) -> f32 {
        let r = self.radius_m();
        0.5 * (weight / 4.0) * r * r
    }

    /// Integrates pending torque into rotation and clears it.
    pub fn tick(&mut self, weight: f32) {
        self.rotation_delta = self.torque / self.moment_of_inertia(weight);
        self.rotation += self.rotation_delta;
        self.applied_torque = self.torque;
        self.torque = 0.0;
    }

    /// Distance the contact patch travelled last tick, in metres.
    pub fn travel(&self) -> f32 {
        self.rotation_delta * self.radius_m()
    }

    pub fn torque(&self) -> f32 {
        self.torque
    }

    pub fn applied_torque(&self) -> f32 {
        self.applied_torque
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn rotation_delta(&self) -> f32 {
        self.rotation_delta
    }

    pub(crate) fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }
}

#[derive(Debug, Clone)]
pub struct Axle {
    pub left: Wheel,
    pub right: Wheel,
}

impl Axle {
    pub fn front() -> Self {
        Self {
            left: Wheel::new(WheelId::FL),
            right: Wheel::new(WheelId::FR),
        }
    }

    pub fn rear() -> Self {
        Self {
            left: Wheel::new(WheelId::RL),
            right: Wheel::new(WheelId::RR),
        }
    }

    pub fn drive(&mut self, force: f32) {
        self.left.drive(force);
        self.right.drive(force);
    }

    pub fn brake(&mut self, force: f32) {
        self.left.brake(force);
        self.right.brake(force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_converts_once() {
        let w = Wheel::new(WheelId::FL);
        assert!((w.radius_m() - 0.4318).abs() < 1e-6);
    }

    #[test]
    fn zero_torque_tick_is_a_no_op() {
        let mut w = Wheel::new(WheelId::RR);
        w.drive(2.0);
        w.tick(1000.0);
        let rotation = w.rotation();

        w.tick(1000.0);
        assert_eq!(w.rotation_delta(), 0.0);
        assert_eq!(w.rotation(), rotation);
    }

    #[test]
    fn torque_never_survives_a_tick() {
        let mut w = Wheel::new(WheelId::FR);
        w.drive(1.0);
        assert!(w.torque() > 0.0);
        w.tick(1000.0);
        assert_eq!(w.torque(), 0.0);
        assert!(w.applied_torque() > 0.0);
    }

    #[test]
    fn drive_rotation_matches_inertia() {
        let mut w = Wheel::new(WheelId::RL);
        w.drive(0.16);
        w.tick(1000.0);
        let r = 17.0 * 0.0254;
        let expected = 0.16 * r / (0.5 * 250.0 * r * r);
        assert!((w.rotation_delta() - expected).abs() < 1e-7);
        assert!((w.travel() - 0.16 / 125.0).abs() < 1e-7);
    }

    #[test]
    fn brake_skips_radius_conversion() {
        let mut w = Wheel::new(WheelId::FL);
        w.brake(0.5);
        assert_eq!(w.torque(), -0.5);
        w.drive(0.5);
        assert!((w.torque() - 0.5 * w.radius_m()).abs() < 1e-7);
    }

    #[test]
    fn axle_forwards_same_force_to_both_wheels() {
        let mut axle = Axle::rear();
        axle.drive(0.3);
        assert_eq!(axle.left.torque(), axle.right.torque());
        axle.brake(0.3);
        assert_eq!(axle.left.torque(), -0.3);
        assert_eq!(axle.right.torque(), -0.3);
    }
}
