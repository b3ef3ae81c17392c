//! Reference scenarios.
//!
//! Each scenario drives a fresh vehicle and returns what it measured, so the
//! integration tests and `scenario_runner` check the same numbers.

use drive_shared::{
    config::{SimConfig, WheelSync},
    physics::VehicleInput,
    settings::VehicleSettings,
    vehicle::Vehicle,
};

pub const DT: f32 = 0.016;

/// Baseline tuning: weight 1000, power 10, brakingForce 10, resistance 0.2,
/// steeringForce 0.1, even balance, traction loss disabled.
pub fn baseline_settings() -> VehicleSettings {
    VehicleSettings {
        power: 10.0,
        weight: 1000.0,
        braking_force: 10.0,
        resistance: 0.2,
        steering_force: 0.1,
        max_steering_angle: 45.0,
        steering_rate: 1.0,
        steering_rebound: 5.0,
        drive_balance: 0.5,
        brake_balance: 0.5,
        slip_limit: 0.0,
        ..VehicleSettings::default()
    }
}

pub fn baseline_vehicle() -> Vehicle {
    vehicle_with(baseline_settings(), WheelSync::Leading)
}

pub fn vehicle_with(settings: VehicleSettings, wheel_sync: WheelSync) -> Vehicle {
    let cfg = SimConfig {
        settings,
        wheel_sync,
        ..SimConfig::default()
    };
    Vehicle::new(&cfg)
}

pub fn throttle() -> VehicleInput {
    VehicleInput {
        accelerator: Some(1.0),
        ..VehicleInput::default()
    }
}

pub fn full_brake() -> VehicleInput {
    VehicleInput {
        brake: Some(1.0),
        ..VehicleInput::default()
    }
}

/// Momentum added per full-throttle tick: the four wheels' travel averages to
/// `4 * F / weight` with `F = power * 1000 / weight * dt`.
pub fn drive_delta(s: &VehicleSettings, dt: f32) -> f32 {
    let force = s.power * 1000.0 / s.weight * dt;
    4.0 * force / s.weight
}

/// Closed form for momentum after `n` throttle ticks from rest.
pub fn throttle_momentum_after(s: &VehicleSettings, dt: f32, n: i32) -> f32 {
    let k = 1.0 - s.resistance * dt;
    steady_state_momentum(s, dt) * (1.0 - k.powi(n))
}

/// Where full throttle settles: drive input equals resistance loss.
pub fn steady_state_momentum(s: &VehicleSettings, dt: f32) -> f32 {
    let k = 1.0 - s.resistance * dt;
    drive_delta(s, dt) * k / (1.0 - k)
}

/// Momentum after each of `ticks` full-throttle ticks from rest.
pub fn throttle_from_rest(ticks: usize) -> Vec<f32> {
    let mut v = baseline_vehicle();
    (0..ticks)
        .map(|_| {
            v.tick_with(DT, throttle());
            v.physics().forward_momentum()
        })
        .collect()
}

/// Yaw produced by one tick at `momentum` with the wheel at `angle`.
pub fn yaw_at(momentum: f32, angle: f32) -> f32 {
    let mut v = baseline_vehicle();
    v.apply_steering(angle);
    v.physics_mut().set_forward_momentum(momentum);
    v.tick(DT);
    v.physics().yaw_delta()
}

/// Momentum after each full-brake tick from `initial`, stopping at the first
/// tick that reaches zero or after `max_ticks`.
pub fn brake_to_stop(initial: f32, max_ticks: usize) -> Vec<f32> {
    let mut v = baseline_vehicle();
    v.physics_mut().set_forward_momentum(initial);
    let mut trace = Vec::new();
    for _ in 0..max_ticks {
        v.tick_with(DT, full_brake());
        let m = v.physics().forward_momentum();
        trace.push(m);
        if m <= 0.0 {
            break;
        }
    }
    trace
}

/// Momentum and steering angle after each idle tick from a moving, steered
/// start.
pub fn coast(initial: f32, angle: f32, ticks: usize) -> Vec<(f32, f32)> {
    let mut v = baseline_vehicle();
    v.physics_mut().set_forward_momentum(initial);
    v.apply_steering(angle);
    v.tick(DT);
    (0..ticks)
        .map(|_| {
            v.tick(DT);
            (v.physics().forward_momentum(), v.steering_angle())
        })
        .collect()
}
