//! Reference scenarios checked against their closed forms.

use drive_shared::wheel::inches_to_metres;
use drive_tests::scenarios::{self, baseline_settings, DT};

fn assert_close(actual: f32, expected: f32, rel: f32) {
    assert!(
        (actual - expected).abs() <= expected.abs() * rel + 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn throttle_rises_every_tick() {
    let trace = scenarios::throttle_from_rest(60);
    assert!(trace[0] > 0.0);
    assert!(trace.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn throttle_matches_closed_form() {
    let s = baseline_settings();
    let trace = scenarios::throttle_from_rest(60);
    assert_close(trace[0], scenarios::throttle_momentum_after(&s, DT, 1), 1e-4);
    assert_close(trace[59], scenarios::throttle_momentum_after(&s, DT, 60), 1e-3);
}

#[test]
fn throttle_settles_at_steady_state() {
    let s = baseline_settings();
    let trace = scenarios::throttle_from_rest(5000);
    let last = *trace.last().unwrap();
    assert_close(last, scenarios::steady_state_momentum(&s, DT), 1e-2);
}

#[test]
fn full_lock_yaw() {
    // 0.1 * 10 * 45 * 0.016 * 50 * 5
    assert_close(scenarios::yaw_at(50.0, 45.0), 180.0, 1e-4);
    assert_close(scenarios::yaw_at(50.0, -45.0), -180.0, 1e-4);
}

#[test]
fn steering_lock_caps_yaw() {
    assert_close(scenarios::yaw_at(50.0, 90.0), 180.0, 1e-4);
}

#[test]
fn brakes_stop_without_reversing() {
    let trace = scenarios::brake_to_stop(0.1, 1000);
    assert!(trace.iter().all(|m| *m >= 0.0));
    assert_eq!(trace.last().copied(), Some(0.0));
}

#[test]
fn brake_drop_per_tick_is_bounded() {
    let s = baseline_settings();
    let force = s.braking_force * 1000.0 / s.weight * DT;
    // Average wheel travel with an even split: 4F / (w * r).
    let brake_bound = 4.0 * force / (s.weight * inches_to_metres(17.0));

    let mut prev = 0.1_f32;
    for m in scenarios::brake_to_stop(prev, 1000) {
        let drop = prev - m;
        assert!(drop >= 0.0);
        assert!(
            drop <= brake_bound + prev * s.resistance * DT + 1e-6,
            "dropped {drop} from {prev}"
        );
        prev = m;
    }
}

#[test]
fn coasting_decays_momentum_and_steering() {
    let trace = scenarios::coast(1.0, 30.0, 120);
    for pair in trace.windows(2) {
        let ((m0, a0), (m1, a1)) = (pair[0], pair[1]);
        assert!(m1 < m0 && m1 > 0.0);
        assert!(a1 < a0 && a1 > 0.0);
    }
    // 0.92 per tick at rebound 5.
    assert!(trace.last().unwrap().1 < 0.01);
}
