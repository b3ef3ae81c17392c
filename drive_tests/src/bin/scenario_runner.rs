//! Reference scenario runner.
//!
//! Runs the dynamics scenarios against their closed-form expectations,
//! prints a summary and writes a JSON report.
//!
//! Usage: `scenario_runner [output_dir]` (defaults to `scenario-reports`).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use drive_shared::settings::SettingKey;
use drive_tests::report::{ScenarioReport, ScenarioResult, ScenarioStatus};
use drive_tests::scenarios::{self, DT};

type Measured = BTreeMap<String, f64>;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("scenario-reports"));

    println!("Vehicle Dynamics Scenario Runner");
    println!("================================\n");

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;

    let mut report = ScenarioReport::new("Vehicle Dynamics Scenarios");
    report
        .metadata
        .insert("dt".to_string(), format!("{}", DT));

    println!("Running acceleration scenarios...");
    run_acceleration(&mut report);

    println!("Running steering scenarios...");
    run_steering(&mut report);

    println!("Running braking scenarios...");
    run_braking(&mut report);

    println!("Running settings scenarios...");
    run_settings(&mut report);

    for result in &report.results {
        println!(
            "  {} {} {}{}",
            result.status.icon(),
            result.id,
            result.name,
            result
                .error_message
                .as_deref()
                .map(|e| format!(": {}", e))
                .unwrap_or_default()
        );
    }

    let stats = report.overall_stats();
    println!("\n================================");
    println!("Total:     {}", stats.total);
    println!("Passed:    {} ✓", stats.passed);
    println!("Failed:    {} ✗", stats.failed);
    println!("Pass Rate: {:.1}%", stats.pass_rate());
    println!("Duration:  {:.3}s", stats.total_duration.as_secs_f64());

    let json_path = output_dir.join("scenarios.json");
    report.save_json(&json_path)?;
    println!("\nReport saved to {}", json_path.display());

    if stats.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Runs a scenario and captures its outcome.
fn run_scenario<F>(id: &str, name: &str, category: &str, f: F) -> ScenarioResult
where
    F: FnOnce() -> Result<Measured, String>,
{
    let start = Instant::now();
    let outcome = f();
    let duration = start.elapsed();

    let (status, error_message, measured) = match outcome {
        Ok(measured) => (ScenarioStatus::Passed, None, measured),
        Err(e) => (ScenarioStatus::Failed, Some(e), Measured::new()),
    };
    ScenarioResult {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        status,
        duration,
        error_message,
        measured,
    }
}

fn close(actual: f32, expected: f32, rel: f32) -> bool {
    (actual - expected).abs() <= expected.abs() * rel + 1e-9
}

fn run_acceleration(report: &mut ScenarioReport) {
    const CATEGORY: &str = "Acceleration";

    report.add_result(run_scenario("ACC-001", "Throttle from rest", CATEGORY, || {
        let trace = scenarios::throttle_from_rest(60);
        if trace.windows(2).any(|w| w[1] <= w[0]) {
            return Err("momentum must rise on every throttle tick".to_string());
        }
        let last = trace.last().copied().unwrap_or_default();
        let expected = scenarios::throttle_momentum_after(&scenarios::baseline_settings(), DT, 60);
        if !close(last, expected, 1e-3) {
            return Err(format!("expected {}, got {}", expected, last));
        }
        Ok(Measured::from([
            ("momentum_60".to_string(), last as f64),
            ("expected_60".to_string(), expected as f64),
        ]))
    }));

    report.add_result(run_scenario("ACC-002", "Steady state", CATEGORY, || {
        let trace = scenarios::throttle_from_rest(5000);
        let last = trace.last().copied().unwrap_or_default();
        let expected = scenarios::steady_state_momentum(&scenarios::baseline_settings(), DT);
        if !close(last, expected, 1e-2) {
            return Err(format!("expected ~{}, got {}", expected, last));
        }
        Ok(Measured::from([("steady_state".to_string(), last as f64)]))
    }));
}

fn run_steering(report: &mut ScenarioReport) {
    const CATEGORY: &str = "Steering";

    report.add_result(run_scenario("STR-001", "Yaw at full lock", CATEGORY, || {
        let yaw = scenarios::yaw_at(50.0, 45.0);
        if !close(yaw, 180.0, 1e-4) {
            return Err(format!("expected 180, got {}", yaw));
        }
        Ok(Measured::from([("yaw".to_string(), yaw as f64)]))
    }));

    report.add_result(run_scenario("STR-002", "No pivot at rest", CATEGORY, || {
        let yaw = scenarios::yaw_at(0.0, 45.0);
        if yaw != 0.0 {
            return Err(format!("stationary vehicle yawed {}", yaw));
        }
        Ok(Measured::new())
    }));

    report.add_result(run_scenario("STR-003", "Rebound while coasting", CATEGORY, || {
        let trace = scenarios::coast(1.0, 30.0, 120);
        for pair in trace.windows(2) {
            let ((m0, a0), (m1, a1)) = (pair[0], pair[1]);
            if m1 > m0 || a1.abs() > a0.abs() {
                return Err(format!("not decaying: ({}, {}) -> ({}, {})", m0, a0, m1, a1));
            }
        }
        let (m, a) = trace.last().copied().unwrap_or_default();
        Ok(Measured::from([
            ("momentum".to_string(), m as f64),
            ("steering_angle".to_string(), a as f64),
        ]))
    }));
}

fn run_braking(report: &mut ScenarioReport) {
    const CATEGORY: &str = "Braking";

    report.add_result(run_scenario("BRK-001", "Brake to stop", CATEGORY, || {
        let trace = scenarios::brake_to_stop(0.1, 1000);
        if trace.iter().any(|m| *m < 0.0) {
            return Err("brakes pushed the car backwards".to_string());
        }
        if trace.last().copied() != Some(0.0) {
            return Err(format!("did not stop within {} ticks", trace.len()));
        }
        Ok(Measured::from([("ticks".to_string(), trace.len() as f64)]))
    }));
}

fn run_settings(report: &mut ScenarioReport) {
    const CATEGORY: &str = "Settings";

    report.add_result(run_scenario("SET-001", "Live retune", CATEGORY, || {
        let mut v = scenarios::baseline_vehicle();
        v.tick_with(DT, scenarios::throttle());
        let first = v.physics().momentum_delta();
        v.update_setting("power", 20.0).map_err(|e| e.to_string())?;
        v.tick_with(DT, scenarios::throttle());
        let second = v.physics().momentum_delta();
        if !close(second, first * 2.0, 1e-3) {
            return Err(format!("doubling power gave {} -> {}", first, second));
        }
        Ok(Measured::from([
            ("delta_before".to_string(), first as f64),
            ("delta_after".to_string(), second as f64),
        ]))
    }));

    report.add_result(run_scenario("SET-002", "Rejected write", CATEGORY, || {
        let v = scenarios::baseline_vehicle();
        if v.update_setting("weight", -5.0).is_ok() {
            return Err("negative weight accepted".to_string());
        }
        let weight = v.setting_key(SettingKey::Weight);
        if weight != 1000.0 {
            return Err(format!("weight changed to {}", weight));
        }
        Ok(Measured::new())
    }));
}
