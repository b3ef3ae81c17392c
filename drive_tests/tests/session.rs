//! Driving session tests: frame clocks, scripts and live console retuning.

use drive_client::input::InputState;
use drive_client::script::{InputScript, Segment};
use drive_client::session::{DriveSession, FrameClock};
use drive_shared::config::SimConfig;
use drive_shared::settings::SettingsProfile;
use tokio::sync::mpsc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn straight_line(frames: u32) -> InputScript {
    InputScript {
        segments: vec![Segment {
            frames,
            input: InputState::throttle(),
        }],
    }
}

#[tokio::test]
async fn fixed_clock_drives_forward() -> anyhow::Result<()> {
    init_tracing();
    let mut session = DriveSession::new(SimConfig::default());
    let clock = FrameClock::fixed_for(&session.cfg);

    let t = session.run(&straight_line(120), clock, 120, None).await?;
    assert_eq!(t.tick, 120);
    assert!(t.forward_momentum > 0.0);
    assert_eq!(t.heading, 0.0);
    // Heading 0 is up the screen.
    assert!(t.position.y < 0.0);
    assert!(t.position.x.abs() < 1e-6);
    Ok(())
}

#[tokio::test]
async fn fixed_clock_is_deterministic() -> anyhow::Result<()> {
    let script = InputScript::demo();
    let mut a = DriveSession::new(SimConfig::default());
    let mut b = DriveSession::new(SimConfig::default());
    let clock = FrameClock::fixed_for(&a.cfg);

    let ta = a.run(&script, clock, script.total_frames(), None).await?;
    let tb = b.run(&script, clock, script.total_frames(), None).await?;
    assert_eq!(ta.position, tb.position);
    assert_eq!(ta.heading, tb.heading);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn realtime_clock_runs_frames() -> anyhow::Result<()> {
    init_tracing();
    let mut session = DriveSession::new(SimConfig::default());

    let t = session
        .run(&straight_line(10), FrameClock::Realtime { hz: 200 }, 10, None)
        .await?;
    assert_eq!(session.frame(), 10);
    assert_eq!(t.tick, 10);
    assert!(t.forward_momentum > 0.0);
    Ok(())
}

#[tokio::test]
async fn console_lines_apply_between_frames() -> anyhow::Result<()> {
    init_tracing();
    let mut session = DriveSession::new(SimConfig::default());
    let (tx, rx) = mpsc::channel::<String>(8);
    tx.send("set power 25".to_string()).await?;
    tx.send("set weight -1".to_string()).await?;
    tx.send("steeringRate 2".to_string()).await?;

    let clock = FrameClock::fixed_for(&session.cfg);
    session.run(&straight_line(5), clock, 5, Some(rx)).await?;

    assert_eq!(session.vehicle.setting("power"), 25.0);
    assert_eq!(session.vehicle.setting("weight"), 1000.0);
    assert_eq!(session.vehicle.setting("steeringRate"), 2.0);
    assert_eq!(session.console.history().len(), 3);
    Ok(())
}

#[test]
fn respawn_returns_to_origin() -> anyhow::Result<()> {
    let mut session = DriveSession::new(SimConfig::default());
    for _ in 0..30 {
        session.step(1.0 / 60.0, &InputState::throttle());
    }
    assert!(session.vehicle.position().y < 0.0);

    session.exec_console("respawn")?;
    assert_eq!(session.vehicle.position().y, 0.0);
    assert_eq!(session.vehicle.physics().forward_momentum(), 0.0);
    Ok(())
}

#[test]
fn profile_survives_disk_roundtrip() -> anyhow::Result<()> {
    let session = DriveSession::new(SimConfig::default());
    session.vehicle.update_setting("tyreGrip", 1.5)?;

    let path = std::env::temp_dir().join(format!("drive-profile-{}.json", std::process::id()));
    session.vehicle.settings().profile().save(&path)?;

    let fresh = DriveSession::new(SimConfig::default());
    let applied = fresh
        .vehicle
        .settings()
        .apply_profile(&SettingsProfile::load(&path)?);
    std::fs::remove_file(&path)?;

    assert_eq!(applied, 15);
    assert_eq!(fresh.vehicle.setting("tyreGrip"), 1.5);
    Ok(())
}
