//! Standalone driving binary.
//!
//! Usage:
//!   cargo run -p drive_client -- [--config sim.json] [--script drive.json] [--frames 600]
//!                                [--realtime] [--load-settings tune.json]
//!                                [--save-settings tune.json] [--log-every 60] [--telemetry]
//!
//! Drives the vehicle through an input script (a built-in demo if none is
//! given) and prints the final telemetry.
//!
//! Console commands (stdin, applied between frames):
//!   list                 - Show every setting
//!   set <name> <value>   - Change a setting
//!   reset [name]         - Restore defaults
//!   status               - Show vehicle state
//!   respawn              - Put the vehicle back at the origin

use std::env;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use drive_client::script::InputScript;
use drive_client::session::{DriveSession, FrameClock};
use drive_shared::config::SimConfig;
use drive_shared::settings::SettingsProfile;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    frames: Option<u64>,
    realtime: bool,
    load_settings: Option<PathBuf>,
    save_settings: Option<PathBuf>,
    log_every: u64,
    telemetry: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--config" if i + 1 < argv.len() => {
                args.config = Some(PathBuf::from(&argv[i + 1]));
                i += 2;
            }
            "--script" if i + 1 < argv.len() => {
                args.script = Some(PathBuf::from(&argv[i + 1]));
                i += 2;
            }
            "--frames" if i + 1 < argv.len() => {
                args.frames = argv[i + 1].parse().ok();
                i += 2;
            }
            "--load-settings" if i + 1 < argv.len() => {
                args.load_settings = Some(PathBuf::from(&argv[i + 1]));
                i += 2;
            }
            "--save-settings" if i + 1 < argv.len() => {
                args.save_settings = Some(PathBuf::from(&argv[i + 1]));
                i += 2;
            }
            "--log-every" if i + 1 < argv.len() => {
                args.log_every = argv[i + 1].parse().unwrap_or(0);
                i += 2;
            }
            "--realtime" => {
                args.realtime = true;
                i += 1;
            }
            "--telemetry" => {
                args.telemetry = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    args
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let cfg = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let script = match &args.script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::demo(),
    };
    info!(
        max_substep = cfg.max_substep,
        wheel_sync = ?cfg.wheel_sync,
        frame_hz = cfg.frame_hz,
        "Starting driving session"
    );

    let mut session = DriveSession::new(cfg.clone());
    session.log_every = args.log_every;

    if let Some(path) = &args.load_settings {
        let profile = SettingsProfile::load(path)?;
        let applied = session.vehicle.settings().apply_profile(&profile);
        info!(path = %path.display(), applied, "Loaded settings profile");
    }

    // Set up console input channel.
    let (console_tx, console_rx) = mpsc::channel::<String>(32);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    let clock = if args.realtime {
        FrameClock::Realtime { hz: cfg.frame_hz }
    } else {
        FrameClock::fixed_for(&cfg)
    };
    let frames = args.frames.unwrap_or_else(|| script.total_frames());

    let telemetry = session
        .run(&script, clock, frames, Some(console_rx))
        .await
        .context("drive")?;

    println!("{}", telemetry.summary());
    if args.telemetry {
        println!("{}", telemetry.to_json().context("serialize telemetry")?);
    }

    if let Some(path) = &args.save_settings {
        session.vehicle.settings().profile().save(path)?;
        info!(path = %path.display(), "Saved settings profile");
    }

    Ok(())
}
