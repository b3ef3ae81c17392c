//! Driving session.
//!
//! The session maintains:
//! - The single long-lived vehicle
//! - A tuning console sharing the vehicle's settings store
//! - Pose history for render interpolation
//! - The frame loop, driven by a fixed or wall-clock frame clock
//!
//! Each frame samples input, applies it to the vehicle, ticks the vehicle with
//! that frame's `dt`, and records the resulting pose.

use std::time::Duration;

use drive_shared::{
    config::SimConfig, console::SettingsConsole, telemetry::VehicleTelemetry, vehicle::Vehicle,
};
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    input::{apply_input, InputState},
    interp::{Pose, PoseBuffer},
    script::InputScript,
};

/// Where each frame's `dt` comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameClock {
    /// Every frame advances by the same `dt`.
    Fixed { dt: f32 },
    /// Frames are paced at `hz` and `dt` is the measured wall-clock gap, so
    /// stalls show up as long frames.
    Realtime { hz: u32 },
}

impl FrameClock {
    pub fn fixed_for(cfg: &SimConfig) -> Self {
        FrameClock::Fixed {
            dt: 1.0 / cfg.frame_hz.max(1) as f32,
        }
    }
}

pub struct DriveSession {
    pub cfg: SimConfig,
    pub vehicle: Vehicle,
    pub console: SettingsConsole,
    pub poses: PoseBuffer,
    frame: u64,
    /// Log telemetry every N frames; 0 disables.
    pub log_every: u64,
}

impl DriveSession {
    pub fn new(cfg: SimConfig) -> Self {
        let vehicle = Vehicle::new(&cfg);
        let console = SettingsConsole::with_defaults(vehicle.settings().clone(), cfg.settings);
        let mut poses = PoseBuffer::new(32);
        poses.push(Pose::of(&vehicle));
        Self {
            cfg,
            vehicle,
            console,
            poses,
            frame: 0,
            log_every: 0,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs one frame: input, tick, record.
    pub fn step(&mut self, dt: f32, input: &InputState) {
        apply_input(&mut self.vehicle, input);
        self.vehicle.tick(dt);
        self.poses.push(Pose::of(&self.vehicle));
        self.frame += 1;

        if self.log_every > 0 && self.frame % self.log_every == 0 {
            info!("{}", self.vehicle.telemetry().summary());
        }
    }

    /// Runs `frames` frames of `script` against `clock`. Console lines arriving
    /// on `console_rx` are applied between frames, so a change is seen by the
    /// very next tick.
    pub async fn run(
        &mut self,
        script: &InputScript,
        clock: FrameClock,
        frames: u64,
        mut console_rx: Option<mpsc::Receiver<String>>,
    ) -> anyhow::Result<VehicleTelemetry> {
        info!(frames, ?clock, "Driving");

        match clock {
            FrameClock::Fixed { dt } => {
                for _ in 0..frames {
                    self.drain_console(&mut console_rx);
                    let input = script.input_at(self.frame);
                    self.step(dt, &input);
                    tokio::task::yield_now().await;
                }
            }
            FrameClock::Realtime { hz } => {
                let period = Duration::from_secs_f32(1.0 / hz.max(1) as f32);
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker.tick().await;
                let mut last = Instant::now();

                for _ in 0..frames {
                    ticker.tick().await;
                    let now = Instant::now();
                    let dt = now.duration_since(last).as_secs_f32();
                    last = now;

                    self.drain_console(&mut console_rx);
                    let input = script.input_at(self.frame);
                    self.step(dt, &input);
                }
            }
        }

        let telemetry = self.vehicle.telemetry();
        info!(
            frames = self.frame,
            momentum = telemetry.forward_momentum,
            x = telemetry.position.x,
            y = telemetry.position.y,
            "Drive finished"
        );
        Ok(telemetry)
    }

    fn drain_console(&mut self, rx: &mut Option<mpsc::Receiver<String>>) {
        let Some(rx) = rx else {
            return;
        };
        while let Ok(line) = rx.try_recv() {
            match self.exec_console(&line) {
                Ok(output) => {
                    for line in output {
                        println!("{}", line);
                    }
                }
                Err(e) => warn!(error = %e, "Console command failed"),
            }
        }
    }

    /// Executes a console command.
    pub fn exec_console(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.first().copied() {
            Some("status") => {
                let t = self.vehicle.telemetry();
                let mut out = vec![t.summary()];
                for w in &t.wheels {
                    out.push(format!(
                        "  {} rotation {:.3} delta {:.5} torque {:.4}",
                        w.id, w.rotation, w.rotation_delta, w.torque
                    ));
                }
                out.push(format!(
                    "  load long {:.4} lat {:.4}",
                    t.load.longitudinal, t.load.lateral
                ));
                Ok(out)
            }
            Some("respawn") => {
                self.vehicle.reset(0.0, 0.0);
                self.poses = PoseBuffer::new(32);
                self.poses.push(Pose::of(&self.vehicle));
                debug!(frame = self.frame, "Respawned");
                Ok(vec!["Respawned at origin".to_string()])
            }
            _ => self.console.exec(line),
        }
    }
}
