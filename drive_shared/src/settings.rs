//! Vehicle settings store.
//!
//! Provides:
//! - `SettingKey`: the declared set of tunable names and their validation rules
//! - `VehicleSettings`: one typed field per key, with a name accessor table
//! - `SettingsStore`: a shareable handle the UI writes and the tick snapshots
//! - `SettingsProfile`: the key/value JSON form used to save and load tunings
//!
//! # Usage
//! ```ignore
//! let store = SettingsStore::default();
//! store.update("power", 14.0)?;
//! let snapshot = store.snapshot(); // once per tick
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Smallest weight the integrator will divide by.
pub const MIN_WEIGHT: f32 = 1e-3;

bitflags::bitflags! {
    /// Validation flags attached to each setting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SettingFlags: u32 {
        const NONE = 0;
        const POSITIVE = 1 << 0;     // > 0
        const NON_NEGATIVE = 1 << 1; // >= 0
        const FRACTION = 1 << 2;     // within [0, 1]
    }
}

impl Default for SettingFlags {
    fn default() -> Self {
        Self::NONE
    }
}

/// Declared setting names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    Power,
    Weight,
    BrakingForce,
    Resistance,
    SteeringForce,
    MaxSteeringAngle,
    SteeringRate,
    SteeringRebound,
    LoadFactorPosY,
    LoadFactorNegY,
    LoadChangeRate,
    SlipLimit,
    DriveBalance,
    BrakeBalance,
    TyreGrip,
}

impl SettingKey {
    pub const ALL: [SettingKey; 15] = [
        SettingKey::Power,
        SettingKey::Weight,
        SettingKey::BrakingForce,
        SettingKey::Resistance,
        SettingKey::SteeringForce,
        SettingKey::MaxSteeringAngle,
        SettingKey::SteeringRate,
        SettingKey::SteeringRebound,
        SettingKey::LoadFactorPosY,
        SettingKey::LoadFactorNegY,
        SettingKey::LoadChangeRate,
        SettingKey::SlipLimit,
        SettingKey::DriveBalance,
        SettingKey::BrakeBalance,
        SettingKey::TyreGrip,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Power => "power",
            SettingKey::Weight => "weight",
            SettingKey::BrakingForce => "brakingForce",
            SettingKey::Resistance => "resistance",
            SettingKey::SteeringForce => "steeringForce",
            SettingKey::MaxSteeringAngle => "maxSteeringAngle",
            SettingKey::SteeringRate => "steeringRate",
            SettingKey::SteeringRebound => "steeringRebound",
            SettingKey::LoadFactorPosY => "loadFactorPosY",
            SettingKey::LoadFactorNegY => "loadFactorNegY",
            SettingKey::LoadChangeRate => "loadChangeRate",
            SettingKey::SlipLimit => "slipLimit",
            SettingKey::DriveBalance => "driveBalance",
            SettingKey::BrakeBalance => "brakeBalance",
            SettingKey::TyreGrip => "tyreGrip",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            SettingKey::Power => "Drive force per tick, scaled by 1000 / weight",
            SettingKey::Weight => "Vehicle weight, a quarter is carried by each wheel",
            SettingKey::BrakingForce => "Brake force per tick, scaled by 1000 / weight",
            SettingKey::Resistance => "Fraction of momentum lost per second",
            SettingKey::SteeringForce => "Yaw produced per degree of steering",
            SettingKey::MaxSteeringAngle => "Steering lock in degrees",
            SettingKey::SteeringRate => "Steering degrees added per frame of input",
            SettingKey::SteeringRebound => "Rate the wheel returns to centre when released",
            SettingKey::LoadFactorPosY => "Load gain under acceleration",
            SettingKey::LoadFactorNegY => "Load gain under braking",
            SettingKey::LoadChangeRate => "Rate the smoothed load follows the raw load",
            SettingKey::SlipLimit => "Load at which the tyres let go (0 disables)",
            SettingKey::DriveBalance => "Share of drive force sent to the rear axle",
            SettingKey::BrakeBalance => "Share of brake force sent to the rear axle",
            SettingKey::TyreGrip => "Grip multiplier on the slip limit",
        }
    }

    pub fn flags(self) -> SettingFlags {
        match self {
            SettingKey::Weight => SettingFlags::POSITIVE,
            SettingKey::DriveBalance | SettingKey::BrakeBalance => SettingFlags::FRACTION,
            SettingKey::Power
            | SettingKey::BrakingForce
            | SettingKey::Resistance
            | SettingKey::MaxSteeringAngle
            | SettingKey::SteeringRebound
            | SettingKey::LoadChangeRate
            | SettingKey::SlipLimit
            | SettingKey::TyreGrip => SettingFlags::NON_NEGATIVE,
            SettingKey::SteeringForce
            | SettingKey::SteeringRate
            | SettingKey::LoadFactorPosY
            | SettingKey::LoadFactorNegY => SettingFlags::NONE,
        }
    }

    /// Checks a candidate value against this key's flags.
    pub fn validate(self, value: f32) -> anyhow::Result<()> {
        if !value.is_finite() {
            bail!("{} must be finite, got {}", self, value);
        }
        let flags = self.flags();
        if flags.contains(SettingFlags::POSITIVE) && value <= 0.0 {
            bail!("{} must be positive, got {}", self, value);
        }
        if flags.contains(SettingFlags::NON_NEGATIVE) && value < 0.0 {
            bail!("{} must not be negative, got {}", self, value);
        }
        if flags.contains(SettingFlags::FRACTION) && !(0.0..=1.0).contains(&value) {
            bail!("{} must lie in [0, 1], got {}", self, value);
        }
        Ok(())
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tunable physical constants, one field per declared key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleSettings {
    pub power: f32,
    pub weight: f32,
    pub braking_force: f32,
    pub resistance: f32,
    pub steering_force: f32,
    pub max_steering_angle: f32,
    pub steering_rate: f32,
    pub steering_rebound: f32,
    pub load_factor_pos_y: f32,
    pub load_factor_neg_y: f32,
    pub load_change_rate: f32,
    pub slip_limit: f32,
    pub drive_balance: f32,
    pub brake_balance: f32,
    pub tyre_grip: f32,
}

impl Default for VehicleSettings {
    fn default() -> Self {
        Self {
            power: 10.0,
            weight: 1000.0,
            braking_force: 10.0,
            resistance: 0.2,
            steering_force: 0.1,
            max_steering_angle: 45.0,
            steering_rate: 1.0,
            steering_rebound: 5.0,
            load_factor_pos_y: 1.0,
            load_factor_neg_y: 1.0,
            load_change_rate: 4.0,
            slip_limit: 0.05,
            drive_balance: 1.0,
            brake_balance: 0.4,
            tyre_grip: 1.0,
        }
    }
}

impl VehicleSettings {
    /// Every declared key present, every value zero.
    pub fn zeroed() -> Self {
        Self {
            power: 0.0,
            weight: 0.0,
            braking_force: 0.0,
            resistance: 0.0,
            steering_force: 0.0,
            max_steering_angle: 0.0,
            steering_rate: 0.0,
            steering_rebound: 0.0,
            load_factor_pos_y: 0.0,
            load_factor_neg_y: 0.0,
            load_change_rate: 0.0,
            slip_limit: 0.0,
            drive_balance: 0.0,
            brake_balance: 0.0,
            tyre_grip: 0.0,
        }
    }

    pub fn get(&self, key: SettingKey) -> f32 {
        match key {
            SettingKey::Power => self.power,
            SettingKey::Weight => self.weight,
            SettingKey::BrakingForce => self.braking_force,
            SettingKey::Resistance => self.resistance,
            SettingKey::SteeringForce => self.steering_force,
            SettingKey::MaxSteeringAngle => self.max_steering_angle,
            SettingKey::SteeringRate => self.steering_rate,
            SettingKey::SteeringRebound => self.steering_rebound,
            SettingKey::LoadFactorPosY => self.load_factor_pos_y,
            SettingKey::LoadFactorNegY => self.load_factor_neg_y,
            SettingKey::LoadChangeRate => self.load_change_rate,
            SettingKey::SlipLimit => self.slip_limit,
            SettingKey::DriveBalance => self.drive_balance,
            SettingKey::BrakeBalance => self.brake_balance,
            SettingKey::TyreGrip => self.tyre_grip,
        }
    }

    fn slot_mut(&mut self, key: SettingKey) -> &mut f32 {
        match key {
            SettingKey::Power => &mut self.power,
            SettingKey::Weight => &mut self.weight,
            SettingKey::BrakingForce => &mut self.braking_force,
            SettingKey::Resistance => &mut self.resistance,
            SettingKey::SteeringForce => &mut self.steering_force,
            SettingKey::MaxSteeringAngle => &mut self.max_steering_angle,
            SettingKey::SteeringRate => &mut self.steering_rate,
            SettingKey::SteeringRebound => &mut self.steering_rebound,
            SettingKey::LoadFactorPosY => &mut self.load_factor_pos_y,
            SettingKey::LoadFactorNegY => &mut self.load_factor_neg_y,
            SettingKey::LoadChangeRate => &mut self.load_change_rate,
            SettingKey::SlipLimit => &mut self.slip_limit,
            SettingKey::DriveBalance => &mut self.drive_balance,
            SettingKey::BrakeBalance => &mut self.brake_balance,
            SettingKey::TyreGrip => &mut self.tyre_grip,
        }
    }

    /// Validated write. A rejected value leaves the field untouched.
    pub fn set(&mut self, key: SettingKey, value: f32) -> anyhow::Result<()> {
        key.validate(value)?;
        *self.slot_mut(key) = value;
        Ok(())
    }

    /// Checks every key, reporting the first rejected value.
    pub fn validate(&self) -> anyhow::Result<()> {
        for key in SettingKey::ALL {
            key.validate(self.get(key))?;
        }
        Ok(())
    }

    /// Steering lock as the integrator sees it: a usable bound for `clamp`
    /// even if the field was written around validation.
    pub fn steering_lock(&self) -> f32 {
        let lock = self.max_steering_angle.abs();
        if lock.is_nan() {
            0.0
        } else {
            lock
        }
    }

    /// Weight as the integrator sees it: never zero, negative or NaN.
    pub fn effective_weight(&self) -> f32 {
        if self.weight.is_finite() && self.weight > MIN_WEIGHT {
            self.weight
        } else {
            MIN_WEIGHT
        }
    }
}

/// Shared handle over the live settings.
///
/// Writers take the lock once per update; the simulation takes one snapshot
/// per tick, so an update lands atomically on the next tick.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<VehicleSettings>>,
}

impl SettingsStore {
    pub fn new(initial: VehicleSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// A store with every declared key set to zero.
    pub fn declared() -> Self {
        Self::new(VehicleSettings::zeroed())
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> VehicleSettings {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Reads a setting by name. Unknown names log an error and read as 0.
    pub fn get(&self, name: &str) -> f32 {
        match SettingKey::from_name(name) {
            Some(key) => self.snapshot().get(key),
            None => {
                error!(key = %name, "Read of undeclared setting, using 0");
                0.0
            }
        }
    }

    /// Writes a setting by name. Unknown names and invalid values are rejected
    /// and the prior value is kept.
    pub fn update(&self, name: &str, value: f32) -> anyhow::Result<()> {
        let Some(key) = SettingKey::from_name(name) else {
            bail!("unknown setting: {}", name);
        };
        self.update_key(key, value)
    }

    pub fn update_key(&self, key: SettingKey, value: f32) -> anyhow::Result<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        guard.set(key, value)?;
        debug!(key = %key, value, "Setting updated");
        Ok(())
    }

    /// Replaces every value at once.
    pub fn replace(&self, settings: VehicleSettings) -> anyhow::Result<()> {
        settings.validate()?;
        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        *guard = settings;
        Ok(())
    }

    /// Captures the current values as a persistable profile.
    pub fn profile(&self) -> SettingsProfile {
        let snapshot = self.snapshot();
        SettingsProfile {
            saved_at: Utc::now(),
            values: SettingKey::ALL
                .iter()
                .map(|k| (k.name().to_string(), snapshot.get(*k)))
                .collect(),
        }
    }

    /// Applies a profile through the validated update path. Unknown names and
    /// rejected values are logged and skipped. Returns how many were applied.
    pub fn apply_profile(&self, profile: &SettingsProfile) -> usize {
        let mut applied = 0;
        for (name, value) in &profile.values {
            match self.update(name, *value) {
                Ok(()) => applied += 1,
                Err(e) => warn!(key = %name, value, error = %e, "Skipped profile value"),
            }
        }
        applied
    }
}

/// Saved tuning: the same name → value contract the store exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsProfile {
    pub saved_at: DateTime<Utc>,
    pub values: BTreeMap<String, f32>,
}

impl SettingsProfile {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings profile {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse settings profile {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = self.to_json_pretty().context("serialize settings profile")?;
        std::fs::write(path, text)
            .with_context(|| format!("write settings profile {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_round_trips_its_name() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_name(key.name()), Some(key));
        }
        assert_eq!(SettingKey::from_name("boost"), None);
    }

    #[test]
    fn declared_store_reads_zero() {
        let store = SettingsStore::declared();
        for key in SettingKey::ALL {
            assert_eq!(store.get(key.name()), 0.0);
        }
    }

    #[test]
    fn undeclared_read_is_zero_not_a_panic() {
        let store = SettingsStore::default();
        assert_eq!(store.get("nitrous"), 0.0);
    }

    #[test]
    fn update_lands_in_next_snapshot() {
        let store = SettingsStore::default();
        let before = store.snapshot();
        store.update("power", 25.0).unwrap();
        assert_eq!(before.power, 10.0);
        assert_eq!(store.snapshot().power, 25.0);
    }

    #[test]
    fn rejected_write_keeps_prior_value() {
        let store = SettingsStore::default();
        assert!(store.update("weight", 0.0).is_err());
        assert!(store.update("weight", -5.0).is_err());
        assert!(store.update("driveBalance", 1.5).is_err());
        assert!(store.update("resistance", f32::NAN).is_err());
        assert!(store.update("nitrous", 1.0).is_err());

        let s = store.snapshot();
        assert_eq!(s.weight, 1000.0);
        assert_eq!(s.drive_balance, 1.0);
        assert_eq!(s.resistance, 0.2);
    }

    #[test]
    fn clones_share_state() {
        let ui = SettingsStore::default();
        let sim = ui.clone();
        ui.update("brakeBalance", 0.7).unwrap();
        assert_eq!(sim.get("brakeBalance"), 0.7);
    }

    #[test]
    fn effective_weight_is_never_degenerate() {
        let mut s = VehicleSettings::zeroed();
        assert_eq!(s.effective_weight(), MIN_WEIGHT);
        s.weight = f32::NAN;
        assert_eq!(s.effective_weight(), MIN_WEIGHT);
        s.weight = 850.0;
        assert_eq!(s.effective_weight(), 850.0);
    }

    #[test]
    fn profile_json_applies_to_fresh_store() {
        let source = SettingsStore::default();
        source.update("tyreGrip", 1.3).unwrap();
        let json = source.profile().to_json_pretty().unwrap();

        let mut profile = SettingsProfile::from_json_str(&json).unwrap();
        profile.values.insert("nitrous".to_string(), 9.0);
        profile.values.insert("weight".to_string(), -1.0);

        let target = SettingsStore::declared();
        let applied = target.apply_profile(&profile);
        assert_eq!(applied, SettingKey::ALL.len() - 1);
        assert_eq!(target.get("tyreGrip"), 1.3);
        assert_eq!(target.get("weight"), 0.0);
    }

    #[test]
    fn settings_json_uses_display_names() {
        let json = serde_json::to_string(&VehicleSettings::default()).unwrap();
        assert!(json.contains("\"maxSteeringAngle\""));
        let partial: VehicleSettings = serde_json::from_str(r#"{"power": 3.0}"#).unwrap();
        assert_eq!(partial.power, 3.0);
        assert_eq!(partial.weight, 1000.0);
    }
}
