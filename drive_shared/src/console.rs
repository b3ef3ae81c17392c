//! Tuning console.
//!
//! Text front end over a `SettingsStore`, used by debug tooling to retune the
//! vehicle while it drives.
//!
//! # Usage
//! ```ignore
//! let mut console = SettingsConsole::new(store.clone());
//! console.exec("set power 14")?;
//! console.exec("weight")?;       // query
//! console.exec("weight 1200")?;  // set
//! ```

use anyhow::{bail, Context};

use crate::settings::{SettingKey, SettingsStore, VehicleSettings};

pub struct SettingsConsole {
    store: SettingsStore,
    defaults: VehicleSettings,
    history: Vec<String>,
    max_history: usize,
}

impl SettingsConsole {
    pub fn new(store: SettingsStore) -> Self {
        Self::with_defaults(store, VehicleSettings::default())
    }

    /// `defaults` is what `reset` restores.
    pub fn with_defaults(store: SettingsStore, defaults: VehicleSettings) -> Self {
        Self {
            store,
            defaults,
            history: Vec::new(),
            max_history: 100,
        }
    }

    /// Executes one console line and returns its output lines.
    pub fn exec(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            return Ok(Vec::new());
        }

        self.history.push(line.to_string());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        let tokens = parse_command_line(line);
        let Some((cmd, args)) = tokens.split_first() else {
            return Ok(Vec::new());
        };
        let args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

        match cmd.as_str() {
            "help" => Ok(vec![
                "Commands: help, list, get <name>, set <name> <value>, reset [name]".to_string(),
                "Typing a setting name shows it; '<name> <value>' sets it.".to_string(),
            ]),
            "list" => Ok(self.list()),
            "get" => match args.first() {
                Some(name) => self.show(name),
                None => bail!("usage: get <name>"),
            },
            "set" => {
                if args.len() < 2 {
                    bail!("usage: set <name> <value>");
                }
                self.set(args[0], args[1])
            }
            "reset" => self.reset(args.first().copied()),
            name if SettingKey::from_name(name).is_some() => match args.first() {
                Some(value) => self.set(name, value),
                None => self.show(name),
            },
            other => Ok(vec![format!("Unknown command: {}", other)]),
        }
    }

    fn list(&self) -> Vec<String> {
        let current = self.store.snapshot();
        SettingKey::ALL
            .iter()
            .map(|k| {
                format!(
                    "  {} = {} (default: {}) - {}",
                    k,
                    current.get(*k),
                    self.defaults.get(*k),
                    k.description()
                )
            })
            .collect()
    }

    fn show(&self, name: &str) -> anyhow::Result<Vec<String>> {
        let Some(key) = SettingKey::from_name(name) else {
            bail!("unknown setting: {}", name);
        };
        Ok(vec![format!(
            "{} = {} (default: {})",
            key,
            self.store.snapshot().get(key),
            self.defaults.get(key)
        )])
    }

    fn set(&self, name: &str, value: &str) -> anyhow::Result<Vec<String>> {
        let value: f32 = value
            .parse()
            .with_context(|| format!("'{}' is not a number", value))?;
        self.store
            .update(name, value)
            .with_context(|| format!("set {}", name))?;
        Ok(vec![format!("{} = {}", name, value)])
    }

    fn reset(&self, name: Option<&str>) -> anyhow::Result<Vec<String>> {
        match name {
            Some(name) => {
                let Some(key) = SettingKey::from_name(name) else {
                    bail!("unknown setting: {}", name);
                };
                self.store.update_key(key, self.defaults.get(key))?;
                Ok(vec![format!("{} = {}", key, self.defaults.get(key))])
            }
            None => {
                self.store.replace(self.defaults)?;
                Ok(vec!["All settings reset".to_string()])
            }
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }
}

/// Splits a console line into tokens, respecting quotes.
fn parse_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
