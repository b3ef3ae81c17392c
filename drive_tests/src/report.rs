//! Scenario report.
//!
//! Collects scenario outcomes and the values each one measured, and writes
//! them as JSON so runs can be diffed against a stored baseline.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    Passed,
    Failed,
}

impl ScenarioStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            ScenarioStatus::Passed => "✓",
            ScenarioStatus::Failed => "✗",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// e.g. "DYN-001".
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: ScenarioStatus,
    pub duration: Duration,
    pub error_message: Option<String>,
    /// Named values the scenario measured.
    pub measured: BTreeMap<String, f64>,
}

/// Category summary statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub total_duration: Duration,
}

impl CategoryStats {
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.passed as f64 / self.total as f64) * 100.0
    }

    pub fn add_result(&mut self, result: &ScenarioResult) {
        self.total += 1;
        self.total_duration += result.duration;
        match result.status {
            ScenarioStatus::Passed => self.passed += 1,
            ScenarioStatus::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<ScenarioResult>,
    pub metadata: HashMap<String, String>,
}

impl ScenarioReport {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            generated_at: Utc::now(),
            results: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn add_result(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    pub fn overall_stats(&self) -> CategoryStats {
        let mut stats = CategoryStats::default();
        for result in &self.results {
            stats.add_result(result);
        }
        stats
    }

    pub fn stats_by_category(&self) -> BTreeMap<String, CategoryStats> {
        let mut map: BTreeMap<String, CategoryStats> = BTreeMap::new();
        for result in &self.results {
            map.entry(result.category.clone())
                .or_default()
                .add_result(result);
        }
        map
    }

    pub fn all_passed(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.status == ScenarioStatus::Passed)
    }

    pub fn save_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize report")?;
        std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))
    }
}
