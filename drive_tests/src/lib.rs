//! `drive_tests`
//!
//! Reference scenarios shared by the integration tests and the
//! `scenario_runner` binary, plus the JSON report the runner writes.

pub mod report;
pub mod scenarios;
