//! `drive_client`
//!
//! Client-side systems for the single-player driving demo:
//! - Frame loop with fixed or wall-clock `dt`
//! - Input mapping from sampled key/touch state to vehicle control
//! - Scripted input for headless runs
//! - Pose history for render interpolation
//! - Tuning console wiring

pub mod input;
pub mod interp;
pub mod script;
pub mod session;

pub use session::DriveSession;
