//! Sensor Lifecycle and Orchestration
//!
//! - [`state`] - Per-sensor lifecycle state
//! - [`orchestrator`] - Setup with retry, calibrated reads and fusion

pub mod orchestrator;
pub mod state;

pub use orchestrator::SensorOrchestrator;
pub use state::{SensorId, SensorState};
