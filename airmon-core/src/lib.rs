//! Core firmware logic for the Airmon air-quality monitor
//!
//! Polls two I2C sensors (a BME680-class temperature/pressure/humidity/gas
//! sensor and a CCS811-class eCO2/TVOC sensor), fuses their readings into a
//! single frame and uploads it to a ThingSpeak-style telemetry channel.
//!
//! Vendor drivers, the WiFi stack and the HTTP client are reached through the
//! traits in [`traits`]; everything in this crate is the sequencing around
//! them:
//!
//! - [`sensors::SensorOrchestrator`] - setup with retry, calibrated reads, fusion
//! - [`scheduler::UploadScheduler`] - upload gating, field mapping, status posts
//! - [`network::connect`] - the WiFi connect/reconnect routine
//! - [`device::Device`] - the process-level state machine tying it together
//!
//! Key constraints:
//! - Single-threaded, blocking, no allocation
//! - Every retry goes through a [`retry::RetryPolicy`] and an injected delay
//! - A frame is only uploaded when every live sensor read succeeded
//!
//! ```no_run
//! use airmon_core::{calibration::altitude_m, constants::SEA_LEVEL_PRESSURE_HPA};
//!
//! let altitude = altitude_m(1010.0, SEA_LEVEL_PRESSURE_HPA);
//! assert!(altitude > 26.0 && altitude < 28.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod calibration;
pub mod config;
pub mod constants;
pub mod device;
pub mod errors;
pub mod frame;
pub mod network;
pub mod retry;
pub mod scheduler;
pub mod sensors;
pub mod time;
pub mod traits;

// Public API
pub use config::MonitorConfig;
pub use device::{Device, DeviceState};
pub use errors::{ConfigError, DriverError, MonitorError, MonitorResult, TransportError};
pub use frame::{DataFrame, Frame, PrimaryReading, SecondaryReading};
pub use retry::{Backoff, RetryPolicy};
pub use scheduler::{is_due, UploadScheduler};
pub use sensors::{SensorId, SensorOrchestrator, SensorState};
pub use traits::{
    AirQualitySensor, ConnectionState, EnvironmentalSensor, NetworkLink, StatusCode,
    TelemetryClient,
};

/// Crate version, reported in the boot status message
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
