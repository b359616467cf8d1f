//! Error Types for Sensor, Link and Transport Failures
//!
//! ## Design Philosophy
//!
//! Errors are returned from the control loop's hot path and stored in cycle
//! reports, so every type here is small, `Copy`, and free of heap data:
//! messages are `&'static str` and identifiers are enums.
//!
//! ## Error Categories
//!
//! ### Setup
//! - `SetupFailure`: a sensor never answered `begin()` within its retry
//!   budget. Fatal for that sensor only; the device keeps running degraded.
//!
//! ### Per-cycle
//! - `ReadFailure`: one read failed. The cycle produces no frame and no
//!   upload; the next cycle reads again.
//! - `SensorUnavailable`: a read was requested from a sensor that is not
//!   Ready (never initialized, or Faulted).
//! - `NoSensors`: every sensor is Faulted, nothing to acquire.
//!
//! ### Network
//! - `LinkFailure`: WiFi association failed or timed out. Uploads are skipped
//!   until the reconnect on a later cycle succeeds.
//! - `Transport`: the telemetry write itself failed before a status code was
//!   produced. Non-200 status codes are *not* errors; they are returned to
//!   the caller verbatim.
//!
//! ### Configuration
//! - `Config`: the configuration failed validation at startup.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use airmon_core::{MonitorError, SensorId};
//!
//! fn on_cycle_error(err: MonitorError) {
//!     match err {
//!         MonitorError::ReadFailure { .. } => {
//!             // Skip this cycle's upload, try again next cycle
//!         }
//!         MonitorError::LinkFailure { .. } => {
//!             // Reconnect on the next cycle
//!         }
//!         MonitorError::SetupFailure { sensor: SensorId::Secondary, .. } => {
//!             // Run without CO2/TVOC fields
//!         }
//!         _ => {}
//!     }
//! }
//! ```

use thiserror_no_std::Error;

use crate::sensors::SensorId;
use crate::traits::ConnectionState;

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Failure reported by a sensor driver
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// I2C transaction failed (NACK, arbitration loss, bus stuck)
    #[error("I2C bus error")]
    Bus,

    /// No fresh sample available yet
    #[error("sensor has no new data")]
    NotReady,

    /// Sensor reported a nonzero status/error code
    #[error("sensor error code {0}")]
    Device(u8),

    /// Driver produced a value that is not a finite number
    #[error("sensor returned invalid data")]
    InvalidData,
}

/// Failure writing to the telemetry channel before a status code was produced
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Network link is down
    #[error("network link is down")]
    LinkDown,

    /// Request could not be sent or the connection dropped
    #[error("telemetry request failed")]
    Request,

    /// Server did not answer in time
    #[error("telemetry request timed out")]
    Timeout,

    /// Field index outside 1..=8
    #[error("invalid field index {0}")]
    InvalidField(u8),
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No SSID configured
    #[error("WiFi SSID is empty")]
    EmptySsid,

    /// No channel write key configured
    #[error("telemetry write key is empty")]
    EmptyWriteKey,

    /// Channel id 0 is never a valid channel
    #[error("telemetry channel id is zero")]
    ZeroChannel,

    /// A string did not fit its fixed-capacity buffer
    #[error("{field} exceeds {capacity} bytes")]
    TooLong {
        /// Name of the offending field
        field: &'static str,
        /// Capacity of the buffer
        capacity: usize,
    },

    /// Sample interval of zero would spin the control loop
    #[error("sample interval is zero")]
    ZeroSampleInterval,

    /// Upload interval below the channel's rate limit
    #[error("upload interval {interval_ms}ms below minimum {min_ms}ms")]
    UploadIntervalTooShort {
        /// Configured interval
        interval_ms: u64,
        /// Minimum accepted by the channel
        min_ms: u64,
    },

    /// Configuration text could not be parsed
    #[error("configuration parse error")]
    Parse,
}

/// Top-level error for monitor operations
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MonitorError {
    /// Sensor setup failed after exhausting its retry budget
    #[error("{sensor} setup failed after {attempts} attempts")]
    SetupFailure {
        /// Sensor that faulted
        sensor: SensorId,
        /// Total `begin()` attempts made
        attempts: u32,
    },

    /// A single read failed
    #[error("{sensor} read failed: {cause}")]
    ReadFailure {
        /// Sensor that failed
        sensor: SensorId,
        /// Driver-level cause
        cause: DriverError,
    },

    /// Read requested from a sensor that is not Ready
    #[error("{sensor} is not ready")]
    SensorUnavailable {
        /// Sensor that was asked
        sensor: SensorId,
    },

    /// Every sensor is Faulted
    #[error("no sensors available")]
    NoSensors,

    /// Network link could not be brought up
    #[error("network link failure: {state}")]
    LinkFailure {
        /// Link state when the connect routine gave up
        state: ConnectionState,
    },

    /// Telemetry write failed
    #[error("transport failure: {0}")]
    Transport(TransportError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(ConfigError),
}

impl From<TransportError> for MonitorError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

impl From<ConfigError> for MonitorError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DriverError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Bus => defmt::write!(fmt, "I2C bus error"),
            Self::NotReady => defmt::write!(fmt, "no new data"),
            Self::Device(code) => defmt::write!(fmt, "error code {}", code),
            Self::InvalidData => defmt::write!(fmt, "invalid data"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransportError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::LinkDown => defmt::write!(fmt, "link down"),
            Self::Request => defmt::write!(fmt, "request failed"),
            Self::Timeout => defmt::write!(fmt, "timeout"),
            Self::InvalidField(index) => defmt::write!(fmt, "invalid field {}", index),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::EmptySsid => defmt::write!(fmt, "empty SSID"),
            Self::EmptyWriteKey => defmt::write!(fmt, "empty write key"),
            Self::ZeroChannel => defmt::write!(fmt, "zero channel"),
            Self::TooLong { field, capacity } =>
                defmt::write!(fmt, "{} exceeds {} bytes", field, capacity),
            Self::ZeroSampleInterval => defmt::write!(fmt, "zero sample interval"),
            Self::UploadIntervalTooShort { interval_ms, min_ms } =>
                defmt::write!(fmt, "upload interval {}ms < {}ms", interval_ms, min_ms),
            Self::Parse => defmt::write!(fmt, "parse error"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MonitorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SetupFailure { sensor, attempts } =>
                defmt::write!(fmt, "{} setup failed after {} attempts", sensor, attempts),
            Self::ReadFailure { sensor, cause } =>
                defmt::write!(fmt, "{} read failed: {}", sensor, cause),
            Self::SensorUnavailable { sensor } =>
                defmt::write!(fmt, "{} not ready", sensor),
            Self::NoSensors => defmt::write!(fmt, "no sensors available"),
            Self::LinkFailure { state } =>
                defmt::write!(fmt, "link failure: {}", state),
            Self::Transport(err) => defmt::write!(fmt, "transport: {}", err),
            Self::Config(err) => defmt::write!(fmt, "config: {}", err),
        }
    }
}
