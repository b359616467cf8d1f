//! Constants for Airmon Core
//!
//! Centralized, documented constants used throughout the firmware. Defaults
//! in [`crate::config`] are built from these values, so changing a constant
//! here changes the out-of-the-box behavior of every device.
//!
//! ## Organization
//!
//! - **Physics**: Barometric reference values
//! - **Sensors**: Setup retry budgets, measurement profiles, calibration defaults
//! - **Time**: Link polling, loop pacing and upload intervals
//! - **Telemetry**: Channel field layout, status codes and limits
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Include units in every name
//! 3. Reference the datasheet or service limit a value comes from

/// Barometric reference values.
pub mod physics;

/// Sensor setup, measurement and calibration defaults.
pub mod sensors;

/// Intervals and timeouts for the control loop and WiFi link.
pub mod time;

/// Telemetry channel layout and limits.
pub mod telemetry;

// Re-export commonly used constants for convenience
pub use physics::{BAROMETRIC_EXPONENT, BAROMETRIC_SCALE_M, SEA_LEVEL_PRESSURE_HPA};

pub use sensors::{
    BME680_TEMP_OFFSET_C, CCS811_BASELINE_TEMP_C, SENSOR_SETUP_MAX_RETRIES,
    SENSOR_SETUP_RETRY_DELAY_MS,
};

pub use time::{
    DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_UPLOAD_INTERVAL_MS, WIFI_STATUS_POLL_INTERVAL_MS,
};

pub use telemetry::{FIELD_COUNT, HTTP_OK, MAX_STATUS_LEN, MIN_UPLOAD_INTERVAL_MS};
