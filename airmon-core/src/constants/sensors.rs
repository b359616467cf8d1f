//! Sensor Setup and Calibration Defaults
//!
//! Values for the BME680 (primary: temperature, pressure, humidity, gas) and
//! CCS811 (secondary: eCO2, TVOC) as wired on the reference board.

// ===== SETUP RETRY =====

/// Retries after the first failed `begin()` before a sensor is Faulted.
///
/// A sensor gets `SENSOR_SETUP_MAX_RETRIES + 1` attempts in total.
pub const SENSOR_SETUP_MAX_RETRIES: u32 = 20;

/// Fixed wait between setup attempts (milliseconds).
///
/// Long enough for a sensor held in reset by a brown-out to come back.
pub const SENSOR_SETUP_RETRY_DELAY_MS: u32 = 2000;

// ===== BME680 MEASUREMENT PROFILE =====

/// Gas heater target temperature (°C).
///
/// Source: Bosch BME680 datasheet, recommended 200-400°C
pub const BME680_HEATER_TEMP_C: u16 = 320;

/// Gas heater on-time (milliseconds).
///
/// Source: Bosch BME680 datasheet, ~150 ms reaches target temperature
pub const BME680_HEATER_DURATION_MS: u16 = 150;

// ===== CALIBRATION =====

/// Additive BME680 temperature correction (°C).
///
/// The board's own dissipation heats the sensor; measured against a
/// reference thermometer in free air.
pub const BME680_TEMP_OFFSET_C: f32 = -2.1;

/// Ambient temperature the CCS811 thermistor is trimmed to at setup (°C).
///
/// After the first sample the driver offset is set to `reading − 25.0`.
pub const CCS811_BASELINE_TEMP_C: f32 = 25.0;

/// Maximum polls for the CCS811's first sample during setup.
///
/// The CCS811 produces its first sample about 1 s after drive mode is set.
pub const CCS811_BASELINE_MAX_POLLS: u32 = 50;

/// Wait between CCS811 readiness polls during setup (milliseconds).
pub const CCS811_BASELINE_POLL_MS: u32 = 100;
