//! Physical Constants for Airmon
//!
//! Reference values for deriving altitude from barometric pressure.

/// Standard atmospheric pressure at sea level (hPa/mbar).
///
/// Reference pressure for altitude calculations. Actual sea-level pressure
/// varies with weather, so derived altitude drifts by roughly 8 m per hPa
/// of weather-driven change.
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_PRESSURE_HPA: f32 = 1013.25;

/// Exponent of the simplified barometric formula.
///
/// `h = 44330 × (1 − (p / p₀)^0.1903)`
///
/// Source: Bosch BMP180/BME680 application notes
pub const BAROMETRIC_EXPONENT: f32 = 0.1903;

/// Scale factor (meters) of the simplified barometric formula.
///
/// Source: Bosch BMP180/BME680 application notes
pub const BAROMETRIC_SCALE_M: f32 = 44330.0;

/// Pascals per hectopascal.
pub const PA_PER_HPA: f32 = 100.0;

/// Ohms per kiloohm.
pub const OHMS_PER_KOHM: f32 = 1000.0;
