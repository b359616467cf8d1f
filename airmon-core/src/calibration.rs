//! Calibration Offsets and Unit Conversion
//!
//! ## Overview
//!
//! Both sensors report values that need a fixed, board-specific correction
//! before they are useful. The corrections here are simple additive
//! constants measured once per board design; the sensors' internal
//! compensation algorithms remain inside the vendor drivers.
//!
//! ## Pipeline per field
//!
//! ```text
//! raw (driver units) ──► convert units ──► + offset ──► calibrated reading
//!    Pa                    hPa
//!    Ω                     kΩ
//! ```
//!
//! Each offset is applied exactly once, in `apply`. Nothing downstream
//! (fusion, field mapping) touches values again.
//!
//! ## Altitude
//!
//! Altitude is derived from the *uncorrected* pressure with the simplified
//! barometric formula used by the Bosch drivers:
//!
//! ```text
//! h = 44330 × (1 − (p / p₀)^0.1903)
//!
//! p  = station pressure (hPa)
//! p₀ = sea-level reference, 1013.25 hPa
//! ```
//!
//! and then corrected by its own offset. At 1010.0 hPa this gives ~27 m.

use crate::constants::physics::{
    BAROMETRIC_EXPONENT, BAROMETRIC_SCALE_M, OHMS_PER_KOHM, PA_PER_HPA, SEA_LEVEL_PRESSURE_HPA,
};
use crate::constants::sensors::BME680_TEMP_OFFSET_C;
use crate::frame::{PrimaryReading, SecondaryReading};
use crate::traits::{RawAirQuality, RawEnvironment};

/// Altitude in meters for `pressure_hpa` against `sea_level_hpa`
pub fn altitude_m(pressure_hpa: f32, sea_level_hpa: f32) -> f32 {
    BAROMETRIC_SCALE_M * (1.0 - libm::powf(pressure_hpa / sea_level_hpa, BAROMETRIC_EXPONENT))
}

/// Additive corrections for the BME680
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PrimaryOffsets {
    /// °C
    pub temperature: f32,
    /// hPa
    pub pressure: f32,
    /// %RH
    pub humidity: f32,
    /// kΩ
    pub gas_resistance: f32,
    /// m
    pub altitude: f32,
}

impl Default for PrimaryOffsets {
    fn default() -> Self {
        Self {
            temperature: BME680_TEMP_OFFSET_C,
            pressure: 0.0,
            humidity: 0.0,
            gas_resistance: 0.0,
            altitude: 0.0,
        }
    }
}

impl PrimaryOffsets {
    /// Convert units, derive altitude and apply every offset once
    pub fn apply(&self, raw: &RawEnvironment) -> PrimaryReading {
        let pressure_hpa = raw.pressure_pa / PA_PER_HPA;

        PrimaryReading {
            temperature: raw.temperature_c + self.temperature,
            pressure: pressure_hpa + self.pressure,
            humidity: raw.humidity_pct + self.humidity,
            gas_resistance: raw.gas_resistance_ohms / OHMS_PER_KOHM + self.gas_resistance,
            altitude: altitude_m(pressure_hpa, SEA_LEVEL_PRESSURE_HPA) + self.altitude,
        }
    }
}

/// Additive corrections for the CCS811
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SecondaryOffsets {
    /// ppm
    pub co2: f32,
    /// ppb
    pub tvoc: f32,
    /// °C
    pub temperature: f32,
}

impl SecondaryOffsets {
    /// Apply every offset once
    pub fn apply(&self, raw: RawAirQuality, temperature_estimate_c: f32) -> SecondaryReading {
        SecondaryReading {
            co2: f32::from(raw.eco2_ppm) + self.co2,
            tvoc: f32::from(raw.tvoc_ppb) + self.tvoc,
            temperature_estimate: temperature_estimate_c + self.temperature,
        }
    }
}

/// Offsets for both sensors
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationOffsets {
    /// BME680
    pub primary: PrimaryOffsets,
    /// CCS811
    pub secondary: SecondaryOffsets,
}
