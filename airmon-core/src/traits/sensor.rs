//! Sensor Driver Boundary
//!
//! Thin views of the vendor drivers. Implementations wrap a blocking I2C
//! driver and report raw physical values in the driver's native units; unit
//! conversion and calibration happen in the orchestrator.

use crate::config::SensorProfile;
use crate::errors::DriverError;

/// Raw output of one BME680-class forced-mode measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEnvironment {
    /// Compensated temperature (°C)
    pub temperature_c: f32,
    /// Compensated pressure (Pa)
    pub pressure_pa: f32,
    /// Relative humidity (%)
    pub humidity_pct: f32,
    /// Gas sensor resistance (Ω)
    pub gas_resistance_ohms: f32,
}

impl RawEnvironment {
    /// True when every value is a finite number
    pub fn is_finite(&self) -> bool {
        self.temperature_c.is_finite()
            && self.pressure_pa.is_finite()
            && self.humidity_pct.is_finite()
            && self.gas_resistance_ohms.is_finite()
    }
}

/// Raw output of one CCS811-class measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAirQuality {
    /// Equivalent CO2 (ppm)
    pub eco2_ppm: u16,
    /// Total volatile organic compounds (ppb)
    pub tvoc_ppb: u16,
}

/// Temperature/pressure/humidity/gas sensor (primary)
pub trait EnvironmentalSensor {
    /// Probe and reset the sensor
    fn begin(&mut self) -> Result<(), DriverError>;

    /// Apply oversampling, IIR filter and gas heater settings
    fn configure(&mut self, profile: &SensorProfile) -> Result<(), DriverError>;

    /// Trigger a measurement and block until it completes
    fn perform_reading(&mut self) -> Result<RawEnvironment, DriverError>;
}

/// eCO2/TVOC sensor (secondary)
pub trait AirQualitySensor {
    /// Probe the sensor, start its application firmware and set drive mode
    fn begin(&mut self) -> Result<(), DriverError>;

    /// True when a new sample is waiting
    fn data_ready(&mut self) -> Result<bool, DriverError>;

    /// Feed ambient humidity (%) and temperature (°C) for compensation
    fn set_environmental_data(
        &mut self,
        humidity_pct: f32,
        temperature_c: f32,
    ) -> Result<(), DriverError>;

    /// Read the waiting sample; a nonzero device status is `DriverError::Device`
    fn read_data(&mut self) -> Result<RawAirQuality, DriverError>;

    /// Temperature estimate from the sensor's thermistor input (°C)
    fn temperature(&mut self) -> Result<f32, DriverError>;

    /// Set the thermistor offset subtracted from later estimates (°C)
    fn set_temperature_offset(&mut self, offset_c: f32) -> Result<(), DriverError>;
}
