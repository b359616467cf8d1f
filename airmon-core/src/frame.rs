//! Calibrated Readings and Fused Frames
//!
//! ## Data flow
//!
//! ```text
//! BME680 ──► PrimaryReading ───┐
//!                              ├──► DataFrame (all 8 fields) ──► FieldSet 1..8
//! CCS811 ──► SecondaryReading ─┘
//! ```
//!
//! A [`DataFrame`] can only be built from two readings taken in the same
//! cycle, so a partially filled frame is unrepresentable. When one sensor is
//! permanently Faulted the device runs degraded and a [`Frame`] carries only
//! the live sensor's reading; its field set simply leaves the dead sensor's
//! fields unset.
//!
//! ## Channel field layout
//!
//! | Index | Field                  | Unit |
//! |-------|------------------------|------|
//! | 1     | temperature            | °C   |
//! | 2     | pressure               | hPa  |
//! | 3     | humidity               | %RH  |
//! | 4     | gas_resistance         | kΩ   |
//! | 5     | altitude               | m    |
//! | 6     | co2                    | ppm  |
//! | 7     | tvoc                   | ppb  |
//! | 8     | temperature_estimate   | °C   |

use crate::constants::telemetry::FIELD_COUNT;
use crate::errors::TransportError;

/// Calibrated BME680 reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrimaryReading {
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

impl PrimaryReading {
    /// Ambient conditions for compensating the secondary sensor
    pub fn ambient(&self) -> Ambient {
        Ambient {
            humidity: self.humidity,
            temperature: self.temperature,
        }
    }
}

/// Calibrated CCS811 reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecondaryReading {
    /// eCO2 (ppm)
    pub co2: f32,
    /// TVOC (ppb)
    pub tvoc: f32,
    /// Thermistor estimate (°C)
    pub temperature_estimate: f32,
}

/// Ambient humidity/temperature used to compensate the CCS811
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ambient {
    /// %RH
    pub humidity: f32,
    /// °C
    pub temperature: f32,
}

/// Channel field, numbered by its index in the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Field {
    /// °C
    Temperature = 1,
    /// hPa
    Pressure = 2,
    /// %RH
    Humidity = 3,
    /// kΩ
    GasResistance = 4,
    /// m
    Altitude = 5,
    /// ppm
    Co2 = 6,
    /// ppb
    Tvoc = 7,
    /// °C
    TemperatureEstimate = 8,
}

impl Field {
    /// Every field in upload order
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Temperature,
        Field::Pressure,
        Field::Humidity,
        Field::GasResistance,
        Field::Altitude,
        Field::Co2,
        Field::Tvoc,
        Field::TemperatureEstimate,
    ];

    /// 1-based channel index
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Field values staged for one upload
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldSet {
    values: [Option<f32>; FIELD_COUNT],
}

impl FieldSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set field `index` (1..=8)
    pub fn set(&mut self, index: u8, value: f32) -> Result<(), TransportError> {
        let slot = Self::slot(index)?;
        self.values[slot] = Some(value);
        Ok(())
    }

    /// Value of field `index`, if set
    pub fn get(&self, index: u8) -> Option<f32> {
        Self::slot(index).ok().and_then(|slot| self.values[slot])
    }

    /// Value of `field`, if set
    pub fn field(&self, field: Field) -> Option<f32> {
        self.get(field.index())
    }

    /// Number of fields set
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set fields as `(index, value)` in index order
    pub fn iter(&self) -> impl Iterator<Item = (u8, f32)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| value.map(|v| (slot as u8 + 1, v)))
    }

    /// Unset every field
    pub fn clear(&mut self) {
        self.values = [None; FIELD_COUNT];
    }

    fn slot(index: u8) -> Result<usize, TransportError> {
        match index {
            1..=8 => Ok(usize::from(index) - 1),
            _ => Err(TransportError::InvalidField(index)),
        }
    }

    fn put(&mut self, field: Field, value: f32) {
        self.values[usize::from(field.index()) - 1] = Some(value);
    }

    fn put_primary(&mut self, reading: &PrimaryReading) {
        self.put(Field::Temperature, reading.temperature);
        self.put(Field::Pressure, reading.pressure);
        self.put(Field::Humidity, reading.humidity);
        self.put(Field::GasResistance, reading.gas_resistance);
        self.put(Field::Altitude, reading.altitude);
    }

    fn put_secondary(&mut self, reading: &SecondaryReading) {
        self.put(Field::Co2, reading.co2);
        self.put(Field::Tvoc, reading.tvoc);
        self.put(Field::TemperatureEstimate, reading.temperature_estimate);
    }
}

/// Both sensors' readings from one acquisition cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataFrame {
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
    /// ppm
    pub co2: f32,
    /// ppb
    pub tvoc: f32,
    /// °C
    pub temperature_estimate: f32,
}

impl DataFrame {
    /// Join two readings from the same cycle
    pub fn fuse(primary: &PrimaryReading, secondary: &SecondaryReading) -> Self {
        Self {
            temperature: primary.temperature,
            pressure: primary.pressure,
            humidity: primary.humidity,
            gas_resistance: primary.gas_resistance,
            altitude: primary.altitude,
            co2: secondary.co2,
            tvoc: secondary.tvoc,
            temperature_estimate: secondary.temperature_estimate,
        }
    }

    /// All eight channel fields
    pub fn fields(&self) -> FieldSet {
        let mut fields = FieldSet::new();
        fields.put(Field::Temperature, self.temperature);
        fields.put(Field::Pressure, self.pressure);
        fields.put(Field::Humidity, self.humidity);
        fields.put(Field::GasResistance, self.gas_resistance);
        fields.put(Field::Altitude, self.altitude);
        fields.put(Field::Co2, self.co2);
        fields.put(Field::Tvoc, self.tvoc);
        fields.put(Field::TemperatureEstimate, self.temperature_estimate);
        fields
    }
}

/// What one acquisition cycle produced
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    /// Both sensors live and both reads succeeded
    Complete(DataFrame),
    /// Secondary sensor is Faulted
    PrimaryOnly(PrimaryReading),
    /// Primary sensor is Faulted
    SecondaryOnly(SecondaryReading),
}

impl Frame {
    /// Channel fields for this frame; dead sensors' fields stay unset
    pub fn fields(&self) -> FieldSet {
        match self {
            Self::Complete(frame) => frame.fields(),
            Self::PrimaryOnly(reading) => {
                let mut fields = FieldSet::new();
                fields.put_primary(reading);
                fields
            }
            Self::SecondaryOnly(reading) => {
                let mut fields = FieldSet::new();
                fields.put_secondary(reading);
                fields
            }
        }
    }

    /// True for a frame with every field
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// The full frame, if complete
    pub fn as_complete(&self) -> Option<&DataFrame> {
        match self {
            Self::Complete(frame) => Some(frame),
            _ => None,
        }
    }
}
