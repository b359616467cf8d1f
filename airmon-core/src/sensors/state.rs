//! Per-Sensor Lifecycle
//!
//! ```text
//! Uninitialized ──► Initializing(1) ──► ... ──► Initializing(R+1) ──► Faulted
//!                        │                            │
//!                        └────────────► Ready ◄───────┘
//! ```
//!
//! Ready is sticky: a failed read leaves the sensor Ready and the next cycle
//! simply reads again. Nothing re-runs `begin()` on a Ready sensor.

use core::fmt;

/// Which of the two sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorId {
    /// BME680 temperature/pressure/humidity/gas sensor
    Primary,
    /// CCS811 eCO2/TVOC sensor
    Secondary,
}

impl SensorId {
    /// Part name used in logs and status messages
    pub fn name(self) -> &'static str {
        match self {
            Self::Primary => "BME680",
            Self::Secondary => "CCS811",
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle state of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorState {
    /// Setup not started
    #[default]
    Uninitialized,
    /// Setup in progress; `attempt` is 1-based
    Initializing {
        /// Current attempt
        attempt: u32,
    },
    /// Setup succeeded, reads allowed
    Ready,
    /// Setup budget exhausted, acquisition path halted
    Faulted,
}

impl SensorState {
    /// True when reads are allowed
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// True when the sensor has been given up on
    pub fn is_faulted(self) -> bool {
        matches!(self, Self::Faulted)
    }
}
