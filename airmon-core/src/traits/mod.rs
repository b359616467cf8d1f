//! Boundary Traits for Vendor Collaborators
//!
//! Every piece of hardware or vendor software the firmware talks to sits
//! behind one of these traits. Handles are owned values passed into
//! constructors, so one device context owns exactly one of each and tests
//! substitute scripted doubles.
//!
//! ## Module Organization
//!
//! - [`sensor`] - The two I2C sensor drivers
//! - [`network`] - The WiFi stack
//! - [`telemetry`] - The cloud channel's HTTP client
//!
//! Delays are not abstracted here: every blocking wait goes through
//! [`embedded_hal::delay::DelayNs`].

pub mod network;
pub mod sensor;
pub mod telemetry;

pub use network::{ConnectionState, NetworkLink};
pub use sensor::{AirQualitySensor, EnvironmentalSensor, RawAirQuality, RawEnvironment};
pub use telemetry::{StatusCode, TelemetryClient};
