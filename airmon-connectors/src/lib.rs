//! Hosted Connectors for the Airmon Monitor
//!
//! ## Overview
//!
//! `airmon-core` reaches the outside world only through its boundary traits.
//! This crate provides implementations of those traits for hosted (std)
//! builds: a gateway box, a Raspberry Pi, or a developer machine running the
//! monitor against real cloud endpoints.
//!
//! | Module        | Implements                       | Backed by              |
//! |---------------|----------------------------------|------------------------|
//! | [`thingspeak`] | `TelemetryClient`               | HTTPS POST via `ureq`  |
//! | [`host`]      | `NetworkLink`, `DelayNs`         | host network stack     |
//! | [`config`]    | JSON configuration loading       | `std::fs`, `serde_json`|
//!
//! ## ThingSpeak update semantics
//!
//! A channel update is a single POST to `/update` carrying the write key,
//! any subset of `field1`..`field8` and an optional status string:
//!
//! ```text
//! POST /update
//! {"api_key":"XXXXXXXXXXXXXXXX","field1":21.9,"field2":1010.0,...,"status":"online"}
//! ```
//!
//! The server answers 200 with the new entry id, or with `0` when it refused
//! to insert the entry (usually the 15 s rate limit). The client reports the
//! latter as `-401` so the scheduler treats it as a rejected write.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use airmon_connectors::thingspeak::{ThingSpeakClient, ThingSpeakConfig};
//! use airmon_core::TelemetryClient;
//!
//! let mut client = ThingSpeakClient::new(ThingSpeakConfig::new().timeout_secs(10))?;
//! client.set_field(1, 21.9)?;
//! client.set_status("online")?;
//! let status = client.write_fields(1_234_567, "XXXXXXXXXXXXXXXX")?;
//! println!("update answered with {}", status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod host;

#[cfg(feature = "http")]
pub mod thingspeak;

pub use config::load_config;
pub use host::{HostLink, StdDelay};

#[cfg(feature = "http")]
pub use thingspeak::{ThingSpeakClient, ThingSpeakConfig};

use airmon_core::ConfigError;
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request statistics for a connector
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    /// Requests answered by the server, any status
    pub requests_sent: u64,
    /// Requests that never got an answer
    pub requests_failed: u64,
    /// Total request body bytes sent
    pub bytes_sent: u64,
    /// Last transport error message
    pub last_error: Option<String>,
}
