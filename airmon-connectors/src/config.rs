//! Configuration file loading
//!
//! The monitor configuration is one JSON document mirroring
//! [`MonitorConfig`]. Every section is optional and falls back to the
//! reference defaults, so a minimal file only carries credentials:
//!
//! ```json
//! {
//!   "wifi": { "ssid": "office-ap", "passphrase": "..." },
//!   "telemetry": { "channel_id": 1234567, "write_key": "XXXXXXXXXXXXXXXX" }
//! }
//! ```

use std::fs;
use std::path::Path;

use airmon_core::MonitorConfig;
use log::info;

use crate::ConnectorError;

/// Read, parse and validate a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<MonitorConfig, ConnectorError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let config = MonitorConfig::from_json(&text)?;
    info!(
        "loaded configuration from {} (channel {})",
        path.display(),
        config.telemetry.channel_id
    );
    Ok(config)
}
