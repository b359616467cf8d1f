//! Device Configuration
//!
//! One struct carries everything that differs between deployments: WiFi
//! credentials and addressing, the telemetry channel, the BME680 measurement
//! profile, calibration offsets, retry budgets and schedule intervals.
//! `Default` reproduces the reference board's settings; only credentials
//! and the channel have to be filled in.
//!
//! ```rust
//! use airmon_core::MonitorConfig;
//!
//! let config = MonitorConfig::new("office-iot", "hunter22", 1_234_567, "ABCDEF0123456789")?;
//! config.validate()?;
//! # Ok::<(), airmon_core::ConfigError>(())
//! ```
//!
//! With the `std` feature the same structure loads from JSON; every section
//! and field is optional and falls back to its default.

use core::net::Ipv4Addr;

use heapless::String;

use crate::calibration::CalibrationOffsets;
use crate::constants::{sensors, telemetry, time};
use crate::errors::ConfigError;
use crate::retry::RetryPolicy;

/// Maximum SSID length (bytes), per IEEE 802.11
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length (bytes)
pub const MAX_PASSPHRASE_LEN: usize = 64;

/// Maximum DHCP hostname length (bytes)
pub const MAX_HOSTNAME_LEN: usize = 32;

/// Hostname announced to DHCP when none is configured
pub const DEFAULT_HOSTNAME: &str = "Arduino Air Monitor";

/// Copy `value` into a fixed-capacity string
pub fn bounded<const N: usize>(field: &'static str, value: &str) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    out.push_str(value)
        .map_err(|_| ConfigError::TooLong { field, capacity: N })?;
    Ok(out)
}

/// Oversampling ratio for one BME680 channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    /// Channel disabled
    Skip,
    /// ×1
    X1,
    /// ×2
    X2,
    /// ×4
    X4,
    /// ×8
    X8,
    /// ×16
    X16,
}

/// BME680 IIR filter coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterSize {
    /// Filter off
    Off,
    /// Coefficient 1
    Size1,
    /// Coefficient 3
    Size3,
    /// Coefficient 7
    Size7,
    /// Coefficient 15
    Size15,
    /// Coefficient 31
    Size31,
    /// Coefficient 63
    Size63,
    /// Coefficient 127
    Size127,
}

/// Gas sensor hot plate profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterProfile {
    /// Target temperature (°C)
    pub temperature_c: u16,
    /// On-time (ms)
    pub duration_ms: u16,
}

impl Default for HeaterProfile {
    fn default() -> Self {
        Self {
            temperature_c: sensors::BME680_HEATER_TEMP_C,
            duration_ms: sensors::BME680_HEATER_DURATION_MS,
        }
    }
}

/// BME680 measurement profile, applied once after a successful `begin()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorProfile {
    /// Temperature oversampling
    pub temperature_oversampling: Oversampling,
    /// Humidity oversampling
    pub humidity_oversampling: Oversampling,
    /// Pressure oversampling
    pub pressure_oversampling: Oversampling,
    /// IIR filter
    pub filter: FilterSize,
    /// Gas heater; `None` disables gas measurements
    pub heater: Option<HeaterProfile>,
}

impl Default for SensorProfile {
    fn default() -> Self {
        Self {
            temperature_oversampling: Oversampling::X8,
            humidity_oversampling: Oversampling::X2,
            pressure_oversampling: Oversampling::X4,
            filter: FilterSize::Size3,
            heater: Some(HeaterProfile::default()),
        }
    }
}

/// CCS811 thermistor trim performed once at setup
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaselineConfig {
    /// Ambient temperature the first estimate is trimmed to (°C)
    pub reference_temperature_c: f32,
    /// Readiness polls before the trim is skipped
    pub max_polls: u32,
    /// Wait between readiness polls (ms)
    pub poll_interval_ms: u32,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            reference_temperature_c: sensors::CCS811_BASELINE_TEMP_C,
            max_polls: sensors::CCS811_BASELINE_MAX_POLLS,
            poll_interval_ms: sensors::CCS811_BASELINE_POLL_MS,
        }
    }
}

/// Static IPv4 addressing, used instead of DHCP when present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticIpConfig {
    /// Station address
    pub address: [u8; 4],
    /// Default gateway
    pub gateway: [u8; 4],
    /// Subnet mask
    pub subnet: [u8; 4],
    /// DNS server; gateway is used when absent
    pub dns: Option<[u8; 4]>,
}

impl StaticIpConfig {
    /// Station address
    pub fn address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    /// Default gateway
    pub fn gateway(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.gateway)
    }

    /// Subnet mask
    pub fn subnet(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.subnet)
    }

    /// DNS server, falling back to the gateway
    pub fn dns(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dns.unwrap_or(self.gateway))
    }
}

/// WiFi station settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WifiConfig {
    /// Network name
    pub ssid: String<MAX_SSID_LEN>,
    /// WPA2 passphrase
    pub passphrase: String<MAX_PASSPHRASE_LEN>,
    /// DHCP hostname
    pub hostname: String<MAX_HOSTNAME_LEN>,
    /// Static addressing; DHCP when `None`
    pub static_ip: Option<StaticIpConfig>,
}

impl Default for WifiConfig {
    fn default() -> Self {
        let mut hostname = String::new();
        // DEFAULT_HOSTNAME is shorter than MAX_HOSTNAME_LEN
        let _ = hostname.push_str(DEFAULT_HOSTNAME);
        Self {
            ssid: String::new(),
            passphrase: String::new(),
            hostname,
            static_ip: None,
        }
    }
}

/// Telemetry channel credentials
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TelemetryConfig {
    /// Channel number
    pub channel_id: u32,
    /// Channel write API key
    pub write_key: String<{ telemetry::MAX_WRITE_KEY_LEN }>,
}

/// WiFi connect routine timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkPolicy {
    /// Wait after dropping an old association (ms)
    pub settle_ms: u32,
    /// Wait after `begin()` before the first status poll (ms)
    pub initial_wait_ms: u32,
    /// Interval between status polls (ms)
    pub poll_interval_ms: u32,
    /// Status polls before the attempt is abandoned
    pub max_status_polls: u32,
    /// Wait before retrying boot after a failed connect (ms)
    pub boot_backoff_ms: u32,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            settle_ms: time::WIFI_DISCONNECT_SETTLE_MS,
            initial_wait_ms: time::WIFI_INITIAL_WAIT_MS,
            poll_interval_ms: time::WIFI_STATUS_POLL_INTERVAL_MS,
            max_status_polls: time::WIFI_MAX_STATUS_POLLS,
            boot_backoff_ms: time::BOOT_RETRY_BACKOFF_MS,
        }
    }
}

/// Acquisition and upload cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScheduleConfig {
    /// Interval between acquisition cycles (ms)
    pub sample_interval_ms: u64,
    /// Base interval between uploads (ms)
    pub upload_interval_ms: u64,
    /// Upper bound of the jitter added to each upload interval (ms); 0 disables
    pub max_jitter_ms: u32,
    /// Seed for the jitter generator; give each device a different one
    pub jitter_seed: u32,
    /// Pause between control loop iterations (ms)
    pub tick_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: time::DEFAULT_SAMPLE_INTERVAL_MS,
            upload_interval_ms: time::DEFAULT_UPLOAD_INTERVAL_MS,
            max_jitter_ms: time::DEFAULT_UPLOAD_JITTER_MS,
            jitter_seed: 0x2545_F491,
            tick_ms: time::LOOP_TICK_MS,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// WiFi station settings
    pub wifi: WifiConfig,
    /// Telemetry channel
    pub telemetry: TelemetryConfig,
    /// BME680 measurement profile
    pub profile: SensorProfile,
    /// CCS811 thermistor trim
    pub baseline: BaselineConfig,
    /// Additive calibration offsets
    pub calibration: CalibrationOffsets,
    /// Sensor setup retry policy
    pub setup_retry: RetryPolicy,
    /// WiFi connect timing
    pub link: LinkPolicy,
    /// Acquisition and upload cadence
    pub schedule: ScheduleConfig,
}

impl MonitorConfig {
    /// Default configuration with credentials filled in
    pub fn new(
        ssid: &str,
        passphrase: &str,
        channel_id: u32,
        write_key: &str,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.wifi.ssid = bounded("ssid", ssid)?;
        config.wifi.passphrase = bounded("passphrase", passphrase)?;
        config.telemetry.channel_id = channel_id;
        config.telemetry.write_key = bounded("write_key", write_key)?;
        Ok(config)
    }

    /// Set the DHCP hostname
    pub fn with_hostname(mut self, hostname: &str) -> Result<Self, ConfigError> {
        self.wifi.hostname = bounded("hostname", hostname)?;
        Ok(self)
    }

    /// Use static addressing instead of DHCP
    pub fn with_static_ip(mut self, static_ip: StaticIpConfig) -> Self {
        self.wifi.static_ip = Some(static_ip);
        self
    }

    /// Set the upload interval and jitter bound
    pub fn with_upload_interval(mut self, interval_ms: u64, max_jitter_ms: u32) -> Self {
        self.schedule.upload_interval_ms = interval_ms;
        self.schedule.max_jitter_ms = max_jitter_ms;
        self
    }

    /// Check the settings a device cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if self.telemetry.write_key.is_empty() {
            return Err(ConfigError::EmptyWriteKey);
        }
        if self.telemetry.channel_id == 0 {
            return Err(ConfigError::ZeroChannel);
        }
        if self.schedule.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroSampleInterval);
        }
        if self.schedule.upload_interval_ms < telemetry::MIN_UPLOAD_INTERVAL_MS {
            return Err(ConfigError::UploadIntervalTooShort {
                interval_ms: self.schedule.upload_interval_ms,
                min_ms: telemetry::MIN_UPLOAD_INTERVAL_MS,
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    #[cfg(feature = "std")]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}
