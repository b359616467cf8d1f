//! Scripted drivers and recording doubles for integration tests
//!
//! Every double records what it was asked to do so tests can assert on the
//! exact sequence of driver, link and telemetry calls.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::Ipv4Addr;

use airmon_core::config::{SensorProfile, StaticIpConfig};
use airmon_core::constants::telemetry::NOT_INSERTED;
use airmon_core::errors::{DriverError, TransportError};
use airmon_core::traits::{
    AirQualitySensor, ConnectionState, EnvironmentalSensor, NetworkLink, RawAirQuality,
    RawEnvironment, StatusCode, TelemetryClient,
};
use airmon_core::time::{FixedTime, TimeSource};
use airmon_core::MonitorConfig;
use embedded_hal::delay::DelayNs;

/// Indoor reading used throughout: 24.0 °C, 1010 hPa, 40 %RH, 50 kΩ
pub fn indoor_air() -> RawEnvironment {
    RawEnvironment {
        temperature_c: 24.0,
        pressure_pa: 101_000.0,
        humidity_pct: 40.0,
        gas_resistance_ohms: 50_000.0,
    }
}

/// Valid configuration with instant retries and a fixed upload interval
pub fn test_config() -> MonitorConfig {
    let mut config = MonitorConfig::new("lab-net", "correct horse", 1_234_567, "ABCDEF0123456789")
        .expect("credentials fit")
        .with_upload_interval(20_000, 0);
    config.setup_retry = airmon_core::RetryPolicy::immediate(2);
    config
}

/// BME680 double: fails `begin()` a set number of times, then serves readings
pub struct ScriptedEnvironment {
    pub begin_failures: u32,
    pub begins: u32,
    pub configured: Option<SensorProfile>,
    pub readings: VecDeque<Result<RawEnvironment, DriverError>>,
    pub fallback: RawEnvironment,
    pub reads: u32,
}

impl ScriptedEnvironment {
    pub fn healthy() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(begin_failures: u32) -> Self {
        Self {
            begin_failures,
            begins: 0,
            configured: None,
            readings: VecDeque::new(),
            fallback: indoor_air(),
            reads: 0,
        }
    }

    pub fn dead() -> Self {
        Self::failing_first(u32::MAX)
    }

    pub fn then(mut self, reading: Result<RawEnvironment, DriverError>) -> Self {
        self.readings.push_back(reading);
        self
    }
}

impl EnvironmentalSensor for ScriptedEnvironment {
    fn begin(&mut self) -> Result<(), DriverError> {
        self.begins += 1;
        if self.begin_failures > 0 {
            self.begin_failures -= 1;
            Err(DriverError::Bus)
        } else {
            Ok(())
        }
    }

    fn configure(&mut self, profile: &SensorProfile) -> Result<(), DriverError> {
        self.configured = Some(*profile);
        Ok(())
    }

    fn perform_reading(&mut self) -> Result<RawEnvironment, DriverError> {
        self.reads += 1;
        self.readings.pop_front().unwrap_or(Ok(self.fallback))
    }
}

/// CCS811 double with a scripted readiness sequence
pub struct ScriptedAirQuality {
    pub begin_failures: u32,
    pub begins: u32,
    pub ready: VecDeque<bool>,
    pub ready_by_default: bool,
    pub raw: RawAirQuality,
    pub thermistor_c: f32,
    pub offset_c: Option<f32>,
    pub environment: Vec<(f32, f32)>,
    pub reject_environment: bool,
}

impl ScriptedAirQuality {
    pub fn healthy() -> Self {
        Self {
            begin_failures: 0,
            begins: 0,
            ready: VecDeque::new(),
            ready_by_default: true,
            raw: RawAirQuality { eco2_ppm: 612, tvoc_ppb: 31 },
            thermistor_c: 27.5,
            offset_c: None,
            environment: Vec::new(),
            reject_environment: false,
        }
    }

    pub fn dead() -> Self {
        Self { begin_failures: u32::MAX, ..Self::healthy() }
    }

    pub fn never_ready() -> Self {
        Self { ready_by_default: false, ..Self::healthy() }
    }
}

impl AirQualitySensor for ScriptedAirQuality {
    fn begin(&mut self) -> Result<(), DriverError> {
        self.begins += 1;
        if self.begin_failures > 0 {
            self.begin_failures -= 1;
            Err(DriverError::Device(0x10))
        } else {
            Ok(())
        }
    }

    fn data_ready(&mut self) -> Result<bool, DriverError> {
        Ok(self.ready.pop_front().unwrap_or(self.ready_by_default))
    }

    fn set_environmental_data(&mut self, humidity_pct: f32, temperature_c: f32) -> Result<(), DriverError> {
        if self.reject_environment {
            return Err(DriverError::Bus);
        }
        self.environment.push((humidity_pct, temperature_c));
        Ok(())
    }

    fn read_data(&mut self) -> Result<RawAirQuality, DriverError> {
        Ok(self.raw)
    }

    fn temperature(&mut self) -> Result<f32, DriverError> {
        Ok(self.thermistor_c - self.offset_c.unwrap_or(0.0))
    }

    fn set_temperature_offset(&mut self, offset_c: f32) -> Result<(), DriverError> {
        self.offset_c = Some(offset_c);
        Ok(())
    }
}

/// WiFi double: each `begin()` takes the next scripted outcome
pub struct MockLink {
    pub outcomes: VecDeque<ConnectionState>,
    pub current: ConnectionState,
    pub begins: u32,
    pub disconnects: u32,
    pub hostname: String,
    pub static_ip: Option<StaticIpConfig>,
    pub credentials: Option<(String, String)>,
}

impl MockLink {
    pub fn connecting() -> Self {
        Self::scripted(&[])
    }

    pub fn scripted(outcomes: &[ConnectionState]) -> Self {
        Self {
            outcomes: outcomes.iter().copied().collect(),
            current: ConnectionState::Disconnected,
            begins: 0,
            disconnects: 0,
            hostname: String::new(),
            static_ip: None,
            credentials: None,
        }
    }

    /// Simulate the access point going away
    pub fn drop_link(&mut self) {
        self.current = ConnectionState::Disconnected;
    }
}

impl NetworkLink for MockLink {
    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.current = ConnectionState::Disconnected;
    }

    fn set_hostname(&mut self, hostname: &str) {
        self.hostname = hostname.to_string();
    }

    fn apply_static_ip(&mut self, config: &StaticIpConfig) -> bool {
        self.static_ip = Some(*config);
        true
    }

    fn begin(&mut self, ssid: &str, passphrase: &str) {
        self.begins += 1;
        self.credentials = Some((ssid.to_string(), passphrase.to_string()));
        self.current = self.outcomes.pop_front().unwrap_or(ConnectionState::Connected);
    }

    fn status(&self) -> ConnectionState {
        self.current
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.current.is_connected().then(|| Ipv4Addr::new(192, 168, 1, 50))
    }
}

/// One `write_fields` call as seen by the channel
#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    pub channel: u32,
    pub write_key: String,
    pub fields: Vec<(u8, f32)>,
    pub status: Option<String>,
}

/// Telemetry double answering from a response queue (200 when empty)
#[derive(Default)]
pub struct RecordingClient {
    pub staged_fields: Vec<(u8, f32)>,
    pub staged_status: Option<String>,
    pub responses: VecDeque<Result<StatusCode, TransportError>>,
    pub writes: Vec<Write>,
    /// Field index whose staging fails with a transport error
    pub failing_field: Option<u8>,
    pub discards: u32,
}

impl RecordingClient {
    pub fn answering(responses: &[Result<StatusCode, TransportError>]) -> Self {
        Self {
            responses: responses.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn field_writes(&self) -> Vec<&Write> {
        self.writes.iter().filter(|w| !w.fields.is_empty()).collect()
    }

    pub fn status_writes(&self) -> Vec<&str> {
        self.writes.iter().filter_map(|w| w.status.as_deref()).collect()
    }
}

impl TelemetryClient for RecordingClient {
    fn set_field(&mut self, index: u8, value: f32) -> Result<(), TransportError> {
        if !(1..=8).contains(&index) {
            return Err(TransportError::InvalidField(index));
        }
        if self.failing_field == Some(index) {
            return Err(TransportError::Request);
        }
        self.staged_fields.push((index, value));
        Ok(())
    }

    fn set_status(&mut self, status: &str) -> Result<(), TransportError> {
        self.staged_status = Some(status.to_string());
        Ok(())
    }

    fn write_fields(&mut self, channel: u32, write_key: &str) -> Result<StatusCode, TransportError> {
        self.writes.push(Write {
            channel,
            write_key: write_key.to_string(),
            fields: std::mem::take(&mut self.staged_fields),
            status: self.staged_status.take(),
        });
        self.responses.pop_front().unwrap_or(Ok(200))
    }

    fn discard_staged(&mut self) {
        self.discards += 1;
        self.staged_fields.clear();
        self.staged_status = None;
    }
}

/// Channel double that stores at most one entry per rate-limit window
///
/// Writes inside the window are answered with `NOT_INSERTED`, the way a
/// ThingSpeak channel answers `0`. Every write is logged as
/// `(time, carried fields, status)`.
pub struct RateLimitedChannel<'a> {
    clock: &'a FixedTime,
    window_ms: u64,
    last_stored: Option<u64>,
    staged_fields: usize,
    pub log: Vec<(u64, bool, StatusCode)>,
}

impl<'a> RateLimitedChannel<'a> {
    pub fn new(clock: &'a FixedTime, window_ms: u64) -> Self {
        Self {
            clock,
            window_ms,
            last_stored: None,
            staged_fields: 0,
            log: Vec::new(),
        }
    }

    pub fn refused(&self) -> usize {
        self.log.iter().filter(|&&(_, _, code)| code == NOT_INSERTED).count()
    }
}

impl TelemetryClient for RateLimitedChannel<'_> {
    fn set_field(&mut self, _index: u8, _value: f32) -> Result<(), TransportError> {
        self.staged_fields += 1;
        Ok(())
    }

    fn set_status(&mut self, _status: &str) -> Result<(), TransportError> {
        Ok(())
    }

    fn write_fields(&mut self, _channel: u32, _write_key: &str) -> Result<StatusCode, TransportError> {
        let now = self.clock.now();
        let carried_fields = std::mem::take(&mut self.staged_fields) > 0;
        let code = match self.last_stored {
            Some(last) if now.saturating_sub(last) < self.window_ms => NOT_INSERTED,
            _ => {
                self.last_stored = Some(now);
                200
            }
        };
        self.log.push((now, carried_fields, code));
        Ok(code)
    }

    fn discard_staged(&mut self) {
        self.staged_fields = 0;
    }
}

/// Delay that records every millisecond wait instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.waits_ms.iter().map(|&ms| u64::from(ms)).sum()
    }

    pub fn count_of(&self, ms: u32) -> usize {
        self.waits_ms.iter().filter(|&&w| w == ms).count()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

#[macro_export]
macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tolerance:expr) => {
        let diff = ($actual - $expected).abs();
        if diff > $tolerance {
            panic!(
                "Value {} not within tolerance {} of expected {} (diff: {})",
                $actual, $tolerance, $expected, diff
            );
        }
    };
}
