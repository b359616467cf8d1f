//! Simulated Monitor Example
//!
//! Runs the full device state machine against simulated sensors, a simulated
//! WiFi link and a telemetry client that prints what it would upload.
//!
//! ## What You'll Learn
//!
//! - Wiring drivers, link and client into a [`Device`]
//! - The boot and sensor setup transitions, printed as they happen
//! - How uploads are gated independently of sampling
//!
//! No logger is installed, so the crate's own log lines stay silent; the
//! simulated drivers and client print what they are asked to do instead.
//!
//! Time is virtual: every blocking wait advances a shared [`FixedTime`]
//! instead of sleeping, so ten simulated minutes finish instantly.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example simulated_monitor
//! ```

use std::net::Ipv4Addr;

use airmon_core::{
    config::{SensorProfile, StaticIpConfig},
    errors::{DriverError, TransportError},
    time::{FixedTime, TimeSource},
    traits::{RawAirQuality, RawEnvironment},
    AirQualitySensor, ConnectionState, Device, EnvironmentalSensor, MonitorConfig, NetworkLink,
    StatusCode, TelemetryClient,
};
use embedded_hal::delay::DelayNs;

/// Small deterministic noise source
struct Noise(u32);

impl Noise {
    /// Next value in -1.0..1.0
    fn next(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 >> 8) as f32 / (1u32 << 23) as f32 - 1.0
    }
}

/// BME680 stand-in drifting around a warm office
struct SimBme680 {
    noise: Noise,
    flaky_begins: u32,
}

impl EnvironmentalSensor for SimBme680 {
    fn begin(&mut self) -> Result<(), DriverError> {
        if self.flaky_begins > 0 {
            self.flaky_begins -= 1;
            return Err(DriverError::Bus);
        }
        Ok(())
    }

    fn configure(&mut self, profile: &SensorProfile) -> Result<(), DriverError> {
        println!("  BME680 profile: {:?}", profile);
        Ok(())
    }

    fn perform_reading(&mut self) -> Result<RawEnvironment, DriverError> {
        Ok(RawEnvironment {
            temperature_c: 24.0 + 0.3 * self.noise.next(),
            pressure_pa: 101_000.0 + 40.0 * self.noise.next(),
            humidity_pct: 42.0 + self.noise.next(),
            gas_resistance_ohms: 55_000.0 + 2_000.0 * self.noise.next(),
        })
    }
}

/// CCS811 stand-in with slowly rising CO2
struct SimCcs811 {
    noise: Noise,
    eco2: f32,
    offset: f32,
}

impl AirQualitySensor for SimCcs811 {
    fn begin(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn data_ready(&mut self) -> Result<bool, DriverError> {
        Ok(true)
    }

    fn set_environmental_data(&mut self, _humidity: f32, _temperature: f32) -> Result<(), DriverError> {
        Ok(())
    }

    fn read_data(&mut self) -> Result<RawAirQuality, DriverError> {
        self.eco2 += 3.0 + 2.0 * self.noise.next();
        Ok(RawAirQuality {
            eco2_ppm: self.eco2 as u16,
            tvoc_ppb: ((self.eco2 - 400.0) * 0.15) as u16,
        })
    }

    fn temperature(&mut self) -> Result<f32, DriverError> {
        Ok(28.0 + 0.2 * self.noise.next() - self.offset)
    }

    fn set_temperature_offset(&mut self, offset_c: f32) -> Result<(), DriverError> {
        self.offset = offset_c;
        Ok(())
    }
}

/// WiFi stand-in that associates on the first `begin()`
#[derive(Default)]
struct SimWifi {
    state: Option<ConnectionState>,
}

impl NetworkLink for SimWifi {
    fn disconnect(&mut self) {
        self.state = Some(ConnectionState::Disconnected);
    }

    fn set_hostname(&mut self, hostname: &str) {
        println!("  hostname: {}", hostname);
    }

    fn apply_static_ip(&mut self, config: &StaticIpConfig) -> bool {
        println!("  static IP {} via {}", config.address(), config.gateway());
        true
    }

    fn begin(&mut self, ssid: &str, _passphrase: &str) {
        println!("  joining {}", ssid);
        self.state = Some(ConnectionState::Connected);
    }

    fn status(&self) -> ConnectionState {
        self.state.unwrap_or(ConnectionState::Disconnected)
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::new(192, 168, 0, 40))
    }
}

/// Client that prints each write; every fourth update is rate limited
#[derive(Default)]
struct PrintingClient {
    fields: Vec<(u8, f32)>,
    status: Option<String>,
    writes: u32,
}

impl TelemetryClient for PrintingClient {
    fn set_field(&mut self, index: u8, value: f32) -> Result<(), TransportError> {
        self.fields.push((index, value));
        Ok(())
    }

    fn set_status(&mut self, status: &str) -> Result<(), TransportError> {
        self.status = Some(status.to_string());
        Ok(())
    }

    fn write_fields(&mut self, channel: u32, _write_key: &str) -> Result<StatusCode, TransportError> {
        self.writes += 1;
        if let Some(status) = self.status.take() {
            println!("  -> channel {} status: {}", channel, status);
        }
        if !self.fields.is_empty() {
            let fields: Vec<String> = self
                .fields
                .drain(..)
                .map(|(i, v)| format!("field{}={:.2}", i, v))
                .collect();
            println!("  -> channel {} update: {}", channel, fields.join(" "));
        }
        Ok(if self.writes % 4 == 0 { -401 } else { 200 })
    }

    fn discard_staged(&mut self) {
        self.fields.clear();
        self.status = None;
    }
}

/// Delay that advances virtual time instead of sleeping
struct VirtualDelay<'a> {
    clock: &'a FixedTime,
}

impl DelayNs for VirtualDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Airmon Simulated Monitor ===\n");

    let config = MonitorConfig::new("office-ap", "not-a-real-passphrase", 1_234_567, "SIMULATEDKEY0001")?
        .with_hostname("airmon-sim")?
        .with_static_ip(StaticIpConfig {
            address: [192, 168, 0, 40],
            gateway: [192, 168, 0, 1],
            subnet: [255, 255, 255, 0],
            dns: None,
        })
        .with_upload_interval(20_000, 2_000);

    let clock = FixedTime::new(0);
    let mut device = Device::new(
        &config,
        SimBme680 { noise: Noise(7), flaky_begins: 2 },
        SimCcs811 { noise: Noise(11), eco2: 420.0, offset: 0.0 },
        SimWifi::default(),
        PrintingClient::default(),
        VirtualDelay { clock: &clock },
        &clock,
    )?;

    let ten_minutes = 10 * 60 * 1_000;
    while clock.now() < ten_minutes {
        let before = device.state();
        let after = device.step();
        if before != after {
            println!("[{:>7} ms] {:?} -> {:?}", clock.now(), before, after);
        }

        if after.is_running() {
            let report = device.last_report();
            if let Some(upload) = report.upload {
                println!("[{:>7} ms] upload result: {:?}", clock.now(), upload);
            }
            if let Some(err) = report.read_error {
                println!("[{:>7} ms] read failed: {}", clock.now(), err);
            }
            clock.advance(u64::from(config.schedule.tick_ms));
        }
    }

    let stats = device.scheduler().stats();
    println!("\n=== Summary ===");
    println!("Upload attempts: {}", stats.attempts);
    println!("Accepted:        {}", stats.accepted);
    println!("Rejected:        {}", stats.rejected);
    println!("Transport errors: {}", stats.transport_errors);

    Ok(())
}
