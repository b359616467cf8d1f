//! Local HTTP channel stub and fixed-output sensors for connector tests

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use airmon_core::config::SensorProfile;
use airmon_core::errors::DriverError;
use airmon_core::traits::{RawAirQuality, RawEnvironment};
use airmon_core::{AirQualitySensor, EnvironmentalSensor};

/// One request captured by the stub
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub body: serde_json::Value,
}

/// Channel stub answering each request with the next `(status line, body)`
///
/// Returns the base URL and a receiver yielding captured requests in order.
pub fn channel_stub(responses: Vec<(&'static str, &'static str)>) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
    let url = format!("http://{}", listener.local_addr().expect("stub address"));
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status_line, body) in responses {
            let Ok((mut stream, _)) = listener.accept() else { return };
            let Some(raw) = read_request(&mut stream) else { return };

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());

            let (head, payload) = raw.split_once("\r\n\r\n").unwrap_or((raw.as_str(), ""));
            let captured = CapturedRequest {
                request_line: head.lines().next().unwrap_or_default().to_string(),
                body: serde_json::from_str(payload).unwrap_or(serde_json::Value::Null),
            };
            if tx.send(captured).is_err() {
                return;
            }
        }
    });

    (url, rx)
}

fn read_request(stream: &mut std::net::TcpStream) -> Option<String> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        request.extend_from_slice(&buf[..n]);
        if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
    let length: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);
    while request.len() < header_end + length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    Some(String::from_utf8_lossy(&request).into_owned())
}

/// BME680 stand-in always reading 24.0 °C at 1010 hPa
pub struct SteadyBme680;

impl EnvironmentalSensor for SteadyBme680 {
    fn begin(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn configure(&mut self, _profile: &SensorProfile) -> Result<(), DriverError> {
        Ok(())
    }

    fn perform_reading(&mut self) -> Result<RawEnvironment, DriverError> {
        Ok(RawEnvironment {
            temperature_c: 24.0,
            pressure_pa: 101_000.0,
            humidity_pct: 40.0,
            gas_resistance_ohms: 50_000.0,
        })
    }
}

/// CCS811 stand-in always reading 612 ppm / 31 ppb
pub struct SteadyCcs811;

impl AirQualitySensor for SteadyCcs811 {
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
        Ok(RawAirQuality { eco2_ppm: 612, tvoc_ppb: 31 })
    }

    fn temperature(&mut self) -> Result<f32, DriverError> {
        Ok(25.0)
    }

    fn set_temperature_offset(&mut self, _offset_c: f32) -> Result<(), DriverError> {
        Ok(())
    }
}
