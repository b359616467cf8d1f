//! ThingSpeak Channel Client
//!
//! Implements [`TelemetryClient`] over the ThingSpeak REST update endpoint.
//!
//! ## Staging
//!
//! Fields and the status string are staged locally with `set_field` and
//! `set_status`, then sent together by `write_fields`. Staged values are
//! cleared by every write, whatever its outcome, so a failed update never
//! leaks stale fields into the next one.
//!
//! ## Result mapping
//!
//! | Outcome                         | Returned                   |
//! |---------------------------------|----------------------------|
//! | 200, body is an entry id        | `Ok(200)`                  |
//! | 200, body is `0`                | `Ok(-401)` (not inserted)  |
//! | any other HTTP status           | `Ok(status)` verbatim      |
//! | status received, body unreadable| `Ok(status)`               |
//! | I/O failure mid-request         | `Err(Timeout)`             |
//! | DNS / connect / URL failure     | `Err(Request)`             |
//!
//! No request is retried here; the upload scheduler decides what happens
//! on the next cycle.

use std::time::Duration;

use airmon_core::constants::telemetry::{HTTP_OK, NOT_INSERTED};
use airmon_core::errors::TransportError;
use airmon_core::frame::FieldSet;
use airmon_core::scheduler::truncate_status;
use airmon_core::{StatusCode, TelemetryClient};
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::{ConnectionStats, ConnectorError};

/// Public ThingSpeak endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.thingspeak.com";

/// ThingSpeak client configuration
#[derive(Debug, Clone)]
pub struct ThingSpeakConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl ThingSpeakConfig {
    /// Configuration for the public endpoint
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: format!("airmon/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Point at a self-hosted server
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

impl Default for ThingSpeakConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocking ThingSpeak client built on `ureq`
pub struct ThingSpeakClient {
    config: ThingSpeakConfig,
    agent: ureq::Agent,
    fields: FieldSet,
    status: Option<String>,
    stats: ConnectionStats,
}

impl ThingSpeakClient {
    /// Create a client; the base URL must be http(s)
    pub fn new(config: ThingSpeakConfig) -> Result<Self, ConnectorError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(ConnectorError::Endpoint(config.base_url));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            fields: FieldSet::new(),
            status: None,
            stats: ConnectionStats::default(),
        })
    }

    /// Request statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Fields staged for the next write
    pub fn staged_fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Status staged for the next write
    pub fn staged_status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn update_url(&self) -> String {
        format!("{}/update", self.config.base_url)
    }

    /// JSON body for an update with the staged values
    fn update_body(&self, write_key: &str) -> Value {
        let mut body = Map::new();
        body.insert("api_key".into(), Value::from(write_key));
        for (index, value) in self.fields.iter() {
            body.insert(format!("field{}", index), field_value(value));
        }
        if let Some(status) = &self.status {
            body.insert("status".into(), Value::from(status.as_str()));
        }
        Value::Object(body)
    }

    fn clear_staged(&mut self) {
        self.fields.clear();
        self.status = None;
    }
}

/// JSON number for a field value, keeping the shortest `f32` decimal form
///
/// Widening through `f64` directly would put 21.9 on the wire as
/// 21.899999618530273. Non-finite values become `null`.
fn field_value(value: f32) -> Value {
    value.to_string().parse::<f64>().map_or(Value::Null, Value::from)
}

impl TelemetryClient for ThingSpeakClient {
    fn set_field(&mut self, index: u8, value: f32) -> Result<(), TransportError> {
        self.fields.set(index, value)
    }

    fn set_status(&mut self, status: &str) -> Result<(), TransportError> {
        self.status = Some(truncate_status(status).to_string());
        Ok(())
    }

    fn write_fields(&mut self, channel: u32, write_key: &str) -> Result<StatusCode, TransportError> {
        let body = self.update_body(write_key);
        let payload = body.to_string();
        self.clear_staged();

        debug!("channel {}: POST {} ({} bytes)", channel, self.update_url(), payload.len());
        let result = self
            .agent
            .post(&self.update_url())
            .set("Content-Type", "application/json")
            .send_string(&payload);

        match result {
            Ok(response) => {
                self.stats.requests_sent += 1;
                self.stats.bytes_sent += payload.len() as u64;
                let code = StatusCode::from(response.status());
                // The entry may already be stored; report the status so the
                // scheduler does not upload it twice
                let text = match response.into_string() {
                    Ok(text) => text,
                    Err(err) => {
                        warn!("channel {}: unreadable {} response body: {}", channel, code, err);
                        self.stats.last_error = Some(err.to_string());
                        return Ok(code);
                    }
                };
                if code == HTTP_OK && text.trim() == "0" {
                    Ok(NOT_INSERTED)
                } else {
                    Ok(code)
                }
            }
            Err(ureq::Error::Status(code, _response)) => {
                self.stats.requests_sent += 1;
                self.stats.bytes_sent += payload.len() as u64;
                Ok(StatusCode::from(code))
            }
            Err(ureq::Error::Transport(transport)) => {
                self.stats.requests_failed += 1;
                self.stats.last_error = Some(transport.to_string());
                warn!("channel {}: update failed: {}", channel, transport);
                match transport.kind() {
                    ureq::ErrorKind::Io => Err(TransportError::Timeout),
                    _ => Err(TransportError::Request),
                }
            }
        }
    }

    fn discard_staged(&mut self) {
        self.clear_staged();
    }
}
