//! Upload Scheduling
//!
//! ## Overview
//!
//! The scheduler decides when a frame goes out, maps it onto the channel's
//! eight fields and interprets the result. It owns the telemetry client but
//! no sensor state.
//!
//! ## Gating
//!
//! ```text
//! is_due(now, last, interval)  ⇔  last is None  ∨  now − last ≥ interval
//! ```
//!
//! `last` only moves on an accepted write (status 200). A rejected write
//! (403, rate limit, server error) or a transport failure leaves it where it
//! was, so the next cycle's gate is still open and the frame of *that* cycle
//! goes out. Nothing is retried within a cycle.
//!
//! The channel itself refuses any write within
//! [`MIN_UPLOAD_INTERVAL_MS`] of the last stored entry, and a status post is
//! a stored entry too. Every accepted write, status or fields, therefore
//! also closes the gate until that window has passed.
//!
//! ## Jitter
//!
//! Devices that power up together after an outage would otherwise upload in
//! lockstep forever. After every accepted write the next interval is the
//! base interval plus a draw from `0..=max_jitter_ms`. The generator is a
//! seeded xorshift, so each device gets a reproducible but distinct
//! sequence. `max_jitter_ms = 0` gives a fixed interval.
//!
//! ## Status messages
//!
//! Status posts are best effort: skipped while the link is down, truncated
//! to 255 bytes, and their result only logged. They do not count as
//! uploads in [`UploadStats`].

use crate::constants::telemetry::{
    HTTP_OK, MAX_STATUS_LEN, MAX_WRITE_KEY_LEN, MIN_UPLOAD_INTERVAL_MS, NOT_INSERTED,
};
use crate::errors::{ConfigError, TransportError};
use crate::frame::{DataFrame, FieldSet, Frame};
use crate::time::Timestamp;
use crate::traits::{ConnectionState, StatusCode, TelemetryClient};

/// True iff an upload is due
///
/// Uses saturating arithmetic, so a clock that steps backwards reads as
/// "not due" rather than wrapping.
pub fn is_due(now: Timestamp, last_upload: Option<Timestamp>, interval_ms: u64) -> bool {
    match last_upload {
        None => true,
        Some(last) => now.saturating_sub(last) >= interval_ms,
    }
}

/// Longest prefix of `message` that fits a status post
///
/// Cuts at the last UTF-8 character boundary at or below 255 bytes.
pub fn truncate_status(message: &str) -> &str {
    if message.len() <= MAX_STATUS_LEN {
        return message;
    }
    let mut end = MAX_STATUS_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

/// Xorshift32 generator for upload jitter
#[derive(Debug, Clone)]
pub struct Jitter {
    state: u32,
}

impl Jitter {
    /// Seeded generator; a zero seed is replaced since xorshift sticks at 0
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Next draw in `0..=max`
    pub fn next_up_to(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        match max.checked_add(1) {
            Some(bound) => x % bound,
            None => x,
        }
    }
}

/// Upload counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Writes attempted
    pub attempts: u32,
    /// Writes answered with 200
    pub accepted: u32,
    /// Writes answered with any other status
    pub rejected: u32,
    /// Writes that produced no status
    pub transport_errors: u32,
    /// Status of the most recent answered write
    pub last_status: Option<StatusCode>,
}

/// Upload gate and field mapper for one telemetry channel
pub struct UploadScheduler<T> {
    client: T,
    channel_id: u32,
    write_key: heapless::String<MAX_WRITE_KEY_LEN>,
    base_interval_ms: u64,
    max_jitter_ms: u32,
    jitter: Jitter,
    current_interval_ms: u64,
    last_upload: Option<Timestamp>,
    last_stored: Option<Timestamp>,
    stats: UploadStats,
}

impl<T: TelemetryClient> UploadScheduler<T> {
    /// Bind `client` to a channel with a fixed upload interval
    pub fn new(
        client: T,
        channel_id: u32,
        write_key: &str,
        interval_ms: u64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            channel_id,
            write_key: crate::config::bounded("write_key", write_key)?,
            base_interval_ms: interval_ms,
            max_jitter_ms: 0,
            jitter: Jitter::new(0),
            current_interval_ms: interval_ms,
            last_upload: None,
            last_stored: None,
            stats: UploadStats::default(),
        })
    }

    /// Add up to `max_jitter_ms` to each interval, drawn from `seed`
    pub fn with_jitter(mut self, max_jitter_ms: u32, seed: u32) -> Self {
        self.max_jitter_ms = max_jitter_ms;
        self.jitter = Jitter::new(seed);
        self.current_interval_ms = self.base_interval_ms;
        self
    }

    /// Time of the last accepted upload
    pub fn last_upload(&self) -> Option<Timestamp> {
        self.last_upload
    }

    /// Time of the last write the channel stored, status posts included
    pub fn last_stored(&self) -> Option<Timestamp> {
        self.last_stored
    }

    /// Interval gating the next upload, jitter included
    pub fn current_interval_ms(&self) -> u64 {
        self.current_interval_ms
    }

    /// Upload counters
    pub fn stats(&self) -> &UploadStats {
        &self.stats
    }

    /// Borrow the telemetry client
    pub fn client(&self) -> &T {
        &self.client
    }

    /// Mutably borrow the telemetry client
    pub fn client_mut(&mut self) -> &mut T {
        &mut self.client
    }

    /// True iff an upload is due at `now` and the channel would store it
    pub fn is_due_at(&self, now: Timestamp) -> bool {
        is_due(now, self.last_upload, self.current_interval_ms)
            && is_due(now, self.last_stored, MIN_UPLOAD_INTERVAL_MS)
    }

    /// Upload a complete frame
    ///
    /// Returns the status code verbatim; only 200 moves the upload clock.
    pub fn submit(&mut self, frame: &DataFrame, now: Timestamp) -> Result<StatusCode, TransportError> {
        self.write(&frame.fields(), now)
    }

    /// Upload whatever fields a (possibly degraded) frame carries
    pub fn submit_frame(&mut self, frame: &Frame, now: Timestamp) -> Result<StatusCode, TransportError> {
        self.write(&frame.fields(), now)
    }

    /// Best-effort status post; skipped unless the link is connected
    ///
    /// An accepted post holds the channel's rate-limit window from `now`.
    pub fn post_status(&mut self, link: ConnectionState, message: &str, now: Timestamp) {
        if !link.is_connected() {
            log_debug!("status post skipped, link {:?}", link);
            return;
        }

        let status = truncate_status(message);
        let result = match self.client.set_status(status) {
            Ok(()) => self.client.write_fields(self.channel_id, &self.write_key),
            Err(err) => {
                self.client.discard_staged();
                Err(err)
            }
        };
        match result {
            Ok(HTTP_OK) => {
                self.last_stored = Some(now);
                log_debug!("status posted");
            }
            Ok(code) => log_warn!("status post rejected with {}", code),
            Err(err) => log_warn!("status post failed: {:?}", err),
        }
    }

    fn write(&mut self, fields: &FieldSet, now: Timestamp) -> Result<StatusCode, TransportError> {
        self.stats.attempts += 1;

        for (index, value) in fields.iter() {
            if let Err(err) = self.client.set_field(index, value) {
                // Never leave half a frame staged for the next write
                self.client.discard_staged();
                self.stats.transport_errors += 1;
                return Err(err);
            }
        }

        match self.client.write_fields(self.channel_id, &self.write_key) {
            Ok(code) => {
                self.stats.last_status = Some(code);
                if code == HTTP_OK {
                    self.record_success(now);
                    log_info!("channel update ok ({} fields)", fields.len());
                } else {
                    self.stats.rejected += 1;
                    if code == NOT_INSERTED {
                        log_warn!("channel update not inserted, likely rate limited");
                    } else {
                        log_warn!("channel update rejected with {}", code);
                    }
                }
                Ok(code)
            }
            Err(err) => {
                self.stats.transport_errors += 1;
                log_warn!("channel update failed: {:?}", err);
                Err(err)
            }
        }
    }

    fn record_success(&mut self, now: Timestamp) {
        self.stats.accepted += 1;
        self.last_upload = Some(now);
        self.last_stored = Some(now);
        self.current_interval_ms =
            self.base_interval_ms + u64::from(self.jitter.next_up_to(self.max_jitter_ms));
    }
}
