//! Telemetry Channel Constants
//!
//! Field layout and limits of a ThingSpeak-style channel.

use crate::traits::StatusCode;

/// Number of data fields in a channel.
pub const FIELD_COUNT: usize = 8;

/// Maximum status message length (bytes).
///
/// Longer messages are truncated, never rejected.
pub const MAX_STATUS_LEN: usize = 255;

/// Status code of an accepted write.
pub const HTTP_OK: StatusCode = 200;

/// Status reported when the server answered but stored no entry.
///
/// Returned when a write arrives inside the channel's rate limit window.
pub const NOT_INSERTED: StatusCode = -401;

/// Minimum interval between writes accepted by the channel (milliseconds).
pub const MIN_UPLOAD_INTERVAL_MS: u64 = 15_000;

/// Maximum write key length (bytes).
pub const MAX_WRITE_KEY_LEN: usize = 32;
