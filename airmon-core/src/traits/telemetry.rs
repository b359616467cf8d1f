//! Telemetry Client Boundary

use crate::errors::TransportError;

/// Result code of a channel write
///
/// HTTP status on a completed request, or a negative client-side code
/// (see [`crate::constants::telemetry::NOT_INSERTED`]).
pub type StatusCode = i32;

/// HTTP client bound to a ThingSpeak-style channel
///
/// Field values and status are staged with the setters and sent together
/// by `write_fields`, which always clears the staged values afterwards.
pub trait TelemetryClient {
    /// Stage a value for field `index` (1..=8)
    fn set_field(&mut self, index: u8, value: f32) -> Result<(), TransportError>;

    /// Stage a status message, already truncated by the caller
    fn set_status(&mut self, status: &str) -> Result<(), TransportError>;

    /// Send staged values to `channel` using `write_key`
    ///
    /// Any status code the server produced is `Ok`, including errors such
    /// as 403; `Err` means no status code was produced at all.
    fn write_fields(&mut self, channel: u32, write_key: &str) -> Result<StatusCode, TransportError>;

    /// Drop staged fields and status without sending them
    fn discard_staged(&mut self);
}
