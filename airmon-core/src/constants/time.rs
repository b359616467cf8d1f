//! Time-Related Constants
//!
//! Intervals and timeouts for the control loop and the WiFi link.

// ===== CONTROL LOOP =====

/// Default sensor acquisition interval (milliseconds).
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 5_000;

/// Default upload interval (milliseconds).
///
/// Comfortably above the channel's 15 s rate limit.
pub const DEFAULT_UPLOAD_INTERVAL_MS: u64 = 20_000;

/// Default upper bound of the random upload jitter (milliseconds).
///
/// Spreads uploads of devices that booted together after a power cut.
pub const DEFAULT_UPLOAD_JITTER_MS: u32 = 2_000;

/// Pause between control loop iterations (milliseconds).
pub const LOOP_TICK_MS: u32 = 1_000;

// ===== WIFI LINK =====

/// Settle time after dropping an existing association (milliseconds).
pub const WIFI_DISCONNECT_SETTLE_MS: u32 = 100;

/// Wait after `begin()` before the first status poll (milliseconds).
pub const WIFI_INITIAL_WAIT_MS: u32 = 5_000;

/// Interval between link status polls while associating (milliseconds).
pub const WIFI_STATUS_POLL_INTERVAL_MS: u32 = 5_000;

/// Status polls before a connect attempt is abandoned.
///
/// 24 polls × 5 s = 2 minutes, enough for a slow DHCP server.
pub const WIFI_MAX_STATUS_POLLS: u32 = 24;

/// Wait before retrying the whole boot sequence after a failed connect (milliseconds).
pub const BOOT_RETRY_BACKOFF_MS: u32 = 10_000;
