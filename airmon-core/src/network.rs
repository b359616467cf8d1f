//! WiFi Connect Routine
//!
//! One routine serves both the first connect at boot and every reconnect.
//! It always starts from a clean slate, so calling it while associated is
//! safe and simply renegotiates:
//!
//! ```text
//! disconnect ─► settle ─► hostname ─► [static IP] ─► begin ─► wait
//!      ─► poll status every interval:
//!           Connected      → Ok(local IP)
//!           Failed         → Err (bad credentials, no point waiting)
//!           otherwise      → keep polling until the poll budget runs out
//! ```

use core::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;

use crate::config::{LinkPolicy, WifiConfig};
use crate::errors::{MonitorError, MonitorResult};
use crate::traits::{ConnectionState, NetworkLink};

/// Associate `link` with the configured network
///
/// Returns the station's address; `0.0.0.0` if the stack does not report one.
pub fn connect<L, D>(
    link: &mut L,
    wifi: &WifiConfig,
    policy: &LinkPolicy,
    delay: &mut D,
) -> MonitorResult<Ipv4Addr>
where
    L: NetworkLink,
    D: DelayNs,
{
    log_info!("Connecting to {}", wifi.ssid.as_str());

    link.disconnect();
    delay.delay_ms(policy.settle_ms);

    link.set_hostname(&wifi.hostname);
    if let Some(static_ip) = &wifi.static_ip {
        if !link.apply_static_ip(static_ip) {
            log_warn!("static IP rejected by WiFi stack, falling back to DHCP");
        }
    }

    link.begin(&wifi.ssid, &wifi.passphrase);
    delay.delay_ms(policy.initial_wait_ms);

    let mut polls = 0u32;
    loop {
        match link.status() {
            ConnectionState::Connected => {
                let ip = link.local_ip().unwrap_or(Ipv4Addr::UNSPECIFIED);
                let [a, b, c, d] = ip.octets();
                log_info!("WiFi connected, IP address {}.{}.{}.{}", a, b, c, d);
                return Ok(ip);
            }
            ConnectionState::Failed => {
                log_error!(
                    "Failed to connect to WiFi, verify credentials for SSID {}",
                    wifi.ssid.as_str()
                );
                return Err(MonitorError::LinkFailure {
                    state: ConnectionState::Failed,
                });
            }
            state => {
                if polls >= policy.max_status_polls {
                    log_warn!("WiFi still {:?} after {} polls, giving up", state, polls);
                    return Err(MonitorError::LinkFailure { state });
                }
            }
        }

        polls += 1;
        log_debug!("#{} waiting for WiFi...", polls);
        delay.delay_ms(policy.poll_interval_ms);
    }
}
