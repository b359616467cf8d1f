//! WiFi Stack Boundary

use core::fmt;
use core::net::Ipv4Addr;

use crate::config::StaticIpConfig;

/// Association state reported by the WiFi stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// Not associated
    Disconnected,
    /// Association or DHCP in progress
    Connecting,
    /// Associated with an address
    Connected,
    /// Association rejected (usually bad credentials)
    Failed,
}

impl ConnectionState {
    /// True only for `Connected`
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Station-mode WiFi link
///
/// The connect/reconnect sequencing lives in [`crate::network::connect`];
/// implementations only expose the stack's primitive calls.
pub trait NetworkLink {
    /// Drop any current association. Safe when already disconnected.
    fn disconnect(&mut self);

    /// Set the DHCP hostname used on the next association
    fn set_hostname(&mut self, hostname: &str);

    /// Use a static address instead of DHCP. Returns false if the stack refused it.
    fn apply_static_ip(&mut self, config: &StaticIpConfig) -> bool;

    /// Start associating in station mode; returns without waiting
    fn begin(&mut self, ssid: &str, passphrase: &str);

    /// Current association state
    fn status(&self) -> ConnectionState;

    /// Address assigned to the station, if associated
    fn local_ip(&self) -> Option<Ipv4Addr>;
}
