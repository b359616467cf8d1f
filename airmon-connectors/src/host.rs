//! Host network link and delay
//!
//! On a hosted build the operating system owns the network interface, so
//! "joining" a network reduces to finding out whether the host can route to
//! the internet and which local address it would use. That is answered
//! without sending a packet: a UDP socket `connect()` only selects a route
//! and a source address.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::thread;
use std::time::Duration;

use airmon_core::config::StaticIpConfig;
use airmon_core::{ConnectionState, NetworkLink};
use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

/// Address used for the route probe; nothing is sent to it
pub const DEFAULT_PROBE_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), 80);

/// [`NetworkLink`] backed by the host's own network stack
#[derive(Debug)]
pub struct HostLink {
    probe: SocketAddr,
    hostname: String,
    state: ConnectionState,
    local_ip: Option<Ipv4Addr>,
}

impl HostLink {
    /// Link probing the default route
    pub fn new() -> Self {
        Self::with_probe(DEFAULT_PROBE_ADDR)
    }

    /// Link probing the route to `probe`
    pub fn with_probe(probe: SocketAddr) -> Self {
        Self {
            probe,
            hostname: String::new(),
            state: ConnectionState::Disconnected,
            local_ip: None,
        }
    }

    /// Hostname last set through the link
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    fn probe_route(&self) -> std::io::Result<Option<Ipv4Addr>> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(self.probe)?;
        match socket.local_addr()?.ip() {
            IpAddr::V4(ip) if !ip.is_unspecified() => Ok(Some(ip)),
            _ => Ok(None),
        }
    }
}

impl Default for HostLink {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkLink for HostLink {
    fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.local_ip = None;
    }

    fn set_hostname(&mut self, hostname: &str) {
        self.hostname = hostname.to_string();
    }

    fn apply_static_ip(&mut self, config: &StaticIpConfig) -> bool {
        warn!(
            "host link cannot set static address {}; the OS owns addressing",
            config.address()
        );
        false
    }

    fn begin(&mut self, ssid: &str, _passphrase: &str) {
        debug!("host link ignores SSID {}", ssid);
        self.state = match self.probe_route() {
            Ok(Some(ip)) => {
                info!("host route via {}", ip);
                self.local_ip = Some(ip);
                ConnectionState::Connected
            }
            Ok(None) => ConnectionState::Connecting,
            Err(err) => {
                warn!("no route to {}: {}", self.probe, err);
                ConnectionState::Failed
            }
        };
    }

    fn status(&self) -> ConnectionState {
        self.state
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.local_ip
    }
}

/// [`DelayNs`] that sleeps the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
