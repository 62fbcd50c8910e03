// # Outbound IP Source
//
// This crate provides an IP source that reports the address of the local
// interface the host would use to reach the internet.
//
// ## Architecture
//
// A UDP socket is bound to the unspecified address and "connected" to a
// well-known public address. Connecting a datagram socket only selects a
// route and a local address; no packet is sent. The socket's local address
// is then the outbound IP.
//
// Behind NAT this is the private address of the interface, not the public
// one seen by the internet.

use async_trait::async_trait;
use dnsync_core::traits::IpSource;
use dnsync_core::{Error, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Default probe target (Google public DNS, port 80)
pub const DEFAULT_PROBE_TARGET: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Upper bound on a single discovery
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Outbound-interface IP source
#[derive(Debug, Clone)]
pub struct OutboundIpSource {
    /// Address the socket is connected to
    target: SocketAddr,
}

impl OutboundIpSource {
    /// Create a source probing [`DEFAULT_PROBE_TARGET`]
    pub fn new() -> Self {
        Self::with_target(DEFAULT_PROBE_TARGET)
    }

    /// Create a source probing a custom target
    pub fn with_target(target: SocketAddr) -> Self {
        Self { target }
    }

    /// The probe target
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    async fn discover(&self) -> Result<Ipv4Addr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.connect(self.target).await?;
        let local = socket.local_addr()?;

        match local.ip() {
            IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
            IpAddr::V4(_) => Err(Error::ip_discovery(format!(
                "no route to {}: local address is unspecified",
                self.target
            ))),
            IpAddr::V6(ip) => Err(Error::ip_discovery(format!(
                "outbound address {} is not IPv4",
                ip
            ))),
        }
    }
}

impl Default for OutboundIpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpSource for OutboundIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let ip = tokio::time::timeout(DISCOVERY_TIMEOUT, self.discover())
            .await
            .map_err(|_| {
                Error::ip_discovery(format!(
                    "timed out after {:?} probing {}",
                    DISCOVERY_TIMEOUT, self.target
                ))
            })?
            .map_err(|e| match e {
                Error::Io(io) => Error::ip_discovery(format!("probing {}: {}", self.target, io)),
                other => other,
            })?;

        tracing::debug!("Outbound IP via {} is {}", self.target, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "outbound"
    }
}
