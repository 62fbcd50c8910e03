// # IP Source Trait
//
// Defines the interface for determining the host's current IP address.
//
// ## Implementations
//
// - Outbound interface (UDP connect): `dnsync-ip-outbound` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsync_core::IpSource;
//
// let ip = source.current().await?;
// println!("Current IP is: {ip}");
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// The engine calls [`current`](IpSource::current) once at the start of
/// every reconciliation pass. Implementations must not cache the result
/// across calls; the address may change between passes.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Determine the current IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current address
    /// - `Err(Error)`: If unable to determine the address
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Short name for logging
    fn source_name(&self) -> &'static str;
}
