//! Core traits for dnsync
//!
//! This module defines the abstract interfaces the engine is written against.
//!
//! - [`IpSource`]: Determine the host's current outbound IP
//! - [`DnsProvider`]: Read and write DNS records via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DnsRecord, NewRecord, RECORD_TYPE_A, AUTOMATIC_TTL};
