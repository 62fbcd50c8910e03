// # DNS Provider Trait
//
// Defines the interface the Reconciler uses to read and write DNS records.
//
// ## Implementations
//
// - Cloudflare: `dnsync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsync_core::DnsProvider;
//
// let zone_id = provider.zone_id("example.com").await?;
// let records = provider.list_a_records(&zone_id, "home.example.com").await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The only record type dnsync manages
pub const RECORD_TYPE_A: &str = "A";

/// TTL value the provider interprets as "automatic"
pub const AUTOMATIC_TTL: u32 = 1;

/// A DNS record as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record ID
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type ("A")
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content (dotted-decimal IPv4 for A records)
    pub content: String,
    /// Time-to-live
    #[serde(default)]
    pub ttl: u32,
    /// Whether traffic is proxied through the provider
    #[serde(default)]
    pub proxied: bool,
}

/// A record to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Fully-qualified record name
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content
    pub content: String,
    /// Time-to-live
    pub ttl: u32,
    /// Whether traffic is proxied through the provider
    pub proxied: bool,
}

impl NewRecord {
    /// An unproxied "A" record with automatic TTL
    pub fn a(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: RECORD_TYPE_A.to_string(),
            content: content.into(),
            ttl: AUTOMATIC_TTL,
            proxied: false,
        }
    }
}

/// Trait for DNS provider implementations
///
/// Each method maps to a single provider API call. Providers do not retry,
/// do not cache and do not decide whether a write is needed; all of that
/// belongs to the [`Reconciler`](crate::Reconciler).
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name (e.g. "example.com") to the provider's zone ID
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The zone ID
    /// - `Err(Error::ZoneNotFound)`: The account has no such zone
    /// - `Err(Error)`: Any other failure
    async fn zone_id(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List all "A" records in `zone_id` whose name equals `name`
    async fn list_a_records(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record in `zone_id`
    ///
    /// Returns the record as stored by the provider.
    async fn create_record(
        &self,
        zone_id: &str,
        record: &NewRecord,
    ) -> Result<DnsRecord, crate::Error>;

    /// Replace the content of an existing record
    ///
    /// Every other attribute of the record (ID, TTL, proxy flag) must be
    /// left unchanged. Returns the record as stored by the provider.
    async fn update_record_content(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        content: &str,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
