// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of the dnsync
// `DnsProvider` trait.
//
// ## Behavior
//
// - One HTTP request per trait method call
// - Full error propagation (no retry, no backoff; the engine simply tries
//   again on the next tick)
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
// - Dry-run mode: lookups are performed, writes are only logged
//
// ## Security Requirements
//
// - The API key NEVER appears in logs or `Debug` output
// - Construction fails fast if the key or the account email is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dnsync_core::traits::{DnsProvider, DnsRecord, NewRecord, RECORD_TYPE_A};
use dnsync_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per page when listing
const RECORDS_PER_PAGE: &str = "100";

const PROVIDER_NAME: &str = "cloudflare";

/// Response envelope shared by every Cloudflare v4 endpoint
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

fn join_messages(errors: &[ApiMessage]) -> String {
    errors
        .iter()
        .map(|e| format!("{} (code {})", e.message, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cloudflare DNS provider
///
/// Authenticates with the global API key and account email
/// (`X-Auth-Key` / `X-Auth-Email`).
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended POST/PATCH payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Cloudflare global API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Cloudflare account email
    api_email: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_key", &"<REDACTED>")
            .field("api_email", &self.api_email)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider against the public API
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `api_key` or `api_email` is empty
    /// - [`Error::Http`] if the HTTP client cannot be built
    pub fn new(
        api_key: impl Into<String>,
        api_email: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        Self::with_base_url(api_key, api_email, CLOUDFLARE_API_BASE, dry_run)
    }

    /// Create a new Cloudflare provider against a custom API base URL
    pub fn with_base_url(
        api_key: impl Into<String>,
        api_email: impl Into<String>,
        base_url: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let api_email = api_email.into();

        if api_key.is_empty() || api_email.is_empty() {
            return Err(Error::config(
                "Cloudflare API key and email must not be empty",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        if dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_key,
            api_email,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Auth-Key", &self.api_key)
            .header("X-Auth-Email", &self.api_email)
            .header("Content-Type", "application/json")
    }

    /// Send a request and unwrap the `result` of the response envelope
    ///
    /// `what` names the resource for error messages.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        if !status.is_success() {
            // Prefer Cloudflare's own error messages when the body has them
            let detail = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .filter(|r| !r.errors.is_empty())
                .map(|r| join_messages(&r.errors))
                .unwrap_or(body);

            return Err(match status.as_u16() {
                401 | 403 => Error::auth(format!(
                    "Invalid API key or insufficient permissions. Status: {} - {}",
                    status, detail
                )),
                404 => Error::not_found(format!("{}: {}", what, detail)),
                429 => Error::rate_limited(format!(
                    "Rate limit exceeded. Status: {}",
                    status
                )),
                500..=599 => Error::provider(
                    PROVIDER_NAME,
                    format!("Cloudflare server error (transient): {} - {}", status, detail),
                ),
                _ => Error::provider(
                    PROVIDER_NAME,
                    format!("{} request failed: {} - {}", what, status, detail),
                ),
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })?;

        if !envelope.success {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("{} request failed: {}", what, join_messages(&envelope.errors)),
            ));
        }

        envelope.result.ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                format!("Invalid response format: {} result is missing", what),
            )
        })
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for zone: {}", zone_name);

        let request = self
            .request(reqwest::Method::GET, "/zones")
            .query(&[("name", zone_name)]);
        let zones: Vec<Zone> = self.send(request, "zone").await?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::zone_not_found(zone_name))?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=host.example.com
    /// ```
    async fn list_a_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Listing A records for {}", name);

        let request = self
            .request(reqwest::Method::GET, &format!("/zones/{}/dns_records", zone_id))
            .query(&[
                ("type", RECORD_TYPE_A),
                ("name", name),
                ("per_page", RECORDS_PER_PAGE),
            ]);
        let records: Vec<DnsRecord> = self.send(request, "DNS record").await?;

        Ok(records
            .into_iter()
            .filter(|r| r.record_type == RECORD_TYPE_A)
            .collect())
    }

    /// # API Call
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// {"name": "...", "type": "A", "content": "1.2.3.4", "ttl": 1, "proxied": false}
    /// ```
    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> Result<DnsRecord> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST to /zones/{}/dns_records with payload: {}",
                zone_id,
                serde_json::to_string(record).unwrap_or_default()
            );
            return Ok(DnsRecord {
                id: String::new(),
                name: record.name.clone(),
                record_type: record.record_type.clone(),
                content: record.content.clone(),
                ttl: record.ttl,
                proxied: record.proxied,
            });
        }

        let request = self
            .request(reqwest::Method::POST, &format!("/zones/{}/dns_records", zone_id))
            .json(record);
        let created: DnsRecord = self.send(request, "DNS record").await?;

        tracing::debug!("Created record {} ({})", created.name, created.id);
        Ok(created)
    }

    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// {"content": "1.2.3.4"}
    /// ```
    async fn update_record_content(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        content: &str,
    ) -> Result<DnsRecord> {
        let path = format!("/zones/{}/dns_records/{}", zone_id, record.id);
        let payload = serde_json::json!({ "content": content });

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH to {} with payload: {}",
                path,
                payload
            );
            return Ok(DnsRecord {
                content: content.to_string(),
                ..record.clone()
            });
        }

        let request = self.request(reqwest::Method::PATCH, &path).json(&payload);
        let updated: DnsRecord = self.send(request, "DNS record").await?;

        tracing::debug!("Record {} now points at {}", updated.name, updated.content);
        Ok(updated)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
