//! Record reconciliation
//!
//! The Reconciler makes a provider's "A" records for one domain point at
//! the current IP using as few write calls as possible:
//!
//! ```text
//! domain ── base_zone ──▶ zone_id ──▶ list A records
//!                                        │
//!                  ┌─────────────────────┼──────────────────────┐
//!                  ▼                     ▼                      ▼
//!             no records         content == ip           content != ip
//!             create one           no call            update content only
//! ```
//!
//! Every record of the domain is evaluated on its own. A failed update does
//! not stop the remaining records from being updated; the failures are
//! gathered into a single [`Error::RecordUpdates`].

use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsRecord, NewRecord};
use crate::zone::base_zone;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a successful reconciliation of one domain did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// No "A" record existed; one was created
    Created {
        /// The record as stored by the provider
        record: DnsRecord,
    },

    /// At least one record had stale content and was updated
    Updated {
        /// Number of records updated
        updated: usize,
        /// Number of records that were already correct
        unchanged: usize,
    },

    /// Every existing record already pointed at the current IP
    Unchanged {
        /// Number of records checked
        records: usize,
    },
}

impl DomainOutcome {
    /// Whether any write call was issued
    pub fn wrote(&self) -> bool {
        !matches!(self, DomainOutcome::Unchanged { .. })
    }
}

/// Result of reconciling a single domain within a pass
#[derive(Debug)]
pub struct DomainReport {
    /// The configured domain name
    pub domain: String,
    /// Outcome or the error that was reported for this domain
    pub result: Result<DomainOutcome>,
}

/// Results of one full pass over the configured domains, in configured order
#[derive(Debug)]
pub struct PassReport {
    /// The IP every domain was reconciled against
    pub ip: Ipv4Addr,
    /// Per-domain results
    pub domains: Vec<DomainReport>,
}

impl PassReport {
    /// Number of domains that reconciled successfully
    pub fn succeeded(&self) -> usize {
        self.domains.iter().filter(|d| d.result.is_ok()).count()
    }

    /// Number of domains with a reported error
    pub fn failed(&self) -> usize {
        self.domains.len() - self.succeeded()
    }
}

/// Reconciles configured domains against a [`DnsProvider`]
pub struct Reconciler {
    provider: Arc<dyn DnsProvider>,
}

impl Reconciler {
    /// Create a reconciler backed by `provider`
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// The provider this reconciler writes to
    pub fn provider(&self) -> &dyn DnsProvider {
        self.provider.as_ref()
    }

    /// Reconcile every domain against `ip`, in order
    ///
    /// Never fails as a whole: each domain's error is logged and kept in the
    /// returned report, and the next domain is processed regardless.
    pub async fn reconcile_all(&self, domains: &[String], ip: Ipv4Addr) -> PassReport {
        let mut reports = Vec::with_capacity(domains.len());

        for domain in domains {
            let result = self.reconcile(domain, ip).await;
            if let Err(e) = &result {
                warn!(domain = %domain, error = %e, "Error updating {}: {}", domain, e);
            }
            reports.push(DomainReport {
                domain: domain.clone(),
                result,
            });
        }

        PassReport {
            ip,
            domains: reports,
        }
    }

    /// Reconcile a single domain against `ip`
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the domain has a single label
    /// - The provider's error if the zone lookup, the record listing or the
    ///   record creation fails
    /// - [`Error::RecordUpdates`] if any record update fails
    pub async fn reconcile(&self, domain: &str, ip: Ipv4Addr) -> Result<DomainOutcome> {
        let zone_name = base_zone(domain).ok_or_else(|| {
            Error::invalid_input(format!("Domain has no parent zone: {}", domain))
        })?;

        let zone_id = self.provider.zone_id(zone_name).await?;
        debug!("Zone {} resolved to {}", zone_name, zone_id);

        let records = self.provider.list_a_records(&zone_id, domain).await?;
        let content = ip.to_string();

        if records.is_empty() {
            debug!("Record {} not found. Creating!", domain);
            let record = self
                .provider
                .create_record(&zone_id, &NewRecord::a(domain, content.as_str()))
                .await?;
            info!("Created A record {} -> {}", domain, content);
            return Ok(DomainOutcome::Created { record });
        }

        self.update_stale(&zone_id, domain, &records, &content).await
    }

    async fn update_stale(
        &self,
        zone_id: &str,
        domain: &str,
        records: &[DnsRecord],
        content: &str,
    ) -> Result<DomainOutcome> {
        let mut updated = 0;
        let mut unchanged = 0;
        let mut errors = Vec::new();

        for record in records {
            if record.content == content {
                debug!(
                    "Skipping update of {} since ip already is {}",
                    record.name, content
                );
                unchanged += 1;
                continue;
            }

            info!(
                "Updating {} with ip: {} to ip: {}",
                record.name, record.content, content
            );
            match self
                .provider
                .update_record_content(zone_id, record, content)
                .await
            {
                Ok(_) => updated += 1,
                Err(e) => {
                    warn!("Failed to update record {} ({}): {}", record.name, record.id, e);
                    errors.push(format!("record {}: {}", record.id, e));
                }
            }
        }

        if !errors.is_empty() {
            return Err(Error::RecordUpdates {
                domain: domain.to_string(),
                failed: errors.len(),
                attempted: updated + errors.len(),
                errors,
            });
        }

        if updated == 0 {
            Ok(DomainOutcome::Unchanged { records: unchanged })
        } else {
            Ok(DomainOutcome::Updated { updated, unchanged })
        }
    }
}
