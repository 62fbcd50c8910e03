//! Sync engine
//!
//! The SyncEngine is responsible for:
//! - Discovering the current IP at the start of every pass
//! - Running the Reconciler over all configured domains
//! - Repeating the pass on a fixed interval until shutdown
//!
//! ## Lifecycle
//!
//! ```text
//!            ┌───────────── interval tick ─────────────┐
//!            ▼                                         │
//! start ─▶ pass ─▶ RUNNING (wait for tick or shutdown) ─┤
//!                                                      │
//!                                  shutdown ─▶ STOPPED ◀┘
//! ```
//!
//! The first pass runs immediately. Failing to discover the IP for that
//! first pass is fatal; later discovery failures only skip their pass.
//! Reconciliation errors never stop the loop, and there is no backoff:
//! a failed domain is simply tried again on the next tick.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::reconciler::{DomainOutcome, PassReport, Reconciler};
use crate::traits::{DnsProvider, IpSource};
use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Capacity of the engine event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        domains: usize,
        interval: Duration,
    },

    /// A pass began with a freshly discovered IP
    PassStarted {
        ip: Ipv4Addr,
    },

    /// A domain was reconciled successfully
    DomainSynced {
        domain: String,
        outcome: DomainOutcome,
    },

    /// A domain failed to reconcile
    DomainFailed {
        domain: String,
        error: String,
    },

    /// A pass was skipped because the IP could not be discovered
    PassSkipped {
        error: String,
    },

    /// A pass finished
    PassCompleted {
        succeeded: usize,
        failed: usize,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Periodic DNS synchronizer
///
/// Holds the immutable configuration, the IP source and the Reconciler.
/// All work happens on the task that calls [`SyncEngine::run_until`]:
/// domains are reconciled one at a time and passes never overlap.
pub struct SyncEngine {
    /// IP source, queried once per pass
    ip_source: Box<dyn IpSource>,

    /// Reconciler writing to the provider
    reconciler: Reconciler,

    /// Domains to keep in sync, in configured order
    domains: Vec<String>,

    /// Time between passes
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    ///
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) if the configuration has no
    /// domains or an invalid interval.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Arc<dyn DnsProvider>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;
        let interval = config.interval()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            ip_source,
            reconciler: Reconciler::new(provider),
            domains: config.domains,
            interval,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Time between passes
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Domains reconciled on every pass
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Run until `shutdown` completes
    ///
    /// Performs one pass immediately, then one pass per interval measured
    /// from the moment this method was called. A tick missed because a pass
    /// overran is delayed rather than bursted. When
    /// `shutdown` resolves the timer is dropped and the method returns; a
    /// pass already in progress is allowed to finish first.
    ///
    /// # Errors
    ///
    /// Only the IP discovery of the very first pass can fail this method.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.emit_event(EngineEvent::Started {
            domains: self.domains.len(),
            interval: self.interval,
        });

        // Ticks are anchored to startup, not to the end of the first pass
        let start = Instant::now();

        let ip = self.ip_source.current().await?;
        info!("Current IP is: {}", ip);
        info!("Starting with sync interval: {:?}", self.interval);
        self.reconcile(ip).await;

        let mut ticker = tokio::time::interval_at(start + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutting down");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.run_pass().await {
                        warn!("Skipping sync pass, could not determine current IP: {}", e);
                        self.emit_event(EngineEvent::PassSkipped {
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Discover the current IP and run one pass over all domains
    ///
    /// # Errors
    ///
    /// Fails only if the IP cannot be discovered. Per-domain errors are
    /// reported in the returned [`PassReport`].
    pub async fn run_pass(&self) -> Result<PassReport> {
        let ip = self.ip_source.current().await?;
        Ok(self.reconcile(ip).await)
    }

    async fn reconcile(&self, ip: Ipv4Addr) -> PassReport {
        debug!(
            "Starting pass for {} domain(s) with ip {} (source: {}, provider: {})",
            self.domains.len(),
            ip,
            self.ip_source.source_name(),
            self.reconciler.provider().provider_name()
        );
        self.emit_event(EngineEvent::PassStarted { ip });

        let report = self.reconciler.reconcile_all(&self.domains, ip).await;

        for domain in &report.domains {
            let event = match &domain.result {
                Ok(outcome) => EngineEvent::DomainSynced {
                    domain: domain.domain.clone(),
                    outcome: outcome.clone(),
                },
                Err(e) => EngineEvent::DomainFailed {
                    domain: domain.domain.clone(),
                    error: e.to_string(),
                },
            };
            self.emit_event(event);
        }

        let (succeeded, failed) = (report.succeeded(), report.failed());
        debug!("Pass finished: {} succeeded, {} failed", succeeded, failed);
        self.emit_event(EngineEvent::PassCompleted { succeeded, failed });

        report
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
