//! Test doubles and common utilities for contract tests
//!
//! The doubles keep their state behind an `Arc` so a test can hand a clone
//! to the engine and still inspect calls afterwards.

#![allow(dead_code)]

use dnsync_core::error::{Error, Result};
use dnsync_core::traits::{DnsProvider, DnsRecord, IpSource, NewRecord};
use dnsync_core::SyncConfig;
use std::collections::{HashMap, HashSet, VecDeque};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A provider call as observed by [`FakeDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ZoneId {
        zone_name: String,
    },
    ListARecords {
        zone_id: String,
        name: String,
    },
    Create {
        zone_id: String,
        record: NewRecord,
    },
    Update {
        zone_id: String,
        record_id: String,
        content: String,
    },
}

impl ProviderCall {
    pub fn is_write(&self) -> bool {
        matches!(self, ProviderCall::Create { .. } | ProviderCall::Update { .. })
    }
}

#[derive(Default)]
struct FakeState {
    /// zone name -> zone id
    zones: HashMap<String, String>,
    /// (zone id, record)
    records: Vec<(String, DnsRecord)>,
    calls: Vec<ProviderCall>,
    failing_lists: HashSet<String>,
    failing_updates: HashSet<String>,
    fail_creates: bool,
    list_delay: Option<Duration>,
    first_list_delay: Option<Duration>,
    next_id: usize,
}

/// In-memory provider that records every call
#[derive(Clone, Default)]
pub struct FakeDnsProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone to the fake account
    pub fn with_zone(self, zone_name: &str, zone_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .zones
            .insert(zone_name.to_string(), zone_id.to_string());
        self
    }

    /// Add an existing "A" record
    pub fn with_a_record(self, zone_id: &str, record_id: &str, name: &str, content: &str) -> Self {
        self.state.lock().unwrap().records.push((
            zone_id.to_string(),
            DnsRecord {
                id: record_id.to_string(),
                name: name.to_string(),
                record_type: "A".to_string(),
                content: content.to_string(),
                ttl: 300,
                proxied: true,
            },
        ));
        self
    }

    /// Add an existing record of another type
    pub fn with_record_of_type(
        self,
        zone_id: &str,
        record_id: &str,
        name: &str,
        record_type: &str,
        content: &str,
    ) -> Self {
        self.state.lock().unwrap().records.push((
            zone_id.to_string(),
            DnsRecord {
                id: record_id.to_string(),
                name: name.to_string(),
                record_type: record_type.to_string(),
                content: content.to_string(),
                ttl: 1,
                proxied: false,
            },
        ));
        self
    }

    /// Make listing records for `name` fail
    pub fn failing_list_for(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_lists
            .insert(name.to_string());
        self
    }

    /// Make updating the record with `record_id` fail
    pub fn failing_update_for(self, record_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_updates
            .insert(record_id.to_string());
        self
    }

    /// Make every create fail
    pub fn failing_creates(self) -> Self {
        self.state.lock().unwrap().fail_creates = true;
        self
    }

    /// Delay every record listing
    pub fn with_list_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().list_delay = Some(delay);
        self
    }

    /// Delay only the first record listing
    pub fn with_first_list_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().first_list_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<ProviderCall> {
        self.calls().into_iter().filter(ProviderCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// All records named `name`, in insertion order
    pub fn records_named(&self, name: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|(_, r)| r.name == name)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn as_provider(&self) -> Arc<dyn DnsProvider> {
        Arc::new(self.clone())
    }
}

#[async_trait::async_trait]
impl DnsProvider for FakeDnsProvider {
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::ZoneId {
            zone_name: zone_name.to_string(),
        });
        state
            .zones
            .get(zone_name)
            .cloned()
            .ok_or_else(|| Error::zone_not_found(zone_name))
    }

    async fn list_a_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(ProviderCall::ListARecords {
                zone_id: zone_id.to_string(),
                name: name.to_string(),
            });
            state.first_list_delay.take().or(state.list_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.failing_lists.contains(name) {
            return Err(Error::provider("fake", format!("listing {} failed", name)));
        }

        Ok(state
            .records
            .iter()
            .filter(|(z, r)| z == zone_id && r.name == name && r.record_type == "A")
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> Result<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Create {
            zone_id: zone_id.to_string(),
            record: record.clone(),
        });

        if state.fail_creates {
            return Err(Error::provider("fake", "create failed"));
        }

        state.next_id += 1;
        let created = DnsRecord {
            id: format!("created-{}", state.next_id),
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            content: record.content.clone(),
            ttl: record.ttl,
            proxied: record.proxied,
        };
        state.records.push((zone_id.to_string(), created.clone()));
        Ok(created)
    }

    async fn update_record_content(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        content: &str,
    ) -> Result<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Update {
            zone_id: zone_id.to_string(),
            record_id: record.id.clone(),
            content: content.to_string(),
        });

        if state.failing_updates.contains(&record.id) {
            return Err(Error::provider("fake", format!("update of {} failed", record.id)));
        }

        let stored = state
            .records
            .iter_mut()
            .find(|(z, r)| z == zone_id && r.id == record.id)
            .map(|(_, r)| r)
            .ok_or_else(|| Error::not_found(format!("record {}", record.id)))?;
        stored.content = content.to_string();
        Ok(stored.clone())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// IP source that plays back a script of results
///
/// Once the script is exhausted the last entry repeats forever.
#[derive(Clone)]
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<std::result::Result<Ipv4Addr, String>>>>,
    last: Arc<Mutex<std::result::Result<Ipv4Addr, String>>>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedIpSource {
    pub fn new(script: Vec<std::result::Result<Ipv4Addr, String>>) -> Self {
        let last = script
            .last()
            .cloned()
            .unwrap_or_else(|| Err("empty script".to_string()));
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(last)),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// A source that always returns `ip`
    pub fn fixed(ip: Ipv4Addr) -> Self {
        Self::new(vec![Ok(ip)])
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        *self.calls.lock().unwrap() += 1;
        let next = self.script.lock().unwrap().pop_front();
        let result = match next {
            Some(result) => result,
            None => self.last.lock().unwrap().clone(),
        };
        result.map_err(Error::ip_discovery)
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

pub const IP: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 5);
pub const OLD_IP: Ipv4Addr = Ipv4Addr::new(198, 51, 100, 7);

/// Helper to create a minimal SyncConfig for testing
pub fn config_for(domains: &[&str], interval: &str) -> SyncConfig {
    SyncConfig::new(
        "test-key",
        "test@example.com",
        domains.iter().map(|d| d.to_string()).collect(),
    )
    .with_interval(interval)
}

pub fn domains(names: &[&str]) -> Vec<String> {
    names.iter().map(|d| d.to_string()).collect()
}
