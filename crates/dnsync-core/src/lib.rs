// # dnsync-core
//
// Core library for the dnsync dynamic DNS synchronizer.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping "A" records in
// sync with the host's outbound IP:
// - **IpSource**: Trait for determining the current IP
// - **DnsProvider**: Trait for reading and writing DNS records via provider APIs
// - **Reconciler**: Makes one domain's records match the current IP with minimal writes
// - **SyncEngine**: Runs a pass at startup and on every interval until shutdown
// - **SyncConfig**: Immutable configuration loaded once at startup
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider and IP-source implementations
// 2. **No Hidden State**: Configuration is passed explicitly; provider state is queried fresh every pass
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Failure Isolation**: One domain's failure never stops the others

pub mod traits;
pub mod engine;
pub mod reconciler;
pub mod config;
pub mod error;
pub mod zone;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, DnsRecord, NewRecord};
pub use engine::{SyncEngine, EngineEvent};
pub use reconciler::{Reconciler, DomainOutcome, DomainReport, PassReport};
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use zone::base_zone;
