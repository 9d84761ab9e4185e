//! Lookup subsystem for Host Atlas.
//!
//! Provider adapters, the fallback registry, and the per-run orchestrator.

pub mod orchestrator;
pub mod providers;
pub mod registry;
pub mod types;

pub use orchestrator::{HostResolver, Orchestrator, Pacer, SystemResolver, ThreadPacer};
pub use providers::{default_registry, Api, ApiAdapter, HttpReply, Transport, UreqTransport};
pub use registry::{GeoLookup, Provider, Registry};
pub use types::{LookupError, LookupRecord, Outcome, Resolution};
