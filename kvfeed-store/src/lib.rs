//! Key-value store clients for kvfeed.
//!
//! The engine talks to its store only through the [`KvStore`] trait: a flat,
//! hierarchical key space with a monotonically increasing index that supports
//! blocking ("long-poll") list calls.
//!
//! Two implementations ship here:
//! - [`MemoryStore`], an in-process store with real long-poll semantics, used
//!   by tests and demos
//! - [`ConsulStore`], a client for the Consul KV HTTP API

mod consul;
mod error;
mod memory;
mod store;

pub use consul::{ConsulConfig, ConsulStore};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{KeyValuePair, KvStore, ListResponse};
