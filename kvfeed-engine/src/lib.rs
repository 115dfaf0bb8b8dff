//! Change-feed engine for load-balancer configuration.
//!
//! The [`Engine`] stores hosts, listeners, backends and frontends as JSON
//! under a key prefix of a [`kvfeed_store::KvStore`], and turns changes
//! under that prefix into a stream of [`kvfeed_types::ChangeEvent`]s:
//!
//! - [`PathScheme`] maps `(kind, id)` to keys and classifies raw keys
//! - [`EntityCodec`] encodes entities, sealing host key pairs
//! - [`ShadowDiffEngine`] diffs successive snapshots
//! - [`WatchLoop`] drives the long poll and publishes events
//!
//! ```no_run
//! use kvfeed_engine::{Engine, EngineConfig};
//! use kvfeed_store::MemoryStore;
//! use std::sync::Arc;
//! use tokio::sync::{mpsc, watch};
//!
//! # async fn demo() -> kvfeed_engine::EngineResult<()> {
//! let engine = Engine::new(Arc::new(MemoryStore::new()), EngineConfig::default())?;
//! let (events_tx, mut events_rx) = mpsc::channel(64);
//! let (_cancel_tx, cancel_rx) = watch::channel(false);
//! tokio::spawn(async move { engine.subscribe(events_tx, cancel_rx).await });
//! while let Some(event) = events_rx.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
mod engine;
pub mod error;
pub mod path;
pub mod shadow;
pub mod watch;

pub use codec::{EntityCodec, PlainEntity, SealedHostEntry, SealedHostSettings, seal_host, unseal_host};
pub use config::{EngineConfig, UnrecognizedKeys};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use path::{KeyTemplate, PathScheme, ResolvedKey};
pub use shadow::{Reconciliation, ShadowDiffEngine};
pub use watch::WatchLoop;
