//! Key-value store boundary for Daybook.
//!
//! Everything the persistence layer knows about the remote store lives in
//! this crate:
//! - [`KeyBuilder`] / [`KeySpace`] — deterministic, namespaced key shapes
//! - [`Store`] — the abstract op surface (strings, hashes, sorted sets)
//! - [`Pipeline`] / [`Command`] / [`Reply`] — batched round trips with
//!   per-command outcomes and no cross-command rollback
//! - [`MemoryStore`] — in-process backend for tests and development
//! - [`StoreConfig`] / [`RetryPolicy`] — client settings and the
//!   capped-linear reconnect policy
//!
//! Repositories depend only on the [`Store`] trait; the wire client is an
//! implementation detail behind it.

mod command;
mod config;
mod error;
mod keys;
mod memory;
mod store;

pub use command::{Command, CommandOutcome, Pipeline, Reply};
pub use config::{is_read_only_replica, RetryPolicy, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use keys::{KeyBuilder, KeySpace, DEFAULT_KEY_PREFIX};
pub use memory::MemoryStore;
pub use store::Store;
