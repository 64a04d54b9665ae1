//! Caching for the MathMentor client.
//!
//! - [`Fingerprint`]: the key identifying logically identical requests
//! - [`ResponseCache`]: in-memory TTL cache of decoded responses
//! - [`PersistentCache`]: TTL envelopes over a [`KeyValueStore`](mentor_core::KeyValueStore)
//! - [`MemoryStore`], [`FileStore`]: store backends

mod cache;
mod fingerprint;
mod persistent;
mod store;

pub use cache::{CacheConfig, CacheStats, ResponseCache};
pub use fingerprint::Fingerprint;
pub use persistent::PersistentCache;
pub use store::{FileStore, MemoryStore};
