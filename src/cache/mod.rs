//! Two-tier cache for upstream payloads
//!
//! `CacheManager` persists payloads to named JSON slots on disk and judges
//! freshness from the file modification time. `MemoryCache` keeps a short-lived
//! in-process snapshot in front of it so repeated lookups within one process
//! skip both the disk and the network.

mod manager;
mod memory;

pub use manager::CacheManager;
pub use memory::{MemoryCache, MemoryEntry};
