//! Cache-guarded loading of upstream rows
//!
//! Reference lists (commodities, terminals, vehicles, categories) go through
//! memory, then the network, and are mirrored to disk so a fresh process can
//! seed its memory tier. Per-entity payloads (prices, routes, history) go
//! through the disk tier only.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{data_rows, Record, Upstream, UexError};
use crate::cache::{CacheManager, MemoryCache};

/// Max age accepted when seeding a memory tier from disk at construction
pub const SEED_MAX_AGE: Duration = Duration::from_secs(24 * 3600);

/// A named reference list and how long it stays fresh in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSpec {
    /// Disk slot name
    pub name: &'static str,
    /// Upstream resource
    pub resource: &'static str,
    /// Memory freshness window
    pub ttl: Duration,
}

impl ListSpec {
    pub const COMMODITIES: ListSpec = ListSpec {
        name: "commodities",
        resource: "commodities",
        ttl: Duration::from_secs(86_400),
    };
    pub const TERMINALS: ListSpec = ListSpec {
        name: "terminals",
        resource: "terminals",
        ttl: Duration::from_secs(86_400),
    };
    pub const VEHICLES: ListSpec = ListSpec {
        name: "vehicles",
        resource: "vehicles",
        ttl: Duration::from_secs(86_400),
    };
    pub const CATEGORIES: ListSpec = ListSpec {
        name: "categories",
        resource: "categories",
        ttl: Duration::from_secs(60),
    };
}

/// Memory-then-network list with a disk mirror
///
/// Each command handler owns its own `CachedList`s; nothing is shared
/// between handlers except the files on disk.
#[derive(Debug)]
pub struct CachedList {
    spec: ListSpec,
    memory: MemoryCache<Arc<Vec<Record>>>,
}

impl CachedList {
    /// Empty list; the first `get` goes to the network.
    pub fn new(spec: ListSpec) -> Self {
        Self {
            spec,
            memory: MemoryCache::new(),
        }
    }

    /// List pre-populated from the disk slot when it is at most a day old.
    pub fn seeded(spec: ListSpec, disk: &CacheManager) -> Self {
        let list = Self::new(spec);
        if let Some(rows) = disk
            .load::<Vec<Record>>(spec.name, SEED_MAX_AGE)
            .filter(|rows| !rows.is_empty())
        {
            debug!(list = spec.name, rows = rows.len(), "seeded from disk");
            list.memory.store(Arc::new(rows));
        }
        list
    }

    pub fn spec(&self) -> ListSpec {
        self.spec
    }

    /// Rows currently held in memory, regardless of age
    pub fn snapshot(&self) -> Option<Arc<Vec<Record>>> {
        self.memory.peek().map(|entry| entry.value)
    }

    /// Replace the memory tier with rows fetched elsewhere; empty rows are ignored.
    pub fn prime(&self, rows: Arc<Vec<Record>>) {
        if !rows.is_empty() {
            self.memory.store(rows);
        }
    }

    /// Fresh rows from memory, or fetched, remembered, and mirrored to disk.
    ///
    /// An empty list is never considered fresh. A failed disk mirror is logged
    /// and does not fail the call.
    pub async fn get(
        &self,
        upstream: &dyn Upstream,
        disk: &CacheManager,
    ) -> Result<Arc<Vec<Record>>, UexError> {
        if let Some(rows) = self
            .memory
            .fresh(self.spec.ttl)
            .filter(|rows| !rows.is_empty())
        {
            return Ok(rows);
        }

        debug!(list = self.spec.name, "memory miss, fetching");
        let rows = Arc::new(data_rows(upstream.get(self.spec.resource, &[]).await?));
        self.memory.store(Arc::clone(&rows));
        if let Err(err) = disk.save(self.spec.name, &*rows) {
            warn!(list = self.spec.name, error = %err, "failed to mirror list to disk");
        }
        Ok(rows)
    }
}

/// A disk-cached request for one entity's rows
#[derive(Debug, Clone)]
pub struct RowsRequest {
    /// Disk slot name, unique per parameter combination
    pub slot: String,
    pub resource: &'static str,
    pub params: Vec<(&'static str, String)>,
    /// Disk freshness window
    pub ttl: Duration,
}

impl RowsRequest {
    pub fn new(slot: impl Into<String>, resource: &'static str, ttl: Duration) -> Self {
        Self {
            slot: slot.into(),
            resource,
            params: Vec::new(),
            ttl,
        }
    }

    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    /// Fresh non-empty rows from disk, or fetched and written back.
    pub async fn load(
        &self,
        upstream: &dyn Upstream,
        disk: &CacheManager,
    ) -> Result<Vec<Record>, UexError> {
        if let Some(rows) = disk
            .load::<Vec<Record>>(&self.slot, self.ttl)
            .filter(|rows| !rows.is_empty())
        {
            return Ok(rows);
        }

        let rows = data_rows(upstream.get(self.resource, &self.params).await?);
        if let Err(err) = disk.save(&self.slot, &rows) {
            warn!(slot = %self.slot, error = %err, "failed to write rows to disk");
        }
        Ok(rows)
    }
}
