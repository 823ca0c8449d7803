//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable payloads to named JSON
//! slots. Freshness is taken from the slot file's modification time and judged
//! at read time against a caller-supplied maximum age; stale slots are never
//! evicted, they simply read as a miss.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tracing::debug;

/// Envelope written to disk: `{"data": <payload>}`
#[derive(Debug, Serialize)]
struct CacheEnvelope<'a, T> {
    data: &'a T,
}

/// Shape accepted on read. Older slots written without the envelope are
/// taken as the bare payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredSlot<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> StoredSlot<T> {
    fn into_inner(self) -> T {
        match self {
            StoredSlot::Wrapped { data } => data,
            StoredSlot::Bare(data) => data,
        }
    }
}

/// Manages reading and writing cached payloads to disk
///
/// Each named slot lives in `<cache_dir>/<name>.json`. Every write goes to its
/// own uniquely named temporary file in the same directory, which is then
/// renamed over the slot, so a reader never sees a partially written file.
/// Concurrent writers are not serialized: the last rename wins.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager over `cache_dir`, creating the directory if absent.
    pub fn new(cache_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the slot file for the given name
    pub fn slot_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    /// When the slot was last written, if it exists
    pub fn last_written(&self, name: &str) -> Option<SystemTime> {
        fs::metadata(self.slot_path(name)).ok()?.modified().ok()
    }

    /// Loads a slot if it exists, parses, and is no older than `max_age`.
    ///
    /// Age is compared in whole seconds, so a slot read back within the same
    /// second it was written is fresh even for a zero `max_age`. A modification
    /// time in the future counts as age zero. Every failure is a miss.
    pub fn load<T: DeserializeOwned>(&self, name: &str, max_age: Duration) -> Option<T> {
        let path = self.slot_path(name);
        let modified = fs::metadata(&path).ok()?.modified().ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        if age.as_secs() > max_age.as_secs() {
            debug!(slot = name, age_secs = age.as_secs(), "disk cache stale");
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<StoredSlot<T>>(&content) {
            Ok(slot) => {
                debug!(slot = name, "disk cache hit");
                Some(slot.into_inner())
            }
            Err(err) => {
                debug!(slot = name, error = %err, "disk cache unreadable");
                None
            }
        }
    }

    /// Writes `data` into the named slot, replacing it atomically.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if serialization, the temporary write, or the rename fails
    pub fn save<T: Serialize>(&self, name: &str, data: &T) -> io::Result<()> {
        let path = self.slot_path(name);

        let json = serde_json::to_string_pretty(&CacheEnvelope { data })
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut tmp = NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(slot = name, "disk cache written");
        Ok(())
    }
}
