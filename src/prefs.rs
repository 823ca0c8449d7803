//! Per-guild language preferences persisted as one JSON object
//!
//! Maps a guild id (as a string) to a language code. The file is read once at
//! construction and rewritten atomically on every change.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Guild → language store
#[derive(Debug)]
pub struct LangPrefs {
    path: PathBuf,
    default: String,
    data: Mutex<BTreeMap<String, String>>,
}

impl LangPrefs {
    /// Load preferences from `path`, creating its directory.
    ///
    /// A missing or unreadable file starts an empty map.
    pub fn load(path: impl Into<PathBuf>, default: impl Into<String>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data: BTreeMap<String, String> = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        debug!(path = %path.display(), "language preferences loaded");
        Ok(Self {
            path,
            default: default.into(),
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_language(&self) -> &str {
        &self.default
    }

    /// Language for a guild, or the default outside guilds or when unset
    pub fn get(&self, guild_id: Option<u64>) -> String {
        let Some(guild_id) = guild_id.filter(|id| *id != 0) else {
            return self.default.clone();
        };
        self.data
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&guild_id.to_string())
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Store a guild's language and persist the whole map.
    ///
    /// The lock is held until the file is replaced, so the file on disk always
    /// reflects the latest map.
    pub fn set(&self, guild_id: u64, lang: &str) -> io::Result<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.insert(guild_id.to_string(), lang.to_string());

        let json = serde_json::to_string_pretty(&*data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        drop(data);

        info!(guild_id, lang, "guild language updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_default() {
        let dir = TempDir::new().unwrap();
        let prefs = LangPrefs::load(dir.path().join("data").join("lang_prefs.json"), "uk").unwrap();
        assert_eq!(prefs.get(Some(123)), "uk");
        assert_eq!(prefs.get(None), "uk");
        assert!(dir.path().join("data").exists());
    }

    #[test]
    fn test_set_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lang_prefs.json");

        let prefs = LangPrefs::load(&path, "uk").unwrap();
        prefs.set(555, "en").unwrap();
        assert_eq!(prefs.get(Some(555)), "en");
        assert_eq!(prefs.get(Some(556)), "uk");

        let reloaded = LangPrefs::load(&path, "uk").unwrap();
        assert_eq!(reloaded.get(Some(555)), "en");

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"555": "en"}));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_concurrent_sets_keep_every_guild() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lang_prefs.json");

        for _ in 0..20 {
            let prefs = LangPrefs::load(&path, "uk").unwrap();
            std::thread::scope(|scope| {
                for guild in 1..=8u64 {
                    let prefs = &prefs;
                    scope.spawn(move || prefs.set(guild, "en").expect("concurrent set"));
                }
            });

            let reloaded = LangPrefs::load(&path, "uk").unwrap();
            for guild in 1..=8u64 {
                assert_eq!(reloaded.get(Some(guild)), "en", "guild {} lost on disk", guild);
            }
            fs::remove_file(&path).unwrap();
        }
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lang_prefs.json");
        fs::write(&path, "[1, 2").unwrap();

        let prefs = LangPrefs::load(&path, "en").unwrap();
        assert_eq!(prefs.get(Some(1)), "en");
    }
}
