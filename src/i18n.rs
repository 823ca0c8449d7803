//! Localized UI text
//!
//! Locales are nested JSON objects addressed by dotted keys
//! (`ui.category_title`). Lookup falls back from the requested locale to the
//! default locale and finally to the key itself. `en` and `uk` are embedded;
//! a locale directory, when configured, overrides them file by file.

use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;
use tracing::{debug, warn};

const BUILTIN_LOCALES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en.json")),
    ("uk", include_str!("../locales/uk.json")),
];

/// Translation store with a fallback chain
#[derive(Debug)]
pub struct Translator {
    default: String,
    dir: Option<PathBuf>,
    locales: RwLock<HashMap<String, Value>>,
}

impl Translator {
    /// Translator over the embedded locales only
    pub fn builtin(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            dir: None,
            locales: RwLock::new(builtin_locales()),
        }
    }

    /// Embedded locales overlaid with every `<lang>.json` found in `dir`
    pub fn from_dir(dir: impl Into<PathBuf>, default: impl Into<String>) -> Self {
        let dir = dir.into();
        Self {
            default: default.into(),
            locales: RwLock::new(load_locales(&dir)),
            dir: Some(dir),
        }
    }

    /// Construct from a map of already-parsed locales
    pub fn from_locales(locales: HashMap<String, Value>, default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            dir: None,
            locales: RwLock::new(locales),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default
    }

    /// Re-read the locale directory. Returns the languages now available.
    pub fn reload(&self) -> Vec<String> {
        if let Some(dir) = &self.dir {
            let fresh = load_locales(dir);
            *self.locales.write().unwrap_or_else(|e| e.into_inner()) = fresh;
        }
        self.available_languages()
    }

    /// Sorted language codes
    pub fn available_languages(&self) -> Vec<String> {
        let locales = self.locales.read().unwrap_or_else(|e| e.into_inner());
        let mut codes: Vec<String> = locales.keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn has_language(&self, code: &str) -> bool {
        self.locales
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(code)
    }

    /// String at `path` in one locale, without fallback
    pub fn lookup(&self, lang: &str, path: &[&str]) -> Option<String> {
        let locales = self.locales.read().unwrap_or_else(|e| e.into_inner());
        let mut cur = locales.get(lang)?;
        for segment in path {
            cur = cur.as_object()?.get(*segment)?;
        }
        cur.as_str().map(str::to_string)
    }

    fn resolve(&self, key: &str, lang: &str) -> Option<String> {
        let path: Vec<&str> = key.split('.').collect();
        self.lookup(lang, &path)
            .or_else(|| self.lookup(&self.default, &path))
    }

    /// Translate `key`; requested locale, then default, then the key itself.
    pub fn t(&self, key: &str, lang: &str) -> String {
        self.t_with(key, lang, &[])
    }

    /// Translate `key` and substitute `{name}` placeholders from `vars`.
    ///
    /// Placeholders without a matching var are left as written.
    pub fn t_with(&self, key: &str, lang: &str, vars: &[(&str, &dyn Display)]) -> String {
        let Some(template) = self.resolve(key, lang) else {
            return key.to_string();
        };
        vars.iter().fold(template, |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), &value.to_string())
        })
    }

    /// Translate `{map}.{raw}`, falling back to `raw` itself
    pub fn t_or_raw(&self, map: &str, raw: &str, lang: &str) -> String {
        self.resolve(&format!("{}.{}", map, raw), lang)
            .unwrap_or_else(|| raw.to_string())
    }

    /// Translate an entity display name through the locale's `categories` map.
    pub fn tc(&self, name: &str, lang: &str) -> String {
        self.lookup(lang, &["categories", name])
            .unwrap_or_else(|| name.to_string())
    }
}

fn builtin_locales() -> HashMap<String, Value> {
    BUILTIN_LOCALES
        .iter()
        .filter_map(|(code, raw)| match serde_json::from_str(raw) {
            Ok(value) => Some((code.to_string(), value)),
            Err(err) => {
                warn!(locale = code, error = %err, "embedded locale unreadable");
                None
            }
        })
        .collect()
}

fn load_locales(dir: &Path) -> HashMap<String, Value> {
    let mut locales = builtin_locales();
    let Ok(entries) = fs::read_dir(dir) else {
        warn!(dir = %dir.display(), "locale directory unreadable, using embedded locales");
        return locales;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(code) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let parsed = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());
        match parsed {
            Some(value) => {
                debug!(locale = code, "loaded locale file");
                locales.insert(code.to_string(), value);
            }
            None => warn!(path = %path.display(), "skipping unreadable locale file"),
        }
    }
    locales
}
