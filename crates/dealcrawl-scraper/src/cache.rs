//! On-disk cache of fetched pages.
//!
//! All entries live in one JSON file mapping URL → `{ html, timestamp }`,
//! where `timestamp` is Unix seconds. The file is loaded lazily on first use
//! and rewritten after every insert. A missing or unreadable file, or a
//! malformed entry, is treated as a cache miss and never as an error.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    html: String,
    timestamp: f64,
}

#[derive(Debug)]
pub struct HttpCache {
    path: PathBuf,
    ttl: Duration,
    entries: Mutex<Option<BTreeMap<String, Value>>>,
}

impl HttpCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            entries: Mutex::new(None),
        }
    }

    /// Returns the cached body for `url` if it is younger than the TTL.
    pub fn get(&self, url: &str) -> Option<String> {
        let now = now_secs();
        let mut guard = self.lock();
        let entries = self.loaded(&mut guard);
        let entry = parse_entry(entries.get(url)?)?;
        if self.is_expired(entry.timestamp, now) {
            return None;
        }
        Some(entry.html)
    }

    /// Stores `html` for `url` and persists the cache file.
    ///
    /// Expired and malformed entries are pruned before writing. Write
    /// failures are logged and otherwise ignored.
    pub fn set(&self, url: &str, html: &str) {
        let now = now_secs();
        let mut guard = self.lock();
        let entries = self.loaded(&mut guard);
        let entry = CacheEntry {
            html: html.to_string(),
            timestamp: now,
        };
        match serde_json::to_value(entry) {
            Ok(value) => {
                entries.insert(url.to_string(), value);
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to encode cache entry");
                return;
            }
        }
        self.prune(entries, now);
        self.save(entries);
    }

    /// Drops the entry for `url`, if any, and persists the change.
    pub fn remove(&self, url: &str) {
        let mut guard = self.lock();
        let entries = self.loaded(&mut guard);
        if entries.remove(url).is_some() {
            tracing::debug!(url, "removed cached page");
            self.save(entries);
        }
    }

    /// Removes expired and malformed entries, returning how many were
    /// removed. The file is rewritten only if something changed.
    pub fn clear_expired(&self) -> usize {
        let now = now_secs();
        let mut guard = self.lock();
        let entries = self.loaded(&mut guard);
        let removed = self.prune(entries, now);
        if removed > 0 {
            self.save(entries);
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, Option<BTreeMap<String, Value>>> {
        // A poisoned lock only means another thread panicked mid-update; the
        // map itself is still usable.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn loaded<'a>(
        &self,
        guard: &'a mut MutexGuard<'_, Option<BTreeMap<String, Value>>>,
    ) -> &'a mut BTreeMap<String, Value> {
        guard.get_or_insert_with(|| self.load())
    }

    fn load(&self) -> BTreeMap<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read page cache; starting empty");
                return BTreeMap::new();
            }
        };
        match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "page cache is corrupted; starting empty");
                BTreeMap::new()
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, Value>) {
        let result = serde_json::to_string_pretty(entries)
            .map_err(std::io::Error::other)
            .and_then(|json| std::fs::write(&self.path, json));
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save page cache");
        }
    }

    fn prune(&self, entries: &mut BTreeMap<String, Value>, now: f64) -> usize {
        let before = entries.len();
        entries.retain(|_, value| {
            parse_entry(value).is_some_and(|entry| !self.is_expired(entry.timestamp, now))
        });
        before - entries.len()
    }

    fn is_expired(&self, timestamp: f64, now: f64) -> bool {
        now - timestamp > self.ttl.as_secs_f64()
    }
}

fn parse_entry(value: &Value) -> Option<CacheEntry> {
    serde_json::from_value(value.clone()).ok()
}

fn now_secs() -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = chrono::Utc::now().timestamp_millis() as f64;
    millis / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache_in(dir: &tempfile::TempDir, ttl_secs: u64) -> HttpCache {
        HttpCache::new(dir.path().join("cache.json"), Duration::from_secs(ttl_secs))
    }

    #[test]
    fn miss_on_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, 60);
        assert!(cache.get("https://shop.example/a").is_none());
    }

    #[test]
    fn hit_after_set() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, 60);
        cache.set("https://shop.example/a", "<html>a</html>");
        assert_eq!(
            cache.get("https://shop.example/a").as_deref(),
            Some("<html>a</html>")
        );
    }

    #[test]
    fn entries_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        cache_in(&dir, 60).set("https://shop.example/a", "<html>a</html>");
        let reopened = cache_in(&dir, 60);
        assert!(reopened.get("https://shop.example/a").is_some());
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let stale = json!({
            "https://shop.example/old": { "html": "<html/>", "timestamp": now_secs() - 120.0 }
        });
        std::fs::write(&path, stale.to_string()).unwrap();
        let cache = HttpCache::new(&path, Duration::from_secs(60));
        assert!(cache.get("https://shop.example/old").is_none());
    }

    #[test]
    fn corrupted_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        let cache = HttpCache::new(&path, Duration::from_secs(60));
        assert!(cache.get("https://shop.example/a").is_none());
        cache.set("https://shop.example/a", "<html/>");
        assert!(cache.get("https://shop.example/a").is_some());
    }

    #[test]
    fn malformed_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let data = json!({
            "https://shop.example/bad": { "html": "<html/>" },
            "https://shop.example/worse": "just a string",
        });
        std::fs::write(&path, data.to_string()).unwrap();
        let cache = HttpCache::new(&path, Duration::from_secs(60));
        assert!(cache.get("https://shop.example/bad").is_none());
        assert!(cache.get("https://shop.example/worse").is_none());
    }

    #[test]
    fn clear_expired_counts_stale_and_malformed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let now = now_secs();
        let data = json!({
            "https://shop.example/fresh": { "html": "a", "timestamp": now },
            "https://shop.example/stale": { "html": "b", "timestamp": now - 500.0 },
            "https://shop.example/broken": { "timestamp": now },
        });
        std::fs::write(&path, data.to_string()).unwrap();
        let cache = HttpCache::new(&path, Duration::from_secs(60));

        assert_eq!(cache.clear_expired(), 2);
        assert!(cache.get("https://shop.example/fresh").is_some());
        assert_eq!(cache.clear_expired(), 0);

        let saved: BTreeMap<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn remove_drops_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, 60);
        cache.set("https://shop.example/a", "<html/>");
        cache.remove("https://shop.example/a");
        assert!(cache.get("https://shop.example/a").is_none());
        assert!(cache_in(&dir, 60).get("https://shop.example/a").is_none());
    }

    #[test]
    fn unwritable_path_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HttpCache::new(dir.path().join("missing/dir/cache.json"), Duration::from_secs(60));
        cache.set("https://shop.example/a", "<html/>");
        // Still served from memory for the rest of the run.
        assert!(cache.get("https://shop.example/a").is_some());
    }
}
