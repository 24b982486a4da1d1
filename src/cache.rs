use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

pub const CACHE_PATH_ENV: &str = "FILEINFO_CACHE_PATH";

/// Storage for encoded previews, keyed by virtual path
pub trait PreviewCache {
    /// Reads persisted previews, dropping expired ones
    fn load(&mut self) -> Result<()>;

    /// Persists the current previews
    fn save(&self) -> Result<()>;

    /// Get the preview of `path` if it was cached for this modification time
    fn get(&self, path: &str, modified: SystemTime) -> Option<&str>;

    /// Records `preview` for `path` as of its modification time
    fn insert(&mut self, path: String, modified: SystemTime, preview: String);

    /// Forgets the preview of `path`
    fn remove(&mut self, path: &str) -> Option<String>;

    /// Forgets every preview
    fn clear(&mut self);

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    /// Drop entries older than the maximum age
    fn invalidate_expired(&mut self);
}

/// A preview with the source mtime it was built from
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    preview: String,
    last_modified: SystemTime,
    cached_at: SystemTime,
}

impl CacheEntry {
    fn new(preview: String, last_modified: SystemTime) -> Self {
        Self {
            preview,
            last_modified,
            cached_at: SystemTime::now(),
        }
    }

    fn is_expired(&self, max_age: Duration) -> bool {
        match self.cached_at.elapsed() {
            Ok(elapsed) => elapsed > max_age,
            Err(_) => true,
        }
    }

    fn matches(&self, modified: SystemTime) -> bool {
        self.last_modified == modified
    }
}

/// Previews persisted as one JSON document
#[derive(Debug)]
pub struct FileSystemCache {
    cache_path: PathBuf,
    entries: HashMap<String, CacheEntry>,
    max_age: Duration,
}

impl FileSystemCache {
    pub fn new(cache_path: PathBuf) -> Self {
        Self::with_max_age(cache_path, Duration::from_secs(24 * 60 * 60))
    }

    pub fn with_max_age(cache_path: PathBuf, max_age: Duration) -> Self {
        Self {
            cache_path,
            entries: HashMap::new(),
            max_age,
        }
    }
}

impl PreviewCache for FileSystemCache {
    fn load(&mut self) -> Result<()> {
        if !self.cache_path.exists() {
            return Ok(());
        }

        let contents = fs::read_to_string(&self.cache_path).context("Failed to read cache file")?;

        self.entries = serde_json::from_str(&contents).context("Failed to parse cache file")?;

        self.invalidate_expired();

        Ok(())
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }

        let json = serde_json::to_string(&self.entries).context("Failed to serialize cache")?;

        fs::write(&self.cache_path, json).context("Failed to write cache file")?;

        Ok(())
    }

    fn get(&self, path: &str, modified: SystemTime) -> Option<&str> {
        self.entries
            .get(path)
            .filter(|entry| entry.matches(modified) && !entry.is_expired(self.max_age))
            .map(|entry| entry.preview.as_str())
    }

    fn insert(&mut self, path: String, modified: SystemTime, preview: String) {
        self.entries.insert(path, CacheEntry::new(preview, modified));
    }

    fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.remove(path).map(|entry| entry.preview)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn invalidate_expired(&mut self) {
        let max_age = self.max_age;
        self.entries.retain(|_, entry| !entry.is_expired(max_age));
    }
}

/// Previews held for the lifetime of one resolver
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<String, (SystemTime, String)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreviewCache for MemoryCache {
    fn load(&mut self) -> Result<()> {
        // Memory cache doesn't persist, so loading is a no-op
        Ok(())
    }

    fn save(&self) -> Result<()> {
        Ok(())
    }

    fn get(&self, path: &str, modified: SystemTime) -> Option<&str> {
        self.entries
            .get(path)
            .filter(|(cached_modified, _)| *cached_modified == modified)
            .map(|(_, preview)| preview.as_str())
    }

    fn insert(&mut self, path: String, modified: SystemTime, preview: String) {
        self.entries.insert(path, (modified, preview));
    }

    fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.remove(path).map(|(_, preview)| preview)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn invalidate_expired(&mut self) {}
}

pub fn cache_path() -> PathBuf {
    if let Ok(override_path) = env::var(CACHE_PATH_ENV) {
        return PathBuf::from(override_path);
    }

    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("fileinfo")
        .join("previews.json")
}

pub fn clear_cache() -> Result<()> {
    let cache_path = cache_path();
    match fs::remove_file(&cache_path) {
        Ok(()) => info!("Cache cleared"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => info!("No cache to clear"),
        Err(e) => return Err(e).context("Failed to remove cache file"),
    }
    Ok(())
}
