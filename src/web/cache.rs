// src/web/cache.rs
//! Resume cache keyed on the source file's modification time

use crate::types::{Resume, SourceFormat};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::{debug, info};

struct CacheEntry {
    resume: Arc<Resume>,
    modified: SystemTime,
}

/// One slot holding the last successfully loaded resume.
///
/// The stat, reload and replace steps run under a single lock, so concurrent
/// requests in a stale window reload once.
pub struct ResumeCache {
    path: PathBuf,
    slot: Mutex<Option<CacheEntry>>,
    disk_reads: AtomicUsize,
}

impl ResumeCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(None),
            disk_reads: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached resume, reloaded when the file changed since the last load
    pub async fn get(&self) -> Result<Arc<Resume>> {
        self.load(false).await
    }

    /// Bypass the cache and reload from disk
    pub async fn reload(&self) -> Result<Arc<Resume>> {
        self.load(true).await
    }

    /// Number of times the source file has been read
    pub fn disk_reads(&self) -> usize {
        self.disk_reads.load(Ordering::Relaxed)
    }

    async fn load(&self, force: bool) -> Result<Arc<Resume>> {
        let mut slot = self.slot.lock().await;

        let modified = tokio::fs::metadata(&self.path)
            .await
            .and_then(|meta| meta.modified())
            .with_context(|| format!("Failed to stat resume file: {}", self.path.display()))?;

        if let Some(entry) = slot.as_ref() {
            if !force && modified <= entry.modified {
                debug!("Resume cache hit");
                return Ok(Arc::clone(&entry.resume));
            }
        }

        info!("Loading resume from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read resume file: {}", self.path.display()))?;
        self.disk_reads.fetch_add(1, Ordering::Relaxed);

        let resume = Resume::parse(&content, SourceFormat::from_path(&self.path))
            .with_context(|| format!("Failed to parse resume file: {}", self.path.display()))?;

        let resume = Arc::new(resume);
        *slot = Some(CacheEntry {
            resume: Arc::clone(&resume),
            modified,
        });
        Ok(resume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resume::fixtures::SAMPLE_YAML;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_resume(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("resume.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[tokio::test]
    async fn test_second_read_is_a_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResumeCache::new(write_resume(&dir, SAMPLE_YAML));

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.disk_reads(), 1);
    }

    #[tokio::test]
    async fn test_advanced_mtime_triggers_one_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_resume(&dir, SAMPLE_YAML);
        let base = SystemTime::now() - Duration::from_secs(60);
        set_mtime(&path, base);

        let cache = ResumeCache::new(&path);
        assert_eq!(cache.get().await.unwrap().contact.name, "Test User");

        std::fs::write(&path, SAMPLE_YAML.replace("Test User", "Renamed User")).unwrap();
        set_mtime(&path, base + Duration::from_secs(30));

        assert_eq!(cache.get().await.unwrap().contact.name, "Renamed User");
        assert_eq!(cache.get().await.unwrap().contact.name, "Renamed User");
        assert_eq!(cache.disk_reads(), 2);
    }

    #[tokio::test]
    async fn test_unchanged_mtime_keeps_cached_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_resume(&dir, SAMPLE_YAML);
        let base = SystemTime::now() - Duration::from_secs(60);
        set_mtime(&path, base);

        let cache = ResumeCache::new(&path);
        cache.get().await.unwrap();

        std::fs::write(&path, SAMPLE_YAML.replace("Test User", "Sneaky Edit")).unwrap();
        set_mtime(&path, base);

        assert_eq!(cache.get().await.unwrap().contact.name, "Test User");
        assert_eq!(cache.disk_reads(), 1);
    }

    #[tokio::test]
    async fn test_forced_reload_always_reads() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResumeCache::new(write_resume(&dir, SAMPLE_YAML));

        cache.get().await.unwrap();
        cache.reload().await.unwrap();
        cache.reload().await.unwrap();
        assert_eq!(cache.disk_reads(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(ResumeCache::new(write_resume(&dir, SAMPLE_YAML)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get().await.map(|r| r.contact.name.clone()) })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "Test User");
        }
        assert_eq!(cache.disk_reads(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error_and_keeps_serving_after_fix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.yaml");
        let cache = ResumeCache::new(&path);

        let err = cache.get().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to stat resume file"));

        std::fs::write(&path, SAMPLE_YAML).unwrap();
        assert_eq!(cache.get().await.unwrap().contact.name, "Test User");
    }
}
