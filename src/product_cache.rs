//! Barcode-keyed cache of scored products

use crate::error::{ApexError, ApexResult};
use crate::types::ProductRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "product:";

/// Storage seam for previously scored products
#[async_trait]
pub trait ProductCache: Send + Sync {
    async fn get(&self, barcode: &str) -> ApexResult<Option<ProductRecord>>;
    async fn put(&self, record: ProductRecord) -> ApexResult<()>;
}

/// In-memory cache, optionally mirrored to a cacache directory on every write.
///
/// cacache writes each entry to a temp file and moves it into place, so a
/// crash mid-write leaves the previous entries readable.
#[derive(Debug, Default)]
pub struct FileProductCache {
    records: RwLock<HashMap<String, ProductRecord>>,
    cache_dir: Option<PathBuf>,
}

fn cache_key(barcode: &str) -> String {
    format!("{}{}", KEY_PREFIX, barcode)
}

/// Read every product entry from a cacache directory, skipping unreadable ones
fn load_entries(cache_dir: &Path) -> ApexResult<HashMap<String, ProductRecord>> {
    let mut records = HashMap::new();

    if !cache_dir.exists() {
        return Ok(records);
    }
    if !cache_dir.is_dir() {
        return Err(ApexError::Cache(format!(
            "{} is not a directory",
            cache_dir.display()
        )));
    }

    for entry in cacache::list_sync(cache_dir) {
        let metadata = match entry {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping unreadable cache index entry: {}", e);
                continue;
            }
        };
        if !metadata.key.starts_with(KEY_PREFIX) {
            continue;
        }

        let record = cacache::read_sync(cache_dir, &metadata.key)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                serde_json::from_slice::<ProductRecord>(&bytes).map_err(|e| e.to_string())
            });
        match record {
            Ok(record) => {
                records.insert(record.barcode.clone(), record);
            }
            Err(e) => warn!("Skipping cache entry {}: {}", metadata.key, e),
        }
    }

    Ok(records)
}

impl FileProductCache {
    /// Memory-only cache
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache backed by the cacache directory `cache_dir`. A missing directory starts empty.
    pub async fn open(cache_dir: impl AsRef<Path>) -> ApexResult<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();

        let dir = cache_dir.clone();
        let records = tokio::task::spawn_blocking(move || load_entries(&dir))
            .await
            .map_err(|e| ApexError::Cache(format!("cache load task failed: {}", e)))??;

        info!(
            "Opened product cache {} ({} records)",
            cache_dir.display(),
            records.len()
        );

        Ok(Self {
            records: RwLock::new(records),
            cache_dir: Some(cache_dir),
        })
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn persist(&self, record: &ProductRecord) -> ApexResult<()> {
        let Some(cache_dir) = &self.cache_dir else {
            return Ok(());
        };

        let dir = cache_dir.clone();
        let key = cache_key(&record.barcode);
        let bytes = serde_json::to_vec(record)?;

        tokio::task::spawn_blocking(move || cacache::write_sync(&dir, &key, &bytes))
            .await
            .map_err(|e| ApexError::Cache(format!("cache write task failed: {}", e)))?
            .map_err(|e| {
                ApexError::Cache(format!("cannot write to {}: {}", cache_dir.display(), e))
            })?;

        debug!("Persisted {} to {}", record.barcode, cache_dir.display());
        Ok(())
    }
}

#[async_trait]
impl ProductCache for FileProductCache {
    async fn get(&self, barcode: &str) -> ApexResult<Option<ProductRecord>> {
        Ok(self.records.read().await.get(barcode).cloned())
    }

    async fn put(&self, record: ProductRecord) -> ApexResult<()> {
        let mut records = self.records.write().await;
        self.persist(&record).await?;
        records.insert(record.barcode.clone(), record);
        Ok(())
    }
}
