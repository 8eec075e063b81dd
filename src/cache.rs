use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, ViewError};
use crate::view::ComponentNode;

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub view: ComponentNode,
}

/// On-disk cache of compiled view trees, one JSON file per source page.
/// An entry is valid only while the label and markup hash to the same value.
pub struct IncrementalCache {
    cache_dir: PathBuf,
}

impl IncrementalCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).map_err(|e| ViewError::io(&cache_dir, e))?;
        Ok(Self { cache_dir })
    }

    pub fn compute_hash(label: &str, markup: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        hasher.update([0u8]);
        hasher.update(markup.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, source_path: &Path) -> PathBuf {
        let safe_name = source_path
            .to_string_lossy()
            .replace(['/', '\\', ':'], "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn get(&self, source_path: &Path, label: &str, markup: &str) -> Option<ComponentNode> {
        let entry_path = self.entry_path(source_path);
        let data = fs::read_to_string(&entry_path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %entry_path.display(), error = %e, "dropping corrupt cache entry");
                fs::remove_file(&entry_path).ok();
                return None;
            }
        };

        if entry.hash == Self::compute_hash(label, markup) {
            debug!(label = %label, "cache hit");
            Some(entry.view)
        } else {
            None
        }
    }

    pub fn set(&self, source_path: &Path, label: &str, markup: &str, view: &ComponentNode) -> Result<()> {
        let entry_path = self.entry_path(source_path);
        let entry = CacheEntry {
            hash: Self::compute_hash(label, markup),
            view: view.clone(),
        };
        let data = serde_json::to_string(&entry)?;
        fs::write(&entry_path, data).map_err(|e| ViewError::io(&entry_path, e))
    }
}
