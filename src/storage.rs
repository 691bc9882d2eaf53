//! Storage port for extracted images.
//!
//! Parsing and normalization never touch the filesystem directly for image
//! persistence; they go through [`ImageStore`] so the pipeline can be tested
//! (and deployed) without a durable shared filesystem.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::IngestResult;
use crate::ingestion::images::to_data_url;

/// Persists one image and returns the reference to record on the row.
pub trait ImageStore: Send + Sync {
    fn store(&self, original_name: &str, bytes: &[u8]) -> IngestResult<String>;
}

/// Keeps images inline as base64 `data:` URLs.
///
/// The default store: the image travels with the record through memory and the
/// database instead of via a path that may vanish.
#[derive(Debug, Default)]
pub struct InlineImageStore;

impl ImageStore for InlineImageStore {
    fn store(&self, original_name: &str, bytes: &[u8]) -> IngestResult<String> {
        Ok(to_data_url(original_name, bytes))
    }
}

/// Copies images into a directory under freshly generated unique names and
/// returns web paths rooted at `public_prefix`.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }
}

impl ImageStore for FsImageStore {
    fn store(&self, original_name: &str, bytes: &[u8]) -> IngestResult<String> {
        std::fs::create_dir_all(&self.root)?;
        let ext = Path::new(original_name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin");
        let name = format!("{}.{ext}", Uuid::new_v4());
        std::fs::write(self.root.join(&name), bytes)?;
        Ok(format!(
            "{}/{name}",
            self.public_prefix.trim_end_matches('/')
        ))
    }
}
