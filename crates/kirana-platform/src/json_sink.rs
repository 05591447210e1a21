use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use kirana_core::{DraftSink, DraftSnapshot, SavedDraft};
use tracing::info;

/// Writes draft snapshots as pretty-printed JSON files into one directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl DraftSink for JsonFileSink {
    async fn save(&self, snapshot: &DraftSnapshot) -> Result<SavedDraft> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.dir.join(snapshot.file_name());
        let body = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!("saved draft {} ({} bytes)", path.display(), body.len());
        Ok(SavedDraft {
            location: path.display().to_string(),
            bytes_written: body.len(),
        })
    }
}
