use async_trait::async_trait;

use crate::export::DraftSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDraft {
    pub location: String,
    pub bytes_written: usize,
}

#[async_trait]
pub trait DraftSink: Send + Sync {
    async fn save(&self, snapshot: &DraftSnapshot) -> anyhow::Result<SavedDraft>;
}
