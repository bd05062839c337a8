use crate::utils::types::{ImageId, ImageRecord};
use async_trait::async_trait;
use std::cmp::Ordering;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage engine error: {0}")]
    Engine(#[from] fjall::Error),
    #[error("record encoding error: {0}")]
    Encoding(#[from] postcard::Error),
    #[error("corrupted gallery index entry")]
    CorruptIndex,
    #[error("blocking store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Collection of image records
///
/// Implementations own durability; callers never coordinate writes themselves.
#[async_trait]
pub trait ImageStore {
    async fn insert(&self, record: ImageRecord) -> Result<(), StoreError>;

    async fn get(&self, id: &ImageId) -> Result<Option<ImageRecord>, StoreError>;

    /// Every record tagged with `gallery`, newest upload first
    async fn list_by_gallery(&self, gallery: &str) -> Result<Vec<ImageRecord>, StoreError>;

    /// Delete if present. Returns whether this call removed the record,
    /// so of two racing removals only one observes `true`
    async fn remove(&self, id: &ImageId) -> Result<bool, StoreError>;
}

/// Listing order shared by all implementations
pub fn newest_first(a: &ImageRecord, b: &ImageRecord) -> Ordering {
    b.upload_date
        .cmp(&a.upload_date)
        .then_with(|| a.id.cmp(&b.id))
}
