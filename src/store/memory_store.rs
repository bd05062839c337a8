use crate::store::image_store::{ImageStore, StoreError, newest_first};
use crate::utils::types::{ImageId, ImageRecord};
use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

/// Process-local store, contents are lost on restart
pub struct MemoryImageStore {
    records: RwLock<IndexMap<ImageId, ImageRecord>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        MemoryImageStore {
            records: RwLock::new(IndexMap::new()),
        }
    }
}

impl Default for MemoryImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn insert(&self, record: ImageRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: &ImageId) -> Result<Option<ImageRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list_by_gallery(&self, gallery: &str) -> Result<Vec<ImageRecord>, StoreError> {
        let mut matched: Vec<ImageRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.gallery == gallery)
            .cloned()
            .collect();
        matched.sort_by(newest_first);
        Ok(matched)
    }

    async fn remove(&self, id: &ImageId) -> Result<bool, StoreError> {
        Ok(self.records.write().await.shift_remove(id).is_some())
    }
}
