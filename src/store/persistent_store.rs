use crate::store::image_store::{ImageStore, StoreError, newest_first};
use crate::utils::background::BackgroundService;
use crate::utils::types::{ImageId, ImageRecord};
use async_trait::async_trait;
use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};
use log::{debug, warn};
use postcard::to_stdvec;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use strum::{Display, EnumString};
use tokio::sync::Mutex;
use tokio::sync::watch::Receiver;
use tokio::task::spawn_blocking;
use uuid::Uuid;

#[derive(Debug, EnumString, Display)]
pub enum PersistSpace {
    Images,
    GalleryIndex,
}

const IMAGES_KEYSPACE: &str = "images";
const GALLERY_INDEX_KEYSPACE: &str = "gallery_index";

const UUID_LEN: usize = 16;

/// Prefix shared by all index entries of one gallery
///
/// postcard writes the length before the label bytes, so "rot" never prefix-matches "rotary"
fn gallery_prefix(gallery: &str) -> Result<Vec<u8>, StoreError> {
    Ok(to_stdvec(gallery)?)
}

/// `{gallery prefix}{upload micros, big endian}{id bytes}`
fn index_key(record: &ImageRecord) -> Result<Vec<u8>, StoreError> {
    let mut key = gallery_prefix(&record.gallery)?;
    key.extend_from_slice(&(record.upload_date.timestamp_micros() as u64).to_be_bytes());
    key.extend_from_slice(record.id.as_bytes());
    Ok(key)
}

fn id_from_index_key(key: &[u8]) -> Result<ImageId, StoreError> {
    if key.len() < UUID_LEN {
        return Err(StoreError::CorruptIndex);
    }
    Uuid::from_slice(&key[key.len() - UUID_LEN..]).map_err(|_| StoreError::CorruptIndex)
}

/// Records persisted on disk in fjall keyspaces
pub struct PersistentImageStore {
    db: fjall::Database,
    images_keyspace: Keyspace,
    gallery_index_keyspace: Keyspace,
    /// Serialises writers, so the lookup inside `remove` and the delete itself
    /// cannot interleave with another insert or remove
    write_lock: Mutex<()>,
}

impl PersistentImageStore {
    pub fn open(db_path: &Path, cache_size_mb: u64) -> Result<Self, StoreError> {
        let db = fjall::Database::builder(db_path)
            .cache_size(cache_size_mb * 1024 * 1024)
            .open()?;

        let images_keyspace = db.keyspace(IMAGES_KEYSPACE, KeyspaceCreateOptions::default)?;
        let gallery_index_keyspace =
            db.keyspace(GALLERY_INDEX_KEYSPACE, KeyspaceCreateOptions::default)?;

        Ok(PersistentImageStore {
            db,
            images_keyspace,
            gallery_index_keyspace,
            write_lock: Mutex::new(()),
        })
    }

    fn keyspace(&self, space: PersistSpace) -> Keyspace {
        match space {
            PersistSpace::Images => self.images_keyspace.clone(),
            PersistSpace::GalleryIndex => self.gallery_index_keyspace.clone(),
        }
    }

    /// Flush journal to disk
    pub fn persist(&self) -> Result<(), StoreError> {
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn read_record(images: &Keyspace, id: &ImageId) -> Result<Option<ImageRecord>, StoreError> {
        match images.get(id.as_bytes())? {
            None => Ok(None),
            Some(value) => Ok(Some(postcard::from_bytes::<ImageRecord>(&value)?)),
        }
    }
}

#[async_trait]
impl ImageStore for PersistentImageStore {
    async fn insert(&self, record: ImageRecord) -> Result<(), StoreError> {
        let images = self.keyspace(PersistSpace::Images);
        let index = self.keyspace(PersistSpace::GalleryIndex);
        let key = index_key(&record)?;
        let value = to_stdvec(&record)?;
        let id = record.id;

        let _guard = self.write_lock.lock().await;
        // index first: a dangling index entry is skipped on listing, an unindexed record would be lost
        spawn_blocking(move || -> Result<(), StoreError> {
            index.insert(key, Vec::new())?;
            images.insert(id.as_bytes().to_vec(), value)?;
            Ok(())
        })
        .await?
    }

    async fn get(&self, id: &ImageId) -> Result<Option<ImageRecord>, StoreError> {
        let images = self.keyspace(PersistSpace::Images);
        let id = *id;

        spawn_blocking(move || Self::read_record(&images, &id)).await?
    }

    async fn list_by_gallery(&self, gallery: &str) -> Result<Vec<ImageRecord>, StoreError> {
        let images = self.keyspace(PersistSpace::Images);
        let index = self.keyspace(PersistSpace::GalleryIndex);
        let prefix = gallery_prefix(gallery)?;

        let mut records = spawn_blocking(move || -> Result<Vec<ImageRecord>, StoreError> {
            let mut records = Vec::new();
            for item in index.prefix(&prefix) {
                let key = item.key()?;
                let id = id_from_index_key(&key)?;
                match Self::read_record(&images, &id)? {
                    Some(record) => records.push(record),
                    None => debug!("Skipping dangling index entry for image {}", id),
                }
            }
            Ok(records)
        })
        .await??;

        records.sort_by(newest_first);
        Ok(records)
    }

    async fn remove(&self, id: &ImageId) -> Result<bool, StoreError> {
        let images = self.keyspace(PersistSpace::Images);
        let index = self.keyspace(PersistSpace::GalleryIndex);
        let id = *id;

        let _guard = self.write_lock.lock().await;
        spawn_blocking(move || -> Result<bool, StoreError> {
            let record = match Self::read_record(&images, &id)? {
                None => return Ok(false),
                Some(record) => record,
            };
            images.remove(id.as_bytes().to_vec())?;
            index.remove(index_key(&record)?)?;
            Ok(true)
        })
        .await?
    }
}

/// Periodically flushes the store to disk, and once more on shutdown
pub struct StorageBackgroundAdapter {
    store: Arc<PersistentImageStore>,
    cancel_chan: (
        tokio::sync::watch::Sender<bool>,
        tokio::sync::watch::Receiver<bool>,
    ),
}

impl StorageBackgroundAdapter {
    pub fn new(store: Arc<PersistentImageStore>) -> Self {
        StorageBackgroundAdapter {
            store,
            cancel_chan: tokio::sync::watch::channel(false),
        }
    }

    async fn flush(&self) {
        debug!("Flushing images to disk");
        let store = self.store.clone();
        let result = spawn_blocking(move || store.persist()).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("Failed to flush data to disk, got error: {}", err),
            Err(err) => warn!("Flush task failed: {}", err),
        }
    }
}

#[async_trait]
impl BackgroundService for StorageBackgroundAdapter {
    fn background_period(&self) -> Duration {
        Duration::new(60, 0)
    }

    async fn background(&mut self) {
        self.flush().await;
    }

    fn cancel_token(&self) -> Receiver<bool> {
        self.cancel_chan.1.clone()
    }

    async fn stop(&mut self) {
        let _ = self.cancel_chan.0.send(true);
        self.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn record(gallery: &str, age_secs: i64) -> ImageRecord {
        ImageRecord {
            id: Uuid::new_v4(),
            filename: "a.png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
            content_type: "image/png".to_string(),
            gallery: gallery.to_string(),
            upload_date: Utc::now() - ChronoDuration::seconds(age_secs),
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> PersistentImageStore {
        PersistentImageStore::open(dir.path(), 8).unwrap()
    }

    #[tokio::test]
    async fn insert_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let rec = record("rotary", 0);

        store.insert(rec.clone()).await.unwrap();
        assert_eq!(store.get(&rec.id).await.unwrap(), Some(rec));
        assert_eq!(store.get(&Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn gallery_prefix_does_not_leak_into_longer_labels() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let short = record("rot", 0);
        let long = record("rotary", 0);
        store.insert(short.clone()).await.unwrap();
        store.insert(long.clone()).await.unwrap();

        assert_eq!(store.list_by_gallery("rot").await.unwrap(), vec![short]);
        assert_eq!(store.list_by_gallery("rotary").await.unwrap(), vec![long]);
        assert!(store.list_by_gallery("ro").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let oldest = record("rotary", 300);
        let middle = record("rotary", 200);
        let newest = record("rotary", 100);
        for rec in [&middle, &newest, &oldest] {
            store.insert(rec.clone()).await.unwrap();
        }

        let listed = store.list_by_gallery("rotary").await.unwrap();
        assert_eq!(listed, vec![newest, middle, oldest]);
    }

    #[tokio::test]
    async fn remove_reports_presence_and_clears_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let rec = record("rotary", 0);
        store.insert(rec.clone()).await.unwrap();

        assert!(store.remove(&rec.id).await.unwrap());
        assert!(!store.remove(&rec.id).await.unwrap());
        assert!(store.get(&rec.id).await.unwrap().is_none());
        assert!(store.list_by_gallery("rotary").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_remove_succeeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open_store(&dir));
        let rec = record("rotary", 0);
        store.insert(rec.clone()).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let id = rec.id;
                tokio::spawn(async move { store.remove(&id).await.unwrap() })
            })
            .collect();

        let mut removed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                removed += 1;
            }
        }
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let kept = record("rotary", 10);
        let removed = record("rotary", 0);
        {
            let store = open_store(&dir);
            store.insert(kept.clone()).await.unwrap();
            store.insert(removed.clone()).await.unwrap();
            store.insert(record("lions", 0)).await.unwrap();
            assert!(store.remove(&removed.id).await.unwrap());
            store.persist().unwrap();
        }

        let store = open_store(&dir);
        assert_eq!(store.get(&kept.id).await.unwrap(), Some(kept.clone()));
        assert_eq!(store.get(&removed.id).await.unwrap(), None);
        assert_eq!(store.list_by_gallery("rotary").await.unwrap(), vec![kept]);
        assert_eq!(store.list_by_gallery("lions").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn flush_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open_store(&dir));
        store.insert(record("rotary", 0)).await.unwrap();
        store.persist().unwrap();

        let mut adapter = StorageBackgroundAdapter::new(store);
        adapter.stop().await;
        assert!(*adapter.cancel_token().borrow());
    }
}
