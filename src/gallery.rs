use crate::store::image_store::{ImageStore, StoreError};
use crate::utils::types::{ImageId, ImageRecord, NewImage};
use chrono::Utc;
use log::{debug, error, info};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryErrorType {
    Validation,
    NotFound,
    MalformedId,
    PayloadTooLarge,
    Storage,
}

impl GalleryErrorType {
    pub fn default_detail(&self) -> String {
        match &self {
            GalleryErrorType::Validation => "Invalid upload".to_string(),
            GalleryErrorType::NotFound => "Image not found".to_string(),
            GalleryErrorType::MalformedId => "Malformed image id".to_string(),
            GalleryErrorType::PayloadTooLarge => "Uploaded file is too large".to_string(),
            GalleryErrorType::Storage => "Internal storage error".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct GalleryError {
    pub err_type: GalleryErrorType,
    pub detail: String,
}

impl GalleryError {
    pub fn new(err_type: GalleryErrorType, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or(err_type.default_detail());
        GalleryError { err_type, detail }
    }
}

impl From<StoreError> for GalleryError {
    // Storage internals are logged here and never reach the client
    fn from(err: StoreError) -> Self {
        error!("Store operation failed: {}", err);
        GalleryError::new(GalleryErrorType::Storage, None)
    }
}

/// Image gallery operations over an injected record store
#[derive(Clone)]
pub struct Gallery {
    store: Arc<dyn ImageStore + Send + Sync>,
}

impl Gallery {
    pub fn new(store: Arc<dyn ImageStore + Send + Sync>) -> Self {
        Gallery { store }
    }

    /// Parse client supplied identifier, without touching the store
    pub fn parse_id(raw: &str) -> Result<ImageId, GalleryError> {
        Uuid::parse_str(raw.trim()).map_err(|_| {
            GalleryError::new(
                GalleryErrorType::MalformedId,
                Some(format!("Malformed image id: {}", raw)),
            )
        })
    }

    /// Assign id and upload date, then persist the record
    #[instrument(skip(self, image), fields(gallery = %image.gallery, size = image.data.len()))]
    pub async fn upload(&self, image: NewImage) -> Result<ImageRecord, GalleryError> {
        let record = image.into_record(Uuid::new_v4(), Utc::now());
        self.store.insert(record.clone()).await?;
        info!("Stored image {} in gallery {}", record.id, record.gallery);
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, gallery: &str) -> Result<Vec<ImageRecord>, GalleryError> {
        let records = self.store.list_by_gallery(gallery).await?;
        debug!("Gallery {} holds {} images", gallery, records.len());
        Ok(records)
    }

    #[instrument(skip(self), fields(image_id = %id))]
    pub async fn fetch(&self, id: ImageId) -> Result<ImageRecord, GalleryError> {
        match self.store.get(&id).await? {
            Some(record) => Ok(record),
            None => {
                debug!("Image {} not found", id);
                Err(GalleryError::new(GalleryErrorType::NotFound, None))
            }
        }
    }

    /// Delete record; reports NotFound when nothing was removed
    #[instrument(skip(self), fields(image_id = %id))]
    pub async fn delete(&self, id: ImageId) -> Result<(), GalleryError> {
        if self.store.remove(&id).await? {
            info!("Deleted image {}", id);
            Ok(())
        } else {
            Err(GalleryError::new(GalleryErrorType::NotFound, None))
        }
    }
}
