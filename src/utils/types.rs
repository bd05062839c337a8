use crate::gallery::{GalleryError, GalleryErrorType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned identifier of an image record
pub type ImageId = Uuid;

/// Content type used when the client did not send one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Single stored image with its payload kept inline
///
/// Records are immutable once inserted, the only way to change one is to delete it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub filename: String,
    pub data: Vec<u8>,
    pub content_type: String,
    pub gallery: String,
    pub upload_date: DateTime<Utc>,
}

/// Validated upload, waiting for an id and upload date
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewImage {
    pub filename: String,
    pub data: Vec<u8>,
    pub content_type: String,
    pub gallery: String,
}

impl NewImage {
    /// Build an upload from raw form parts, rejecting anything the store should never see
    pub fn new(
        filename: Option<String>,
        data: Option<Vec<u8>>,
        content_type: Option<String>,
        gallery: Option<String>,
    ) -> Result<Self, GalleryError> {
        let data = match data {
            Some(data) if !data.is_empty() => data,
            Some(_) => {
                return Err(GalleryError::new(
                    GalleryErrorType::Validation,
                    Some("Uploaded file is empty".to_string()),
                ));
            }
            None => {
                return Err(GalleryError::new(
                    GalleryErrorType::Validation,
                    Some("Missing image file".to_string()),
                ));
            }
        };

        // kept as sent, the list route looks it up verbatim
        let gallery = gallery.unwrap_or_default();
        if gallery.trim().is_empty() {
            return Err(GalleryError::new(
                GalleryErrorType::Validation,
                Some("Missing gallery name".to_string()),
            ));
        }

        let filename = filename
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "image".to_string());

        let content_type = content_type
            .map(|ct| ct.trim().to_string())
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        Ok(NewImage {
            filename,
            data,
            content_type,
            gallery,
        })
    }

    pub fn into_record(self, id: ImageId, upload_date: DateTime<Utc>) -> ImageRecord {
        ImageRecord {
            id,
            filename: self.filename,
            data: self.data,
            content_type: self.content_type,
            gallery: self.gallery,
            upload_date,
        }
    }
}
