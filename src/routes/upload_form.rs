use crate::gallery::{GalleryError, GalleryErrorType};
use crate::routes::responses::ApiError;
use crate::utils::types::NewImage;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use http::StatusCode;
use log::debug;

/// Multipart fields accepted as the image payload
pub const FILE_FIELDS: [&str; 2] = ["image", "file"];
pub const GALLERY_FIELD: &str = "gallery";

/// Validated `multipart/form-data` upload
pub struct UploadForm(pub NewImage);

fn multipart_error(status: StatusCode, body_text: String) -> GalleryError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        GalleryError::new(GalleryErrorType::PayloadTooLarge, None)
    } else {
        GalleryError::new(GalleryErrorType::Validation, Some(body_text))
    }
}

impl From<MultipartError> for GalleryError {
    fn from(err: MultipartError) -> Self {
        multipart_error(err.status(), err.body_text())
    }
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| multipart_error(rejection.status(), rejection.body_text()))?;

        let mut filename: Option<String> = None;
        let mut content_type: Option<String> = None;
        let mut data: Option<Vec<u8>> = None;
        let mut gallery: Option<String> = None;

        while let Some(field) = multipart.next_field().await.map_err(GalleryError::from)? {
            let name = field.name().unwrap_or("").to_string();
            if FILE_FIELDS.contains(&name.as_str()) {
                filename = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                data = Some(field.bytes().await.map_err(GalleryError::from)?.to_vec());
            } else if name == GALLERY_FIELD {
                gallery = Some(field.text().await.map_err(GalleryError::from)?);
            } else {
                debug!("Ignoring unknown upload field {:?}", name);
            }
        }

        Ok(UploadForm(NewImage::new(
            filename,
            data,
            content_type,
            gallery,
        )?))
    }
}
