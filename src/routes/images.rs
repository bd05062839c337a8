use crate::config::Config;
use crate::gallery::Gallery;
use crate::routes::errors::{SuccessEnvelope, UploadEnvelope};
use crate::routes::responses::{ApiError, ImageRecordView, ImageResponse};
use crate::routes::upload_form::UploadForm;
use crate::utils::content_disposition::ContentDisposition;
use crate::utils::types::FALLBACK_CONTENT_TYPE;
use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Response, header};
use log::{debug, info};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use std::time::SystemTime;

/// The list and delete routes share `/api/images/{key}`, so the segment has one name
#[derive(Deserialize, JsonSchema)]
pub struct GalleryPath {
    /// Gallery label
    #[serde(rename = "key")]
    pub gallery: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct ImageIdPath {
    /// Image identifier
    #[serde(rename = "key")]
    pub id: String,
}

/// Store uploaded image under a gallery label
pub async fn upload_image(
    State(state): State<Arc<Config>>,
    UploadForm(image): UploadForm,
) -> Result<Json<UploadEnvelope>, ApiError> {
    info!(
        "Uploading {} ({} bytes) into gallery {}",
        image.filename,
        image.data.len(),
        image.gallery
    );
    let record = state.gallery.upload(image).await?;
    Ok(Json(UploadEnvelope::ok(record.into())))
}

/// All images of a gallery, newest first
///
/// Unknown galleries are just empty
pub async fn list_gallery(
    Path(path): Path<GalleryPath>,
    State(state): State<Arc<Config>>,
) -> Result<Json<Vec<ImageRecordView>>, ApiError> {
    let records = state.gallery.list(&path.gallery).await?;
    Ok(Json(records.into_iter().map(ImageRecordView::from).collect()))
}

/// Serve raw image bytes with the content type given on upload
pub async fn serve_image(
    Path(path): Path<ImageIdPath>,
    State(state): State<Arc<Config>>,
) -> Result<ImageResponse, ApiError> {
    let id = Gallery::parse_id(&path.id)?;
    let record = state.gallery.fetch(id).await?;
    debug!("Serving image {} as {}", record.id, record.content_type);

    let content_type = HeaderValue::from_str(&record.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&ContentDisposition::inline(&record.filename)).ok();
    let cache_control =
        HeaderValue::from_str(&format!("public, max-age={}", state.client_cache_ttl)).ok();
    let last_modified =
        HeaderValue::from_str(&httpdate::fmt_http_date(SystemTime::from(record.upload_date))).ok();

    let mut response = Response::new(Body::from(record.data));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    if let Some(value) = disposition {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(value) = cache_control {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Some(value) = last_modified {
        headers.insert(header::LAST_MODIFIED, value);
    }

    Ok(ImageResponse(response))
}

/// Delete image by identifier
pub async fn delete_image(
    Path(path): Path<ImageIdPath>,
    State(state): State<Arc<Config>>,
) -> Result<Json<SuccessEnvelope>, ApiError> {
    let id = Gallery::parse_id(&path.id)?;
    state.gallery.delete(id).await?;
    Ok(Json(SuccessEnvelope::ok()))
}
