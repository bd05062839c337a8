use crate::gallery::{GalleryError, GalleryErrorType};
use crate::routes::errors::FailureEnvelope;
use crate::utils::types::{ImageId, ImageRecord};
use aide::OperationOutput;
use aide::generate::GenContext;
use aide::openapi::{MediaType, Operation, Response as OpenApiResponse};
use axum::Json;
use axum::body::Body;
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use http::{Response, StatusCode};
use indexmap::IndexMap;
use log::{error, warn};
use schemars::JsonSchema;
use serde::Serialize;

/// Image record as exposed over JSON
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecordView {
    pub id: ImageId,
    pub filename: String,
    /// Standard base64 of the stored payload
    pub data: String,
    pub content_type: String,
    pub gallery: String,
    pub upload_date: DateTime<Utc>,
}

impl From<ImageRecord> for ImageRecordView {
    fn from(record: ImageRecord) -> Self {
        ImageRecordView {
            id: record.id,
            filename: record.filename,
            data: STANDARD.encode(&record.data),
            content_type: record.content_type,
            gallery: record.gallery,
            upload_date: record.upload_date,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<GalleryError> for ApiError {
    fn from(err: GalleryError) -> Self {
        let status = match err.err_type {
            GalleryErrorType::Validation | GalleryErrorType::MalformedId => StatusCode::BAD_REQUEST,
            GalleryErrorType::NotFound => StatusCode::NOT_FOUND,
            GalleryErrorType::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GalleryErrorType::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, err.detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self.status.as_u16() {
            400..=499 => warn!("Client error {}: {}", self.status, self.error),
            500..=599 => error!("Server error {}: {}", self.status, self.error),
            _ => {}
        }
        (self.status, Json(FailureEnvelope::new(self.error))).into_response()
    }
}

impl OperationOutput for ApiError {
    type Inner = FailureEnvelope;

    fn operation_response(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        Json::<FailureEnvelope>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        Vec::new()
    }
}

pub struct ImageResponse(pub Response<Body>);

impl IntoResponse for ImageResponse {
    fn into_response(self) -> axum::response::Response {
        self.0
    }
}

impl OperationOutput for ImageResponse {
    type Inner = ();

    fn operation_response(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        Some(OpenApiResponse {
            description: "Raw image bytes with the stored content type.".to_string(),
            content: IndexMap::from_iter([(
                "image/*".to_string(),
                MediaType {
                    schema: None,
                    ..Default::default()
                },
            )]),
            ..Default::default()
        })
    }

    fn inferred_responses(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        match Self::operation_response(ctx, operation) {
            Some(response) => vec![(Some(200), response)],
            None => Vec::new(),
        }
    }
}

pub fn api_error(status: StatusCode, error: String) -> ApiError {
    ApiError { status, error }
}

/// Wraps the empty 408 of the timeout layer into the failure envelope
///
/// Handlers never answer 408 themselves, so the status alone identifies a timeout
pub async fn timeout_envelope(response: axum::response::Response) -> axum::response::Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return api_error(StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
            .into_response();
    }
    response
}
