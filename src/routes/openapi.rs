use aide::openapi::OpenApi;
use axum::Extension;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use log::error;
use std::sync::Arc;

pub async fn openapi_json(Extension(openapi): Extension<Arc<OpenApi>>) -> axum::response::Response {
    match serde_json::to_vec(openapi.as_ref()) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => {
            error!("Failed to serialize OpenAPI document: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
