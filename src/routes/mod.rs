pub mod errors;
pub mod images;
pub mod openapi;
pub mod responses;
pub mod upload_form;

use crate::config::Config;
use aide::axum::ApiRouter;
use aide::axum::routing::{get_with, post_with};
use aide::openapi::{Info, OpenApi};
use aide::swagger::Swagger;
use axum::extract::DefaultBodyLimit;
use axum::middleware::map_response;
use axum::http::{Method, header};
use axum::routing::get;
use axum::{Extension, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Full HTTP application over the configured gallery
pub fn router(config: Arc<Config>) -> Router {
    let mut api = OpenApi {
        info: Info {
            title: "gallery-serve".to_string(),
            description: Some("Upload, list, serve and delete gallery images".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    let mut app: ApiRouter<Arc<Config>> = ApiRouter::new()
        .api_route(
            "/api/upload",
            post_with(images::upload_image, |op| {
                op.description("Upload one image into a gallery")
            }),
        )
        .api_route(
            "/api/images/{key}",
            get_with(images::list_gallery, |op| {
                op.description("List images of the gallery given as `key`, newest first")
            })
            .delete_with(images::delete_image, |op| {
                op.description("Delete the image whose id is given as `key`")
            }),
        )
        .api_route(
            "/api/images/{key}/image",
            get_with(images::serve_image, |op| {
                op.description("Raw bytes of the image whose id is given as `key`")
            }),
        );

    if config.enable_docs {
        app = app
            .route("/openapi.json", get(openapi::openapi_json))
            .route("/docs", Swagger::new("/openapi.json").axum_route());
    }

    app.finish_api(&mut api)
        .layer(Extension(Arc::new(api)))
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(cors_layer())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
        .layer(map_response(responses::timeout_envelope))
        .layer(TraceLayer::new_for_http())
        .with_state(config)
}
