#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use gallery_serve::config::{Config, EnvConfig};
use gallery_serve::routes;
use envconfig::Envconfig;
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "gallery-test-boundary";

/// Signature bytes of a png, enough for a stored payload
pub const PNG_BYTES: [u8; 12] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d,
];

pub enum Part<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        filename: &'a str,
        content_type: Option<&'a str>,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                if let Some(content_type) = content_type {
                    body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub struct TestSetup {
    pub router: Router,
    // Keep the store directory alive for the duration of the test
    _dir: Option<tempfile::TempDir>,
}

impl TestSetup {
    pub fn in_memory() -> Self {
        Self::with_env(&[])
    }

    pub fn with_env(overrides: &[(&str, &str)]) -> Self {
        let mut env = HashMap::from([(
            "STORAGE_IMPLEMENTATION".to_string(),
            "InMemory".to_string(),
        )]);
        for (key, value) in overrides {
            env.insert(key.to_string(), value.to_string());
        }
        Self::build(env, None)
    }

    pub fn persistent() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = HashMap::from([
            ("STORAGE_IMPLEMENTATION".to_string(), "Persistent".to_string()),
            (
                "PERSISTENT_STORAGE_DIR".to_string(),
                dir.path().to_string_lossy().to_string(),
            ),
            ("STORAGE_CACHE_SIZE_MB".to_string(), "4".to_string()),
        ]);
        Self::build(env, Some(dir))
    }

    fn build(env: HashMap<String, String>, dir: Option<tempfile::TempDir>) -> Self {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();

        let env = EnvConfig::init_from_hashmap(&env).expect("valid test env");
        let config = Arc::new(Config::from_env_config(env).expect("config"));
        Self {
            router: routes::router(config),
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn upload(&self, parts: &[Part<'_>]) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .expect("request");
        self.send(request).await
    }

    /// Upload a png and return the assigned id
    pub async fn upload_png(&self, gallery: &str) -> String {
        let response = self
            .upload(&[
                Part::File {
                    name: "image",
                    filename: "a.png",
                    content_type: Some("image/png"),
                    data: &PNG_BYTES,
                },
                Part::Text {
                    name: "gallery",
                    value: gallery,
                },
            ])
            .await;
        assert_eq!(response.status(), 200);
        let json = body_json(response).await;
        json["image"]["id"].as_str().expect("image id").to_string()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        self.send(request).await
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
