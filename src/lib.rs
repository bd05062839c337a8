pub mod config;
pub mod gallery;
pub mod openapi;
pub mod routes;
pub mod store;
pub mod utils;
