pub mod background;
pub mod content_disposition;
pub mod types;
