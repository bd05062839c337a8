pub mod image_store;
pub mod memory_store;
pub mod persistent_store;
