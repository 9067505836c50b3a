pub mod export_service;
pub mod profile_storage;
pub mod user_service;

pub use profile_storage::{ProfileStorage, ProfileUpload};
