// ==================== PROFILE IMAGE STORAGE ====================
// Uploaded profile images are written to the upload directory and served
// statically under `url_prefix`.

use crate::utils::error::AppError;
use std::path::{Path, PathBuf};

/// An image received in the `profile` part of a form.
#[derive(Debug, Clone)]
pub struct ProfileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ProfileStorage {
    dir: PathBuf,
    url_prefix: String,
}

impl ProfileStorage {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Writes the image as `<unix-millis>-<name>` and returns its public path.
    pub async fn store(&self, upload: &ProfileUpload) -> Result<String, AppError> {
        let is_image = upload
            .content_type
            .as_deref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(AppError::Validation(
                "User validation failed: profile: only image uploads are accepted".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to create upload dir: {}", e)))?;

        let file_name = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_file_name(&upload.file_name)
        );

        tokio::fs::write(self.dir.join(&file_name), &upload.bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to write {}: {}", file_name, e)))?;

        log::info!("🖼️  Stored profile image {} ({} bytes)", file_name, upload.bytes.len());

        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    /// Deletes a previously stored image. Paths outside `url_prefix` are left
    /// alone; failures are only logged.
    pub async fn remove(&self, public_path: &str) {
        let Some(file_name) = public_path
            .strip_prefix(&self.url_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };

        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return;
        }

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => log::info!("🗑️  Removed profile image {}", file_name),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("⚠️  Failed to remove profile image {}: {}", file_name, e),
        }
    }
}

/// Keeps only the final path component and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`.
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
