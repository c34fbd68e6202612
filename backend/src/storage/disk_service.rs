use actix_files::NamedFile;
use shared::ImageExtension;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Clone, Debug)]
pub struct DiskStorage {
    upload_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),
    #[error("Unusable file name: {0:?}")]
    InvalidName(String),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiskStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn is_allowed(file_name: &str) -> bool {
        ImageExtension::from_filename(file_name).is_some()
    }

    /// Reduces a client-supplied name to `[A-Za-z0-9_.-]` with no leading or
    /// trailing dots and underscores, so it can never leave the upload dir.
    pub fn sanitize_filename(file_name: &str) -> String {
        let spaced: String = file_name
            .chars()
            .filter(char::is_ascii)
            .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
            .collect();
        let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
        let cleaned: String = joined
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
            .collect();
        let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

        let stem = trimmed.split('.').next().unwrap_or_default().to_ascii_uppercase();
        if WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
            format!("_{}", trimmed)
        } else {
            trimmed.to_string()
        }
    }

    /// Writes `data` under the sanitized form of `file_name`, replacing any
    /// file already stored under that name.
    pub async fn store(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let sanitized = Self::sanitize_filename(file_name);
        if sanitized.is_empty() {
            return Err(StorageError::InvalidName(file_name.to_string()));
        }
        if !Self::is_allowed(&sanitized) {
            return Err(StorageError::InvalidFileType(sanitized));
        }

        fs::create_dir_all(&self.upload_dir).await?;
        let path = self.upload_dir.join(&sanitized);
        fs::write(&path, data).await?;

        log::info!("Stored upload {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    pub async fn retrieve(&self, name: &str) -> Result<NamedFile, StorageError> {
        // Anything not already in sanitized form was never written by `store`.
        if name.is_empty() || Self::sanitize_filename(name) != name {
            return Err(StorageError::NotFound(name.to_string()));
        }

        NamedFile::open_async(self.upload_dir.join(name))
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
                _ => StorageError::Io(e),
            })
    }
}
