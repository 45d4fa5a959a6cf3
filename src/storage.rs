//! # Attachment Storage
//!
//! Local-disk storage for uploaded attachment files. Stored names are derived
//! from the upload time and the sanitized client file name:
//! `<YYYYMMDDhhmmss>_<basename>`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::{fs, io::AsyncWriteExt};

use crate::error::RepositoryError;

/// `chrono` format for the stored-name prefix: compact, second resolution.
pub const STORED_NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Storage rooted at the configured upload directory
#[derive(Debug, Clone)]
pub struct AttachmentStorage {
    root: PathBuf,
}

impl AttachmentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the upload directory if it does not exist yet.
    pub async fn init(&self) -> Result<(), RepositoryError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Reduces a client-supplied file name to its final path component.
    ///
    /// Both `/` and `\` count as separators and the component is kept
    /// verbatim, whitespace included. Names that end up empty, that consist
    /// only of dots or that contain control characters are rejected.
    pub fn sanitize_filename(raw: &str) -> Result<String, RepositoryError> {
        let basename = raw.rsplit(['/', '\\']).next().unwrap_or_default();

        if basename.is_empty()
            || basename.chars().all(|c| c == '.')
            || basename.chars().any(char::is_control)
        {
            return Err(RepositoryError::validation_error(format!(
                "Invalid file name '{}'",
                raw.escape_debug()
            )));
        }

        Ok(basename.to_string())
    }

    /// Stored file name for an upload at `uploaded_at`.
    pub fn stored_name(uploaded_at: DateTime<Utc>, filename: &str) -> String {
        format!(
            "{}_{}",
            uploaded_at.format(STORED_NAME_TIMESTAMP_FORMAT),
            filename
        )
    }

    /// Full path a file uploaded at `uploaded_at` is stored under.
    pub fn stored_path(&self, uploaded_at: DateTime<Utc>, filename: &str) -> PathBuf {
        self.root.join(Self::stored_name(uploaded_at, filename))
    }

    /// Writes `data` to its stored path and returns that path.
    ///
    /// `filename` must already be sanitized. An existing file is never
    /// overwritten: a second upload of the same name within the same second
    /// fails with [`std::io::ErrorKind::AlreadyExists`].
    pub async fn save(
        &self,
        filename: &str,
        data: &[u8],
        uploaded_at: DateTime<Utc>,
    ) -> Result<PathBuf, RepositoryError> {
        self.init().await?;

        let path = self.stored_path(uploaded_at, filename);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        if let Err(err) = write_all_and_sync(&mut file, data).await {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(err.into());
        }

        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored attachment file");
        Ok(path)
    }

    /// Removes a stored file. A file that is already gone counts as removed.
    ///
    /// Returns `true` when a file was actually deleted.
    pub async fn remove(&self, path: &Path) -> Result<bool, RepositoryError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Attachment file already missing");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}

async fn write_all_and_sync(file: &mut fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.sync_all().await
}
