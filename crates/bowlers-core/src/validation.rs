//! File selection and form validation
//!
//! Selection checks only look at the declared content type (derived from the
//! file extension, like a browser's `File.type`) and the file size. Nothing
//! here touches the network.

use std::path::{Path, PathBuf};

use crate::constants::MAX_VIDEO_SIZE_BYTES;
use crate::error::{SelectionError, UploadError};

/// The three upload surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
    /// Replacement thumbnail for an existing video
    Thumbnail,
}

impl MediaKind {
    /// Required prefix of the declared content type.
    pub fn content_type_prefix(&self) -> &'static str {
        match self {
            MediaKind::Photo | MediaKind::Thumbnail => "image/",
            MediaKind::Video => "video/",
        }
    }

    pub fn max_size_bytes(&self) -> Option<u64> {
        match self {
            MediaKind::Video => Some(MAX_VIDEO_SIZE_BYTES),
            MediaKind::Photo | MediaKind::Thumbnail => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MediaKind::Photo | MediaKind::Thumbnail => "image",
            MediaKind::Video => "video",
        }
    }

    /// Client-side route to follow after a committed upload.
    pub fn success_route(&self, user_uid: &str) -> Option<String> {
        match self {
            MediaKind::Photo => Some(format!("/media/photos/{}", user_uid)),
            MediaKind::Video => Some(format!("/media/videos/{}", user_uid)),
            MediaKind::Thumbnail => None,
        }
    }
}

/// A local file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Declared MIME type, `application/octet-stream` when unknown
    pub content_type: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Result<Self, SelectionError> {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SelectionError::InvalidFilename(path.display().to_string()))?
            .to_string();
        let content_type = declared_content_type(&file_name).to_string();

        Ok(Self {
            path,
            file_name,
            content_type,
            size,
        })
    }

    /// Stat the file on disk and build a selection from it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(SelectionError::InvalidFilename(path.display().to_string()).into());
        }
        Ok(Self::new(path, metadata.len())?)
    }

    /// Local preview handle for the selection.
    pub fn preview_url(&self) -> String {
        let absolute = std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        format!("file://{}", absolute.display())
    }
}

/// Declared content type for a file name, by extension.
pub fn declared_content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// Check a selection against the rules of an upload surface.
pub fn validate_selection(kind: MediaKind, file: &SelectedFile) -> Result<(), SelectionError> {
    if !file
        .content_type
        .to_lowercase()
        .starts_with(kind.content_type_prefix())
    {
        return Err(SelectionError::UnsupportedType {
            content_type: file.content_type.clone(),
            expected: kind.label(),
        });
    }

    if file.size == 0 {
        return Err(SelectionError::Empty);
    }

    if let Some(max) = kind.max_size_bytes() {
        if file.size > max {
            return Err(SelectionError::TooLarge {
                size: file.size,
                max,
            });
        }
    }

    Ok(())
}

/// Required, trimmed title.
pub fn validate_title(title: &str) -> Result<&str, UploadError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(UploadError::MissingTitle);
    }
    Ok(trimmed)
}
