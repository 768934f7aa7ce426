/// Image formats the marketplace accepts for vehicle photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// JPEG
    Jpeg,
    /// PNG
    Png,
    /// WebP
    Webp,
    /// HEIC/HEIF containers as produced by phones
    Heic,
}

impl ImageKind {
    /// The MIME type sent to the media store for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
            ImageKind::Heic => "image/heic",
        }
    }
}

/// Custom error type for media store operations
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Media store is not configured
    #[error("Media store configuration error: {0}")]
    Config(String),

    /// The store refused or failed the upload
    #[error("Upload failed: {0}")]
    Upload(String),
}
