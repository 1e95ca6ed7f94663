use thiserror::Error;

/// Library error type for kiosk operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Every discovery strategy ran and none produced a slide.
    #[error("album {0} contains no slides")]
    EmptyAlbum(String),

    /// Underlying HTTP client error.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
