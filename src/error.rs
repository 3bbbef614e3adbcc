use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving an image source into pixels
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("failed to read image file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image data")]
    Decode(#[from] image::ImageError),
}

/// Top-level editor errors surfaced to the host
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
    /// Confirm/export was requested while no photo is open
    #[error("no editing session is active")]
    NoActiveSession,
    #[error("failed to encode flattened image")]
    Encode(#[source] image::ImageError),
}
