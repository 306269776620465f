//! Compositing errors.

use image::ImageError;
use thiserror::Error;

use crate::resources::FontError;


/// Error that may occur while rendering a composite image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No usable font for the captions.
    #[error("cannot load font: {0}")]
    Font(#[from] FontError),
    /// Source image couldn't be decoded.
    #[error("cannot decode image: {0}")]
    Decode(#[from] ImageError),
}


/// Error that may occur while exporting the composite image.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing has been rendered yet.
    #[error("no image loaded")]
    NoImageLoaded,
    /// Requested export format is not supported.
    #[error("unsupported export format `{0}`")]
    UnsupportedFormat(String),
    /// Error while encoding the image.
    #[error("failed to encode the final image: {0}")]
    Encode(#[source] ImageError),
}
