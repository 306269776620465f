//! Module implementing meme compositing.

mod config;
mod draw;
mod engine;
mod error;
mod output;
mod raster;
mod surface;


pub use self::config::Config as CompositorConfig;
pub use self::draw::draw;
pub use self::engine::{decode_image, CompositeImage, Compositor};
pub use self::error::{ExportError, RenderError};
pub use self::output::{ExportFormat, ExportOutput};
pub use self::raster::RasterSurface;
pub use self::surface::{Surface, TextStyle};
