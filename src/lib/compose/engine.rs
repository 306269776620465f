//! Module which defines the compositing engine.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use antidote::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;

use crate::model::StyleParameters;
use crate::resources::FontLoader;
use super::config::Config;
use super::draw::draw;
use super::error::{ExportError, RenderError};
use super::output::{ExportFormat, ExportOutput};
use super::raster::RasterSurface;


/// Flattened raster image with the captions burned in.
#[derive(Clone, PartialEq)]
pub struct CompositeImage(RgbaImage);

impl CompositeImage {
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.0
    }

    #[inline]
    pub fn into_image(self) -> RgbaImage {
        self.0
    }
}

impl fmt::Debug for CompositeImage {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let (width, height) = self.dimensions();
        write!(fmt, "CompositeImage({}x{})", width, height)
    }
}


/// Meme compositing engine.
///
/// *Note*: `Compositor` implements `Clone`
/// by merely cloning a shared reference to the underlying object.
#[derive(Clone, Debug)]
pub struct Compositor {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: RwLock<Config>,
    fonts: Arc<FontLoader>,
}

impl Compositor {
    /// Create a Compositor which loads fonts from given directory.
    #[inline]
    pub fn new<D: AsRef<Path>>(font_directory: D) -> Self {
        Self::with_fonts(FontLoader::new(font_directory))
    }

    #[inline]
    pub fn with_fonts(fonts: FontLoader) -> Self {
        Self::with_config(fonts, Config::default())
    }

    pub fn with_config(fonts: FontLoader, config: Config) -> Self {
        let inner = Inner{config: RwLock::new(config), fonts: Arc::new(fonts)};
        Compositor{inner: Arc::new(inner)}
    }

    /// The loader that fonts for captions come from.
    #[inline]
    pub fn fonts(&self) -> &FontLoader {
        &self.inner.fonts
    }
}

// Configuration.
impl Compositor {
    /// Read the `Compositor`'s configuration.
    #[inline]
    pub fn config(&self) -> RwLockReadGuard<Config> {
        self.inner.config.read()
    }

    /// Modify the `Compositor`'s configuration.
    #[inline]
    pub fn config_mut(&self) -> RwLockWriteGuard<Config> {
        self.inner.config.write()
    }
}

// Rendering & export.
impl Compositor {
    /// Render the meme from given source image & style.
    ///
    /// The result depends only on the inputs (and the fonts available),
    /// so it's recomputed from scratch on every call.
    pub fn render(&self, image: &RgbaImage,
                  style: &StyleParameters) -> Result<CompositeImage, RenderError> {
        let mut surface = RasterSurface::new(self.inner.fonts.clone());
        draw(&mut surface, image, style)?;
        Ok(CompositeImage(surface.into_image()))
    }

    /// Decode the source image from its encoded bytes and render the meme.
    pub fn render_bytes(&self, bytes: &[u8],
                        style: &StyleParameters) -> Result<CompositeImage, RenderError> {
        let image = decode_image(bytes)?;
        self.render(&image, style)
    }

    /// Encode the composite image in given format.
    pub fn export(&self, composite: &CompositeImage,
                  format: ExportFormat) -> Result<ExportOutput, ExportError> {
        let img = composite.image();
        let (width, height) = img.dimensions();
        debug!("Encoding {}x{} image as {:?}...", width, height, format);

        let mut result = vec![];
        match format {
            ExportFormat::Png => {
                trace!("Writing PNG image");
                PngEncoder::new(&mut result)
                    .write_image(img.as_raw(), width, height, ColorType::Rgba8)
                    .map_err(ExportError::Encode)?;
            }
            ExportFormat::Jpeg => {
                let quality = self.config().jpeg_quality;
                trace!("Writing JPEG with quality {}", quality);
                let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
                JpegEncoder::new_with_quality(&mut result, quality)
                    .encode(rgb.as_raw(), width, height, ColorType::Rgb8)
                    .map_err(ExportError::Encode)?;
            }
        }

        debug!("Exported image is {} byte(s)", result.len());
        Ok(ExportOutput::new(format, result))
    }
}


/// Decode an image from bytes of any supported raster format.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    trace!("Decoding image from {} byte(s)", bytes.len());
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}


#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};
    use spectral::prelude::*;

    use crate::model::{FontFamily, StyleParameters};
    use crate::resources::{test_font_bytes, FontLoader};
    use super::super::error::{ExportError, RenderError};
    use super::super::output::ExportFormat;
    use super::{decode_image, Compositor};

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 0x80, 0xff])
        })
    }

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut result = Cursor::new(vec![]);
        img.write_to(&mut result, ImageFormat::Png).unwrap();
        result.into_inner()
    }

    #[test]
    fn thread_safe() {
        fn assert_sync<T: Sync>() {}
        fn assert_send<T: Send>() {}

        assert_sync::<Compositor>();
        assert_send::<Compositor>();
    }

    #[test]
    fn no_text_round_trip() {
        let compositor = Compositor::new("/nonexistent");
        let source = gradient(40, 30);

        let composite = compositor.render(&source, &StyleParameters::default()).unwrap();
        let output = compositor.export(&composite, ExportFormat::Png).unwrap();
        assert_that!(output.file_name()).is_equal_to("meme.png".to_owned());

        let decoded = decode_image(output.bytes()).unwrap();
        assert_that!(decoded).is_equal_to(source);
    }

    #[test]
    fn deterministic() {
        let fonts = FontLoader::with_font("/nonexistent", FontFamily::Impact, test_font_bytes())
            .unwrap();
        let compositor = Compositor::with_fonts(fonts);
        let style = StyleParameters{
            top_text: "ONE DOES NOT SIMPLY".into(),
            bottom_text: "WRITE A MEME".into(),
            ..StyleParameters::default()
        };
        let source = gradient(300, 200);

        let first = compositor.render(&source, &style).unwrap();
        let second = compositor.render(&source, &style).unwrap();
        assert_that!(first).is_equal_to(second.clone());
        assert!(first.image() != &source);

        let first = compositor.export(&first, ExportFormat::Png).unwrap();
        let second = compositor.export(&second, ExportFormat::Png).unwrap();
        assert_that!(first.into_bytes()).is_equal_to(second.into_bytes());
    }

    #[test]
    fn text_without_fonts() {
        let compositor = Compositor::new("/nonexistent");
        let style = StyleParameters{top_text: "HI".into(), ..StyleParameters::default()};
        match compositor.render(&gradient(10, 10), &style) {
            Err(RenderError::Font(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn render_bytes() {
        let compositor = Compositor::new("/nonexistent");
        let source = gradient(8, 8);
        let composite = compositor.render_bytes(&png_bytes(&source), &StyleParameters::default())
            .unwrap();
        assert_that!(composite.into_image()).is_equal_to(source);
    }

    #[test]
    fn undecodable_image() {
        let compositor = Compositor::new("/nonexistent");
        match compositor.render_bytes(b"definitely not an image", &StyleParameters::default()) {
            Err(RenderError::Decode(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn export_jpeg() {
        let compositor = Compositor::new("/nonexistent");
        compositor.config_mut().jpeg_quality = 90;
        let composite = compositor.render(&gradient(16, 16), &StyleParameters::default()).unwrap();

        let output = compositor.export(&composite, ExportFormat::Jpeg).unwrap();
        assert_that!(output.file_name()).is_equal_to("meme.jpg".to_owned());
        assert!(output.bytes().starts_with(&[0xff, 0xd8]));
        assert_that!(decode_image(output.bytes()).unwrap().dimensions()).is_equal_to((16, 16));
    }

    #[test]
    fn unsupported_format() {
        match "tiff".parse::<ExportFormat>() {
            Err(ExportError::UnsupportedFormat(f)) => assert_that!(f).is_equal_to("tiff".to_owned()),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
