//! Module implementing the editor state.
//!
//! `Editor` holds everything the user has chosen so far (the image,
//! the captions & their style) and keeps the composite image
//! in sync with it by re-rendering after every change.

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use crate::compose::{decode_image, CompositeImage, Compositor,
                     ExportError, ExportFormat, ExportOutput, RenderError};
use crate::model::{StyleParameters, StyleUpdate, Template};


/// Where the edited image comes from.
#[derive(Clone, PartialEq)]
pub enum ImageSource {
    /// Encoded image bytes provided directly by the user.
    Upload(Vec<u8>),
    /// A template whose image has to be downloaded first.
    Template(Template),
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ImageSource::Upload(ref bytes) => write!(fmt, "Upload(<{} bytes>)", bytes.len()),
            ImageSource::Template(ref t) => write!(fmt, "Template({})", t),
        }
    }
}


/// Ticket for an image that's still being loaded.
///
/// It must be passed to `Editor::image_loaded` or `Editor::image_failed`
/// when the load completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PendingImage(u64);

impl PendingImage {
    #[inline]
    pub fn ticket(self) -> u64 {
        self.0
    }
}


enum ActiveImage {
    Pending(PendingImage),
    Decoded(Arc<RgbaImage>),
}

impl fmt::Debug for ActiveImage {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ActiveImage::Pending(p) => write!(fmt, "Pending(#{})", p.ticket()),
            ActiveImage::Decoded(ref img) => {
                let (width, height) = img.dimensions();
                write!(fmt, "Decoded({}x{})", width, height)
            }
        }
    }
}


/// State of the meme editor.
#[derive(Debug)]
pub struct Editor {
    compositor: Compositor,
    image: Option<ActiveImage>,
    style: StyleParameters,
    template: Option<Template>,
    composite: Option<CompositeImage>,
    error: Option<String>,
    next_ticket: u64,
}

impl Editor {
    pub fn new(compositor: Compositor) -> Self {
        Editor{
            compositor,
            image: None,
            style: StyleParameters::default(),
            template: None,
            composite: None,
            error: None,
            next_ticket: 1,
        }
    }

    #[inline]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}

// Accessors.
impl Editor {
    #[inline]
    pub fn style(&self) -> &StyleParameters {
        &self.style
    }

    /// The template that was selected most recently, if any.
    #[inline]
    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// The most recently rendered meme, if any.
    #[inline]
    pub fn composite(&self) -> Option<&CompositeImage> {
        self.composite.as_ref()
    }

    /// Whether the editor is waiting for an image to load.
    #[inline]
    pub fn is_loading(&self) -> bool {
        match self.image {
            Some(ActiveImage::Pending(_)) => true,
            _ => false,
        }
    }

    /// Message describing the last error, if the last operation failed.
    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.as_str())
    }
}

// Changing the image.
impl Editor {
    /// Replace the image being edited.
    ///
    /// Captions & style are kept. For a `Template` source, the returned
    /// `PendingImage` has to be completed once the image is downloaded.
    pub fn set_image(&mut self, source: ImageSource) -> Result<Option<PendingImage>, RenderError> {
        match source {
            ImageSource::Upload(bytes) => self.upload_image(&bytes).map(|_| None),
            ImageSource::Template(template) => Ok(Some(self.select_template(template))),
        }
    }

    /// Use image from given bytes, decoding it immediately.
    pub fn upload_image(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        debug!("Uploading image of {} byte(s)", bytes.len());
        let image = self.decode(bytes)?;
        self.image = Some(ActiveImage::Decoded(Arc::new(image)));
        self.error = None;
        self.recompute()
    }

    /// Select a template, whose image will be provided later.
    pub fn select_template(&mut self, template: Template) -> PendingImage {
        let pending = PendingImage(self.next_ticket);
        self.next_ticket += 1;
        debug!("Selected template {}, waiting for image #{}", template, pending.ticket());

        self.template = Some(template);
        self.image = Some(ActiveImage::Pending(pending));
        self.error = None;
        pending
    }

    /// Complete loading of a pending image.
    ///
    /// Loads that have since been superseded are still applied.
    pub fn image_loaded(&mut self, pending: PendingImage,
                        bytes: &[u8]) -> Result<(), RenderError> {
        if !self.is_current(pending) {
            debug!("Applying stale image #{}", pending.ticket());
        }
        let image = self.decode(bytes)?;
        self.image = Some(ActiveImage::Decoded(Arc::new(image)));
        self.error = None;
        self.recompute()
    }

    /// Report that a pending image couldn't be loaded.
    pub fn image_failed<M: ToString>(&mut self, pending: PendingImage, message: M) {
        let message = message.to_string();
        warn!("Failed to load image #{}: {}", pending.ticket(), message);
        if self.is_current(pending) {
            self.image = None;
        }
        self.error = Some(message);
    }

    fn is_current(&self, pending: PendingImage) -> bool {
        match self.image {
            Some(ActiveImage::Pending(p)) => p == pending,
            _ => false,
        }
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<RgbaImage, RenderError> {
        decode_image(bytes).map_err(|e| {
            warn!("Cannot decode image: {}", e);
            self.error = Some(e.to_string());
            e
        })
    }
}

// Changing the style.
impl Editor {
    /// Merge a partial style update into the current style.
    ///
    /// Values are not range-checked.
    pub fn update_style(&mut self, update: StyleUpdate) -> Result<(), RenderError> {
        trace!("Updating style with {:?}", update);
        self.style.apply(update);
        self.recompute()
    }

    /// Replace the current style entirely.
    pub fn set_style(&mut self, style: StyleParameters) -> Result<(), RenderError> {
        self.style = style;
        self.recompute()
    }
}

// Rendering & export.
impl Editor {
    /// Re-render the composite image from current state.
    ///
    /// Does nothing if there is no image yet, or it's still loading.
    pub fn recompute(&mut self) -> Result<(), RenderError> {
        let image = match self.image {
            Some(ActiveImage::Decoded(ref img)) => img.clone(),
            Some(ActiveImage::Pending(p)) => {
                trace!("Image #{} still loading, not rendering", p.ticket());
                return Ok(());
            }
            None => {
                trace!("No image, not rendering");
                return Ok(());
            }
        };
        match self.compositor.render(&image, &self.style) {
            Ok(composite) => {
                self.composite = Some(composite);
                Ok(())
            }
            Err(e) => {
                error!("Failed to render meme: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Export the current composite image in given format.
    pub fn export(&self, format: ExportFormat) -> Result<ExportOutput, ExportError> {
        let composite = self.composite.as_ref().ok_or(ExportError::NoImageLoaded)?;
        self.compositor.export(composite, format)
    }
}
