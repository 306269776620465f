//! Module defining the drawing surface abstraction.
//!
//! The operations mirror the subset of HTML canvas 2D context
//! that's needed to composite memes.

use image::RgbaImage;

use crate::model::{
    Color, FontSpec, TextAlign,
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE,
    DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, DEFAULT_TEXT_COLOR,
};
use super::error::RenderError;


/// Style that text is drawn with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontSpec,
    pub align: TextAlign,
    /// Color used by `Surface::fill_text`.
    pub fill: Color,
    /// Color used by `Surface::stroke_text`.
    pub stroke: Color,
    /// Width of the outline drawn by `Surface::stroke_text`, in pixels.
    pub line_width: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle{
            font: FontSpec::new(DEFAULT_FONT_SIZE, DEFAULT_FONT_FAMILY),
            align: TextAlign::default(),
            fill: DEFAULT_TEXT_COLOR,
            stroke: DEFAULT_STROKE_COLOR,
            line_width: DEFAULT_STROKE_WIDTH,
        }
    }
}


/// A raster surface that memes are drawn onto.
pub trait Surface {
    /// Resize the surface, discarding its contents.
    fn resize(&mut self, width: u32, height: u32);
    fn dimensions(&self) -> (u32, u32);
    /// Clear the entire surface to transparent.
    fn clear(&mut self);
    /// Draw an image with its top-left corner at the origin of the surface.
    fn draw_image(&mut self, image: &RgbaImage);

    fn set_text_style(&mut self, style: TextStyle);
    /// Fill a line of text anchored at `(x, y)`,
    /// where `y` is the position of the text's alphabetic baseline.
    fn fill_text(&mut self, text: &str, x: f32, y: f32) -> Result<(), RenderError>;
    /// Outline a line of text anchored at `(x, y)`. See `fill_text`.
    fn stroke_text(&mut self, text: &str, x: f32, y: f32) -> Result<(), RenderError>;
}


#[cfg(test)]
pub(crate) mod tests {
    use image::RgbaImage;
    use super::{RenderError, Surface, TextStyle};

    /// Single call made on a `RecordingSurface`.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Resize(u32, u32),
        Clear,
        DrawImage(u32, u32),
        SetTextStyle(TextStyle),
        FillText(String, f32, f32),
        StrokeText(String, f32, f32),
    }

    /// Surface that only records what's being drawn onto it.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: Vec<Call>,
        size: (u32, u32),
    }

    impl RecordingSurface {
        /// Text drawing calls only.
        pub fn text_calls(&self) -> Vec<&Call> {
            self.calls.iter().filter(|c| match c {
                Call::FillText(..) | Call::StrokeText(..) => true,
                _ => false,
            }).collect()
        }
    }

    impl Surface for RecordingSurface {
        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.calls.push(Call::Resize(width, height));
        }
        fn dimensions(&self) -> (u32, u32) {
            self.size
        }
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }
        fn draw_image(&mut self, image: &RgbaImage) {
            self.calls.push(Call::DrawImage(image.width(), image.height()));
        }
        fn set_text_style(&mut self, style: TextStyle) {
            self.calls.push(Call::SetTextStyle(style));
        }
        fn fill_text(&mut self, text: &str, x: f32, y: f32) -> Result<(), RenderError> {
            self.calls.push(Call::FillText(text.to_owned(), x, y));
            Ok(())
        }
        fn stroke_text(&mut self, text: &str, x: f32, y: f32) -> Result<(), RenderError> {
            self.calls.push(Call::StrokeText(text.to_owned(), x, y));
            Ok(())
        }
    }
}
