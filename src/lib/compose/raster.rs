//! Module implementing the in-memory raster surface.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use image::{Pixel, Rgba, RgbaImage};
use rusttype::{point, GlyphId, PositionedGlyph, Scale};

use crate::model::Color;
use crate::resources::{Font, FontLoader};
use super::error::RenderError;
use super::surface::{Surface, TextStyle};


/// Surface backed by an RGBA image buffer.
///
/// Fonts are only loaded when some text is actually drawn.
pub struct RasterSurface {
    canvas: RgbaImage,
    fonts: Arc<FontLoader>,
    style: TextStyle,
}

impl RasterSurface {
    pub fn new(fonts: Arc<FontLoader>) -> Self {
        RasterSurface{
            canvas: RgbaImage::new(0, 0),
            fonts,
            style: TextStyle::default(),
        }
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    #[inline]
    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let (width, height) = self.canvas.dimensions();
        fmt.debug_struct("RasterSurface")
            .field("size", &format_args!("{}x{}", width, height))
            .field("style", &self.style)
            .finish()
    }
}

impl Surface for RasterSurface {
    fn resize(&mut self, width: u32, height: u32) {
        trace!("Resizing raster surface to {}x{}", width, height);
        self.canvas = RgbaImage::new(width, height);
    }

    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn clear(&mut self) {
        for px in self.canvas.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage) {
        let (width, height) = self.canvas.dimensions();
        for (x, y, src) in image.enumerate_pixels() {
            if x >= width || y >= height {
                continue;
            }
            let dst = self.canvas.get_pixel_mut(x, y);
            if dst[3] == 0 {
                *dst = *src;
            } else {
                dst.blend(src);
            }
        }
    }

    #[inline]
    fn set_text_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) -> Result<(), RenderError> {
        let mask = match self.rasterize(text, x, y, 0)? {
            Some(mask) => mask,
            None => return Ok(()),
        };
        self.paint(&mask, self.style.fill, 1.0);
        Ok(())
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) -> Result<(), RenderError> {
        let line_width = self.style.line_width;
        if !(line_width > 0.0) {
            return Ok(());
        }

        let radius = (line_width / 2.0).max(0.5);
        let padding = radius.ceil() as i32 + 1;
        let mask = match self.rasterize(text, x, y, padding)? {
            Some(mask) => mask,
            None => return Ok(()),
        };
        let outline = mask.outline(radius);
        self.paint(&outline, self.style.stroke, line_width.min(1.0));
        Ok(())
    }
}

impl RasterSurface {
    /// Compute the coverage of given text drawn with current style.
    /// Returns `None` if the text has no visible glyphs.
    fn rasterize(&self, text: &str, x: f32, y: f32,
                 padding: i32) -> Result<Option<Mask>, RenderError> {
        let style = &self.style;
        let font = self.fonts.load_or_fallback(style.font.family)?;
        check(&font, text);

        let scale = font_scale(&font, style.font.size_px);
        let start_x = style.align.start_x(x, text_width(&font, text, scale));
        let glyphs: Vec<PositionedGlyph> =
            font.layout(text, scale, point(start_x, y)).collect();

        let bounds = glyphs.iter().filter_map(|g| g.pixel_bounding_box())
            .fold(None, |acc: Option<(i32, i32, i32, i32)>, bb| Some(match acc {
                Some((x0, y0, x1, y1)) =>
                    (x0.min(bb.min.x), y0.min(bb.min.y), x1.max(bb.max.x), y1.max(bb.max.y)),
                None => (bb.min.x, bb.min.y, bb.max.x, bb.max.y),
            }));
        let (x0, y0, x1, y1) = match bounds {
            Some(b) => b,
            None => {
                trace!("No visible glyphs in {:?}", text);
                return Ok(None);
            }
        };

        // Only the canvas and a margin of `padding` around it can affect the result.
        let (width, height) = self.canvas.dimensions();
        let (x0, y0) = ((x0 - padding).max(-padding), (y0 - padding).max(-padding));
        let (x1, y1) = ((x1 + padding).min(width as i32 + padding),
                        (y1 + padding).min(height as i32 + padding));
        if x0 >= x1 || y0 >= y1 {
            trace!("Text {:?} lies outside of the canvas", text);
            return Ok(None);
        }

        let mut mask = Mask::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32);
        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                if bb.max.x <= x0 || bb.min.x >= x1 || bb.max.y <= y0 || bb.min.y >= y1 {
                    continue;
                }
                glyph.draw(|gx, gy, v| {
                    mask.accumulate(bb.min.x + gx as i32, bb.min.y + gy as i32, v);
                });
            }
        }
        Ok(Some(mask))
    }

    /// Blend given color onto the canvas using the mask as alpha.
    fn paint(&mut self, mask: &Mask, color: Color, opacity: f32) {
        let (width, height) = self.canvas.dimensions();
        for (mx, my, v) in mask.iter() {
            let (x, y) = (mask.x + mx as i32, mask.y + my as i32);
            if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
                continue;
            }
            let alpha = (v * opacity * 255.0).round().max(0.0).min(255.0) as u8;
            if alpha > 0 {
                self.canvas.get_pixel_mut(x as u32, y as u32).blend(&color.to_rgba(alpha));
            }
        }
    }
}


/// Alpha coverage of a rectangular area of the canvas.
#[derive(Clone, Debug)]
struct Mask {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Mask {
    fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        let data = vec![0.0; (width * height) as usize];
        Mask{x, y, width, height, data}
    }

    /// Coverage at given mask-relative position; zero outside of the mask.
    #[inline]
    fn at(&self, mx: i32, my: i32) -> f32 {
        if mx < 0 || my < 0 || mx as u32 >= self.width || my as u32 >= self.height {
            return 0.0;
        }
        self.data[(my as u32 * self.width + mx as u32) as usize]
    }

    /// Add coverage at given canvas position.
    fn accumulate(&mut self, x: i32, y: i32, value: f32) {
        let (mx, my) = (x - self.x, y - self.y);
        if mx < 0 || my < 0 || mx as u32 >= self.width || my as u32 >= self.height {
            return;
        }
        let idx = (my as u32 * self.width + mx as u32) as usize;
        self.data[idx] = (self.data[idx] + value).min(1.0);
    }

    fn iter<'m>(&'m self) -> impl Iterator<Item=(u32, u32, f32)> + 'm {
        let width = self.width;
        self.data.iter().enumerate()
            .map(move |(i, &v)| (i as u32 % width, i as u32 / width, v))
    }

    /// Band of given radius around the edges of the covered shape,
    /// computed as its dilation minus its erosion.
    fn outline(&self, radius: f32) -> Mask {
        let offsets = disc(radius);
        let mut result = Mask::new(self.x, self.y, self.width, self.height);
        for my in 0..self.height as i32 {
            for mx in 0..self.width as i32 {
                let (mut max, mut min) = (0.0f32, 1.0f32);
                for &(dx, dy) in &offsets {
                    let v = self.at(mx + dx, my + dy);
                    max = max.max(v);
                    min = min.min(v);
                }
                result.data[(my as u32 * self.width + mx as u32) as usize] = max - min;
            }
        }
        result
    }
}

/// Pixel offsets within a disc of given radius.
fn disc(radius: f32) -> Vec<(i32, i32)> {
    let r = radius.ceil() as i32;
    let limit = (radius + 0.5) * (radius + 0.5);
    let mut result = vec![];
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= limit {
                result.push((dx, dy));
            }
        }
    }
    result
}


// Font utilities

/// Check if given font has all the glyphs for given text.
fn check(font: &Font, text: &str) {
    let mut missing: Vec<_> = text.chars()
        .filter(|&c| !c.is_control() && font.glyph(c).id() == GlyphId(0))
        .map(|c| c as u32)
        .collect::<HashSet<_>>().into_iter().collect();
    if !missing.is_empty() {
        missing.sort();
        warn!("Font `{}` is missing glyphs for {} codepoint(s): {}",
            font.family(), missing.len(),
            missing.into_iter().map(|c| format!("{:#x}", c)).collect::<Vec<_>>().join(", "));
    }
}

/// Scale for rendering text in a font of given size in CSS pixels.
///
/// The CSS font size is the height of the em square,
/// whereas rusttype's scale covers the whole ascent-to-descent span.
fn font_scale(font: &Font, size_px: f32) -> Scale {
    let upem = font.units_per_em() as f32;
    if upem <= 0.0 {
        return Scale::uniform(size_px);
    }
    let v_metrics = font.v_metrics_unscaled();
    Scale::uniform(size_px * (v_metrics.ascent - v_metrics.descent) / upem)
}

/// Compute the advance width of given text, including kerning.
fn text_width(font: &Font, text: &str, scale: Scale) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use image::{Rgba, RgbaImage};
    use spectral::prelude::*;

    use crate::model::{Color, FontFamily, FontSpec, TextAlign};
    use crate::resources::{test_font_bytes, FontLoader};
    use super::super::surface::{Surface, TextStyle};
    use super::{disc, Mask, RasterSurface};

    fn surface_with_font() -> RasterSurface {
        let loader = FontLoader::with_font("/nonexistent", FontFamily::Impact, test_font_bytes())
            .unwrap();
        RasterSurface::new(Arc::new(loader))
    }

    fn style(line_width: f32) -> TextStyle {
        TextStyle{
            font: FontSpec::new(40.0, FontFamily::Impact),
            align: TextAlign::Center,
            fill: Color::white(),
            stroke: Color::black(),
            line_width,
        }
    }

    #[test]
    fn draw_image_over_transparent() {
        let mut surface = RasterSurface::new(Arc::new(FontLoader::new("/nonexistent")));
        surface.resize(4, 3);
        let image = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128]));
        surface.draw_image(&image);
        assert_that!(*surface.image()).is_equal_to(image);
    }

    #[test]
    fn draw_image_clipped() {
        let mut surface = RasterSurface::new(Arc::new(FontLoader::new("/nonexistent")));
        surface.resize(2, 2);
        surface.draw_image(&RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 255])));
        assert_that!(surface.image().dimensions()).is_equal_to((2, 2));
        assert_that!(*surface.image().get_pixel(1, 1)).is_equal_to(Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn clear() {
        let mut surface = RasterSurface::new(Arc::new(FontLoader::new("/nonexistent")));
        surface.resize(2, 2);
        surface.draw_image(&RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])));
        surface.clear();
        assert!(surface.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn fill_text_without_fonts() {
        let mut surface = RasterSurface::new(Arc::new(FontLoader::new("/nonexistent")));
        surface.resize(100, 100);
        assert_that!(surface.fill_text("hi", 50.0, 50.0)).is_err();
    }

    #[test]
    fn fill_text_changes_pixels() {
        let mut surface = surface_with_font();
        surface.resize(200, 100);
        surface.set_text_style(style(2.0));
        surface.fill_text("HELLO", 100.0, 60.0).unwrap();

        let drawn: Vec<_> = surface.image().pixels().filter(|p| p[3] > 0).collect();
        assert!(!drawn.is_empty());
        assert!(drawn.iter().all(|p| p[0] >= 250 && p[1] >= 250 && p[2] >= 250));
    }

    #[test]
    fn stroke_text_changes_pixels() {
        let mut surface = surface_with_font();
        surface.resize(200, 100);
        surface.set_text_style(style(2.0));
        surface.stroke_text("HELLO", 100.0, 60.0).unwrap();
        assert!(surface.image().pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn zero_stroke_draws_nothing() {
        let mut surface = surface_with_font();
        surface.resize(200, 100);
        surface.set_text_style(style(0.0));
        surface.stroke_text("HELLO", 100.0, 60.0).unwrap();
        assert!(surface.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn centered_text_is_centered() {
        let mut surface = surface_with_font();
        surface.resize(400, 100);
        surface.set_text_style(style(0.0));
        surface.fill_text("MMMM", 200.0, 60.0).unwrap();

        let xs: Vec<u32> = surface.image().enumerate_pixels()
            .filter(|&(_, _, p)| p[3] > 0).map(|(x, _, _)| x).collect();
        let (min, max) = (*xs.iter().min().unwrap(), *xs.iter().max().unwrap());
        let center = (min + max) as f32 / 2.0;
        assert_that!(center).is_close_to(200.0, 6.0);
    }

    #[test]
    fn long_text_is_clipped_to_canvas() {
        let mut surface = surface_with_font();
        surface.resize(100, 100);
        surface.set_text_style(style(10.0));
        let text = "M".repeat(400);

        let mask = surface.rasterize(&text, 50.0, 60.0, 6).unwrap().unwrap();
        assert_that!(mask.x).is_equal_to(-6);
        assert!(mask.width <= 112);
        assert!(mask.height <= 112);

        surface.stroke_text(&text, 50.0, 60.0).unwrap();
        assert!(surface.image().pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn text_outside_of_canvas() {
        let mut surface = surface_with_font();
        surface.resize(100, 100);
        surface.set_text_style(style(2.0));
        assert_that!(surface.rasterize("HELLO", 1000.0, 60.0, 2).unwrap()).is_none();

        surface.fill_text("HELLO", 50.0, -500.0).unwrap();
        assert!(surface.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn outline_of_square() {
        let mut mask = Mask::new(0, 0, 7, 7);
        for y in 2..5 {
            for x in 2..5 {
                mask.accumulate(x, y, 1.0);
            }
        }
        let outline = mask.outline(0.5);
        // Interior pixel is eroded away, edges and their immediate neighbors remain.
        assert_that!(outline.at(3, 3)).is_equal_to(0.0);
        assert_that!(outline.at(2, 3)).is_equal_to(1.0);
        assert_that!(outline.at(1, 3)).is_equal_to(1.0);
        assert_that!(outline.at(0, 3)).is_equal_to(0.0);
    }

    #[test]
    fn disc_offsets() {
        assert_that!(disc(0.5)).has_length(5);
        assert!(disc(2.0).contains(&(2, 0)));
        assert!(!disc(2.0).contains(&(2, 2)));
    }
}
