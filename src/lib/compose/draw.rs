//! Module implementing the meme drawing routine.

use image::RgbaImage;

use crate::model::{StyleParameters, TextAlign};
use super::error::RenderError;
use super::surface::{Surface, TextStyle};


/// Draw a meme onto given surface: the image, then its captions on top.
///
/// The surface is resized to exactly match the image.
/// Captions are centered horizontally, with their baselines at vertical
/// positions derived from the style. Empty captions are skipped.
pub fn draw<S: Surface>(surface: &mut S,
                        image: &RgbaImage,
                        style: &StyleParameters) -> Result<(), RenderError> {
    let (width, height) = image.dimensions();
    trace!("Drawing {}x{} image", width, height);
    surface.resize(width, height);
    surface.clear();
    surface.draw_image(image);

    surface.set_text_style(TextStyle{
        font: style.font(),
        align: TextAlign::Center,
        fill: style.text_color,
        stroke: style.stroke_color,
        line_width: style.stroke_width_px,
    });

    let x = width as f32 / 2.0;
    let captions = [
        ("top", &style.top_text, style.top_y(height)),
        ("bottom", &style.bottom_text, style.bottom_y(height)),
    ];
    for &(which, text, y) in captions.iter() {
        if text.is_empty() {
            trace!("Empty {} text, skipping.", which);
            continue;
        }
        debug!("Rendering {} text {:?} at ({}, {}) with font `{}`",
            which, text, x, y, style.font());

        // Outline goes on top of the fill.
        surface.fill_text(text, x, y)?;
        if style.stroke_width_px > 0.0 {
            surface.stroke_text(text, x, y)?;
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use spectral::prelude::*;

    use crate::model::{Color, StyleParameters, StyleUpdate, TextAlign};
    use super::super::surface::tests::{Call, RecordingSurface};
    use super::draw;

    fn image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0x33, 0x66, 0x99, 0xff]))
    }

    #[test]
    fn top_text_at_position() {
        let mut style = StyleParameters::default();
        style.apply(StyleUpdate{top_text: Some("HELLO".into()), ..StyleUpdate::default()});
        style.top_position_pct = 10.0;

        let mut surface = RecordingSurface::default();
        draw(&mut surface, &image(400, 300), &style).unwrap();

        assert_that!(surface.text_calls()).is_equal_to(vec![
            &Call::FillText("HELLO".into(), 200.0, 30.0),
            &Call::StrokeText("HELLO".into(), 200.0, 30.0),
        ]);
    }

    #[test]
    fn surface_setup() {
        let style = StyleParameters{
            text_color: Color(1, 2, 3),
            stroke_width_px: 4.5,
            ..StyleParameters::default()
        };
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &image(64, 48), &style).unwrap();

        assert_that!(surface.calls[..3].to_vec()).is_equal_to(vec![
            Call::Resize(64, 48), Call::Clear, Call::DrawImage(64, 48),
        ]);
        match surface.calls[3] {
            Call::SetTextStyle(ts) => {
                assert_that!(ts.align).is_equal_to(TextAlign::Center);
                assert_that!(ts.fill).is_equal_to(Color(1, 2, 3));
                assert_that!(ts.line_width).is_equal_to(4.5);
                assert_that!(ts.font).is_equal_to(style.font());
            }
            ref call => panic!("unexpected call: {:?}", call),
        }
    }

    #[test]
    fn empty_texts_skipped() {
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &image(10, 10), &StyleParameters::default()).unwrap();
        assert_that!(surface.text_calls()).has_length(0);
    }

    #[test]
    fn bottom_text_only() {
        let style = StyleParameters{
            bottom_text: "WORLD".into(),
            bottom_position_pct: 90.0,
            ..StyleParameters::default()
        };
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &image(400, 300), &style).unwrap();

        assert_that!(surface.text_calls()).is_equal_to(vec![
            &Call::FillText("WORLD".into(), 200.0, 270.0),
            &Call::StrokeText("WORLD".into(), 200.0, 270.0),
        ]);
    }

    #[test]
    fn zero_stroke_only_fills() {
        let style = StyleParameters{
            top_text: "A".into(),
            stroke_width_px: 0.0,
            ..StyleParameters::default()
        };
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &image(100, 100), &style).unwrap();

        assert_that!(surface.text_calls()).is_equal_to(vec![
            &Call::FillText("A".into(), 50.0, 10.0),
        ]);
    }
}
