//! Module defining constants relevant to the data model.

use std::ops::RangeInclusive;

use super::types::{Color, FontFamily};


/// Default size of the caption font, in CSS pixels.
pub const DEFAULT_FONT_SIZE: f32 = 40.0;
/// Allowed range of font sizes.
pub const FONT_SIZE_RANGE: RangeInclusive<f32> = 10.0..=100.0;

/// Default font family of the captions.
pub const DEFAULT_FONT_FAMILY: FontFamily = FontFamily::Impact;

/// Default color of the text.
pub const DEFAULT_TEXT_COLOR: Color = Color(0xff, 0xff, 0xff);
/// Default color of the text outline.
/// This should be the inversion of DEFAULT_TEXT_COLOR.
pub const DEFAULT_STROKE_COLOR: Color = Color(0x0, 0x0, 0x0);

/// Default width of the text outline, in pixels.
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
/// Allowed range of outline widths.
pub const STROKE_WIDTH_RANGE: RangeInclusive<f32> = 0.0..=10.0;
/// Granularity of outline widths.
pub const STROKE_WIDTH_STEP: f32 = 0.5;

/// Default vertical position of the top caption, as percentage of image height.
pub const DEFAULT_TOP_POSITION: f32 = 10.0;
/// Allowed range for the top caption position.
pub const TOP_POSITION_RANGE: RangeInclusive<f32> = 1.0..=50.0;

/// Default vertical position of the bottom caption, as percentage of image height.
pub const DEFAULT_BOTTOM_POSITION: f32 = 90.0;
/// Allowed range for the bottom caption position.
pub const BOTTOM_POSITION_RANGE: RangeInclusive<f32> = 50.0..=99.0;


/// URL of the upstream API that lists meme templates.
pub const UPSTREAM_URL: &str = "https://api.imgflip.com/get_memes";

/// File stem of the exported meme image.
pub const EXPORT_FILE_STEM: &str = "meme";
