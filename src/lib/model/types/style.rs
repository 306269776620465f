//! Module defining the styling parameters of meme captions.

use std::ops::RangeInclusive;

use super::super::constants::*;
use super::color::Color;
use super::font::{FontFamily, FontSpec};


/// Complete set of user-adjustable settings for rendering meme captions.
///
/// Numeric fields have declared ranges (see `model::constants`)
/// but they are not enforced here: use `clamped` when the values
/// come from an untrusted source.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleParameters {
    pub top_text: String,
    pub bottom_text: String,
    pub font_size_px: f32,
    pub font_family: FontFamily,
    pub text_color: Color,
    pub stroke_color: Color,
    pub stroke_width_px: f32,
    /// Vertical position of the top text baseline, as percentage of image height.
    pub top_position_pct: f32,
    /// Vertical position of the bottom text baseline, as percentage of image height.
    pub bottom_position_pct: f32,
}

impl Default for StyleParameters {
    fn default() -> Self {
        StyleParameters{
            top_text: String::new(),
            bottom_text: String::new(),
            font_size_px: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY,
            text_color: DEFAULT_TEXT_COLOR,
            stroke_color: DEFAULT_STROKE_COLOR,
            stroke_width_px: DEFAULT_STROKE_WIDTH,
            top_position_pct: DEFAULT_TOP_POSITION,
            bottom_position_pct: DEFAULT_BOTTOM_POSITION,
        }
    }
}

impl StyleParameters {
    /// The font that the captions should be rendered with.
    #[inline]
    pub fn font(&self) -> FontSpec {
        FontSpec::new(self.font_size_px, self.font_family)
    }

    /// Whether there is any caption text to render.
    #[inline]
    pub fn has_text(&self) -> bool {
        !self.top_text.is_empty() || !self.bottom_text.is_empty()
    }

    /// Y coordinate of the top text baseline on an image of given height.
    #[inline]
    pub fn top_y(&self, height: u32) -> f32 {
        position_y(self.top_position_pct, height)
    }

    /// Y coordinate of the bottom text baseline on an image of given height.
    #[inline]
    pub fn bottom_y(&self, height: u32) -> f32 {
        position_y(self.bottom_position_pct, height)
    }
}

impl StyleParameters {
    /// Merge a partial update into these parameters.
    ///
    /// Values are taken as-is, without any range checks.
    pub fn apply(&mut self, update: StyleUpdate) {
        let StyleUpdate{
            top_text, bottom_text,
            font_size_px, font_family,
            text_color, stroke_color, stroke_width_px,
            top_position_pct, bottom_position_pct,
        } = update;

        if let Some(v) = top_text { self.top_text = v; }
        if let Some(v) = bottom_text { self.bottom_text = v; }
        if let Some(v) = font_size_px { self.font_size_px = v; }
        if let Some(v) = font_family { self.font_family = v; }
        if let Some(v) = text_color { self.text_color = v; }
        if let Some(v) = stroke_color { self.stroke_color = v; }
        if let Some(v) = stroke_width_px { self.stroke_width_px = v; }
        if let Some(v) = top_position_pct { self.top_position_pct = v; }
        if let Some(v) = bottom_position_pct { self.bottom_position_pct = v; }
    }

    /// Return a copy of these parameters with all numbers
    /// brought within their allowed ranges.
    ///
    /// Stroke width is also snapped to its step, and NaNs are replaced with defaults.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.font_size_px = clamp(self.font_size_px, FONT_SIZE_RANGE, DEFAULT_FONT_SIZE);
        self.stroke_width_px = clamp(
            (self.stroke_width_px / STROKE_WIDTH_STEP).round() * STROKE_WIDTH_STEP,
            STROKE_WIDTH_RANGE, DEFAULT_STROKE_WIDTH);
        self.top_position_pct = clamp(
            self.top_position_pct, TOP_POSITION_RANGE, DEFAULT_TOP_POSITION);
        self.bottom_position_pct = clamp(
            self.bottom_position_pct, BOTTOM_POSITION_RANGE, DEFAULT_BOTTOM_POSITION);
        self
    }
}

#[inline]
fn position_y(pct: f32, height: u32) -> f32 {
    (pct / 100.0) * height as f32
}

fn clamp(value: f32, range: RangeInclusive<f32>, default: f32) -> f32 {
    if value.is_nan() {
        return default;
    }
    value.max(*range.start()).min(*range.end())
}


/// Partial update of `StyleParameters`.
///
/// Fields that are `None` leave the corresponding parameter unchanged.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleUpdate {
    pub top_text: Option<String>,
    pub bottom_text: Option<String>,
    pub font_size_px: Option<f32>,
    pub font_family: Option<FontFamily>,
    pub text_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width_px: Option<f32>,
    pub top_position_pct: Option<f32>,
    pub bottom_position_pct: Option<f32>,
}

impl StyleUpdate {
    /// Whether the update doesn't change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<StyleParameters> for StyleUpdate {
    /// Create an update that replaces all the parameters wholesale.
    fn from(style: StyleParameters) -> Self {
        StyleUpdate{
            top_text: Some(style.top_text),
            bottom_text: Some(style.bottom_text),
            font_size_px: Some(style.font_size_px),
            font_family: Some(style.font_family),
            text_color: Some(style.text_color),
            stroke_color: Some(style.stroke_color),
            stroke_width_px: Some(style.stroke_width_px),
            top_position_pct: Some(style.top_position_pct),
            bottom_position_pct: Some(style.bottom_position_pct),
        }
    }
}
