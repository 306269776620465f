//! Module defining the text alignment enum.


/// Horizontal alignment of text relative to its anchor point.
///
/// The semantics are the same as the `textAlign` property
/// of the HTML canvas 2D context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Text starts at the anchor.
    Left,
    /// Text is centered on the anchor.
    Center,
    /// Text ends at the anchor.
    Right,
}

impl Default for TextAlign {
    fn default() -> Self {
        TextAlign::Left
    }
}

impl TextAlign {
    /// Horizontal position where text of given advance width should start
    /// so that it's aligned to `anchor_x`.
    #[inline]
    pub fn start_x(self, anchor_x: f32, advance_width: f32) -> f32 {
        match self {
            TextAlign::Left => anchor_x,
            TextAlign::Center => anchor_x - advance_width / 2.0,
            TextAlign::Right => anchor_x - advance_width,
        }
    }
}


#[cfg(test)]
mod tests {
    use spectral::prelude::*;
    use super::TextAlign;

    #[test]
    fn start_x() {
        assert_that!(TextAlign::Left.start_x(200.0, 100.0)).is_equal_to(200.0);
        assert_that!(TextAlign::Center.start_x(200.0, 100.0)).is_equal_to(150.0);
        assert_that!(TextAlign::Right.start_x(200.0, 100.0)).is_equal_to(100.0);
    }
}
