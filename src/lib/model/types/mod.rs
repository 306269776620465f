//! Module defining the model types.

mod align;
mod color;
mod font;
mod style;
mod template;

pub use self::align::TextAlign;
pub use self::color::Color;
pub use self::font::{FontFamily, FontSpec, UnknownFontFamily, FONT_FAMILIES};
pub use self::style::{StyleParameters, StyleUpdate};
pub use self::template::Template;
