//! Deserializers for data model types.

mod color;
mod font;

pub use self::color::ColorParseError;
