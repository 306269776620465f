//! Module implementing the `Color` type.

use std::fmt;

use image::Rgba;
use serde::ser::{Serialize, Serializer};


/// RGB color of the text or its outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Create a white color.
    #[inline]
    pub fn white() -> Self {
        Self::gray(0xff)
    }

    /// Create a black color.
    #[inline]
    pub fn black() -> Self {
        Self::gray(0x0)
    }

    /// Create a gray color of given intensity.
    #[inline]
    pub fn gray(value: u8) -> Self {
        Color(value, value, value)
    }
}

impl Color {
    #[inline]
    pub(crate) fn to_rgba(self, alpha: u8) -> Rgba<u8> {
        let Color(r, g, b) = self;
        Rgba([r, g, b, alpha])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let &Color(r, g, b) = self;
        write!(fmt, "#{:0>2x}{:0>2x}{:0>2x}", r, g, b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


#[cfg(test)]
mod tests {
    use serde_test::{assert_ser_tokens, Token as T};
    use spectral::prelude::*;
    use super::Color;

    #[test]
    fn display_as_html_hex() {
        assert_that!(Color::white().to_string()).is_equal_to("#ffffff".to_owned());
        assert_that!(Color::black().to_string()).is_equal_to("#000000".to_owned());
        assert_that!(Color(0x0a, 0xbc, 0x01).to_string()).is_equal_to("#0abc01".to_owned());
    }

    #[test]
    fn serialize_as_string() {
        assert_ser_tokens(&Color(255, 0, 0), &[T::Str("#ff0000")]);
    }
}
