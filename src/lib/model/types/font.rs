//! Module defining the font-related types.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;


/// Font families that captions can be rendered with.
///
/// Deserialized from any of the names accepted by `FromStr`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FontFamily {
    Impact,
    Arial,
    #[serde(rename = "Comic Sans MS")]
    ComicSansMs,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
}

/// All the supported font families, in the order they're offered to users.
pub const FONT_FAMILIES: &[FontFamily] = &[
    FontFamily::Impact,
    FontFamily::Arial,
    FontFamily::ComicSansMs,
    FontFamily::TimesNewRoman,
];

impl FontFamily {
    /// Name of the font family, as used in CSS.
    pub fn css_name(self) -> &'static str {
        match self {
            FontFamily::Impact => "Impact",
            FontFamily::Arial => "Arial",
            FontFamily::ComicSansMs => "Comic Sans MS",
            FontFamily::TimesNewRoman => "Times New Roman",
        }
    }

    /// Stem of the file name (sans extension) the font is loaded from.
    pub fn file_stem(self) -> &'static str {
        match self {
            FontFamily::Impact => "Impact",
            FontFamily::Arial => "Arial",
            FontFamily::ComicSansMs => "Comic_Sans_MS",
            FontFamily::TimesNewRoman => "Times_New_Roman",
        }
    }

    #[inline]
    pub fn iter() -> impl Iterator<Item=FontFamily> {
        FONT_FAMILIES.iter().cloned()
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        FontFamily::Impact
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.css_name())
    }
}

impl FromStr for FontFamily {
    type Err = UnknownFontFamily;

    /// Parse the font family from either its CSS name or its file stem,
    /// ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FontFamily::iter()
            .find(|f| f.css_name().eq_ignore_ascii_case(s)
                   || f.file_stem().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFontFamily(s.to_owned()))
    }
}

/// Error for when a string doesn't name any supported font family.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown font family `{0}`")]
pub struct UnknownFontFamily(pub String);


/// Font used to render a caption: its family and size.
///
/// Displays as a CSS font shorthand, e.g. `40px Impact`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    /// Font size in CSS pixels, i.e. the height of the em square.
    pub size_px: f32,
    pub family: FontFamily,
}

impl FontSpec {
    #[inline]
    pub fn new(size_px: f32, family: FontFamily) -> Self {
        FontSpec{size_px, family}
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}px {}", self.size_px, self.family)
    }
}


#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use serde_test::{assert_ser_tokens, Token as T};
    use spectral::prelude::*;
    use super::{FontFamily, FontSpec, FONT_FAMILIES};

    #[test]
    fn css_font_shorthand() {
        assert_that!(FontSpec::new(40.0, FontFamily::Impact).to_string())
            .is_equal_to("40px Impact".to_owned());
        assert_that!(FontSpec::new(12.5, FontFamily::ComicSansMs).to_string())
            .is_equal_to("12.5px Comic Sans MS".to_owned());
    }

    #[test]
    fn parse_family() {
        assert_that!(FontFamily::from_str("impact")).is_ok().is_equal_to(FontFamily::Impact);
        assert_that!(FontFamily::from_str("Times New Roman")).is_ok()
            .is_equal_to(FontFamily::TimesNewRoman);
        assert_that!(FontFamily::from_str("comic_sans_ms")).is_ok()
            .is_equal_to(FontFamily::ComicSansMs);
        assert_that!(FontFamily::from_str("Wingdings")).is_err();
    }

    #[test]
    fn family_names_roundtrip() {
        for &family in FONT_FAMILIES {
            assert_that!(FontFamily::from_str(family.css_name())).is_ok().is_equal_to(family);
        }
    }

    #[test]
    fn serde_uses_css_names() {
        assert_ser_tokens(&FontFamily::Arial,
            &[T::UnitVariant{name: "FontFamily", variant: "Arial"}]);
        assert_ser_tokens(&FontFamily::TimesNewRoman,
            &[T::UnitVariant{name: "FontFamily", variant: "Times New Roman"}]);
    }
}
