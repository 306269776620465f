//! Deserializer for the Color type.

use std::fmt;
use std::str::FromStr;

use csscolorparser::ParseColorError as CssColorParseError;
use serde::de::{self, Deserialize, Visitor};
use thiserror::Error;

use super::super::Color;


const CHANNEL_COUNT: usize = 3;
const EXPECTING_MSG: &str = "CSS color string or array of RGB values";


impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: de::Deserializer<'de>
    {
        deserializer.deserialize_any(ColorVisitor)
    }
}

struct ColorVisitor;
impl<'de> Visitor<'de> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", EXPECTING_MSG)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Color::from_str(v).map_err(|e| {
            warn!("Failed to parse color `{}`: {}", v, e);
            E::custom(e)
        })
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where A: de::SeqAccess<'de>
    {
        let expected = format!("{}", CHANNEL_COUNT);
        if let Some(size) = seq.size_hint() {
            if size != CHANNEL_COUNT {
                return Err(de::Error::invalid_length(size, &expected.as_str()));
            }
        }

        let mut channels = [0u8; CHANNEL_COUNT];
        let mut count = 0;
        while let Some(elem) = seq.next_element::<u8>()? {
            if count == CHANNEL_COUNT {
                return Err(de::Error::invalid_length(count + 1, &expected.as_str()));
            }
            channels[count] = elem;
            count += 1;
        }
        if count != CHANNEL_COUNT {
            return Err(de::Error::invalid_length(count, &expected.as_str()));
        }

        let [r, g, b] = channels;
        Ok(Color(r, g, b))
    }
}


impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(v: &str) -> Result<Self, Self::Err> {
        // Normalize the other common hex prefixes to the CSS one.
        let mut s = v.trim().to_lowercase();
        for &prefix in ["0x", "$"].iter() {
            if let Some(rest) = s.strip_prefix(prefix) {
                // These prefixes only make sense with the full 24-bit number.
                if rest.len() != 6 {
                    return Err(ColorParseError::Css(CssColorParseError::InvalidHex));
                }
                s = format!("#{}", rest);
                break;
            }
        }

        let css_color = csscolorparser::parse(&s)?;
        if css_color.a < 1.0 {
            return Err(ColorParseError::Alpha(css_color.a));
        }

        let [r, g, b, _] = css_color.to_rgba8();
        Ok(Color(r, g, b))
    }
}


/// Error that may occur while parsing a Color.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ColorParseError {
    /// Error while trying to parse a string as CSS color.
    #[error("invalid CSS color syntax: {0}")]
    Css(#[from] CssColorParseError),
    /// Error for when the color includes an alpha channel value.
    #[error("color transparency not supported (alpha = {0})")]
    Alpha(f64),
}


#[cfg(test)]
mod tests {
    mod generic {
        use serde_test::{assert_de_tokens, assert_de_tokens_error, Token as T};
        use super::super::{Color, EXPECTING_MSG};

        #[test]
        fn must_be_valid_type() {
            assert_de_tokens_error::<Color>(
                &[T::Unit],
                &format!("invalid type: unit value, expected {}", EXPECTING_MSG));
            assert_de_tokens_error::<Color>(
                &[T::Bool(false)],
                &format!("invalid type: boolean `false`, expected {}", EXPECTING_MSG));
        }

        #[test]
        fn can_be_css_color() {
            assert_de_tokens(&Color(255, 0, 0), &[T::Str("red")]);
            assert_de_tokens(&Color(255, 99, 71), &[T::Str("tomato")]);
            assert_de_tokens(&Color(0xff, 0xff, 0xff), &[T::Str("#ffffff")]);
            assert_de_tokens_error::<Color>(
                &[T::Str("uwotm8")], "invalid CSS color syntax: invalid unknown format");
        }

        #[test]
        fn can_be_rgb_sequence() {
            assert_de_tokens(&Color(1, 2, 3), &[
                T::Seq{len: Some(3)}, T::U8(1), T::U8(2), T::U8(3), T::SeqEnd]);
            assert_de_tokens(&Color(1, 2, 3), &[
                T::Seq{len: None}, T::U8(1), T::U8(2), T::U8(3), T::SeqEnd]);
            assert_de_tokens(&Color(1, 2, 3), &[
                T::Tuple{len: 3}, T::U8(1), T::U8(2), T::U8(3), T::TupleEnd]);
            // Must be exactly 3 elements.
            assert_de_tokens_error::<Color>(&[T::Seq{len: Some(7)}], "invalid length 7, expected 3");
            assert_de_tokens_error::<Color>(&[
                T::Seq{len: None}, T::U8(1), T::U8(2), T::SeqEnd,
            ], "invalid length 2, expected 3");
            assert_de_tokens_error::<Color>(&[
                T::Seq{len: None}, T::U8(1), T::U8(2), T::U8(3), T::U8(4),
            ], "invalid length 4, expected 3");
        }
    }

    mod from_str {
        use std::str::FromStr;
        use spectral::prelude::*;
        use super::super::{Color, ColorParseError};

        #[test]
        fn named_colors() {
            assert_that!(Color::from_str("black")).is_ok().is_equal_to(Color(0, 0, 0));
            assert_that!(Color::from_str("white")).is_ok().is_equal_to(Color(0xff, 0xff, 0xff));
            assert_that!(Color::from_str("lime")).is_ok().is_equal_to(Color(0, 0xff, 0));
            assert_that!(Color::from_str("gray")).is_ok().is_equal_to(Color(0x80, 0x80, 0x80));
            assert_that!(Color::from_str("crimson")).is_ok().is_equal_to(Color(220, 20, 60));
            assert_that!(Color::from_str("  Yellow ")).is_ok().is_equal_to(Color(0xff, 0xff, 0));
        }

        #[test]
        fn html_rgb() {
            assert_that!(Color::from_str("#0f0")).is_ok().is_equal_to(Color(0, 0xff, 0));
            assert_that!(Color::from_str("#00ff00")).is_ok().is_equal_to(Color(0, 0xff, 0));
            assert_that!(Color::from_str("#FFFFFF")).is_ok().is_equal_to(Color(0xff, 0xff, 0xff));
            assert_that!(Color::from_str("0xff0000")).is_ok().is_equal_to(Color(0xff, 0, 0));
            assert_that!(Color::from_str("$0000ff")).is_ok().is_equal_to(Color(0, 0, 0xff));
            // Short forms only work with the CSS prefix.
            assert_that!(Color::from_str("0xf0f")).is_err();
            assert_that!(Color::from_str("$ff0")).is_err();
        }

        #[test]
        fn css_functions() {
            assert_that!(Color::from_str("rgb(1, 2, 3)")).is_ok().is_equal_to(Color(1, 2, 3));
            assert_that!(Color::from_str("hsl(0, 100%, 50%)")).is_ok().is_equal_to(Color(0xff, 0, 0));
        }

        #[test]
        fn transparency_not_supported() {
            assert_that!(Color::from_str("transparent"))
                .is_err().is_equal_to(ColorParseError::Alpha(0.0));
            assert_that!(Color::from_str("rgba(0, 0, 0, 0.5)"))
                .is_err().is_equal_to(ColorParseError::Alpha(0.5));
        }
    }
}
