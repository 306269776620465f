//! Deserializer for the FontFamily type.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Visitor};

use super::super::FontFamily;


const EXPECTING_MSG: &str = "name of a font family";


impl<'de> Deserialize<'de> for FontFamily {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: de::Deserializer<'de>
    {
        deserializer.deserialize_str(FontFamilyVisitor)
    }
}

struct FontFamilyVisitor;
impl<'de> Visitor<'de> for FontFamilyVisitor {
    type Value = FontFamily;

    fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", EXPECTING_MSG)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        FontFamily::from_str(v).map_err(|e| {
            warn!("Failed to parse font family `{}`: {}", v, e);
            E::custom(e)
        })
    }
}
