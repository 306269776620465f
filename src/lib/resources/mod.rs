//! Module handling the resources used for rendering captions.

mod fonts;

#[cfg(test)]
pub(crate) use self::fonts::tests::test_font_bytes;
pub use self::fonts::{Font, FontError, FontLoader, FILE_EXTENSION as FONT_FILE_EXTENSION};


use std::env;
use std::path::PathBuf;


lazy_static! {
    /// Default directory to load the fonts from: `data/fonts` under the working directory.
    pub static ref DEFAULT_FONT_DIR: PathBuf =
        env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            .join("data").join("fonts");
}
