//! Module for loading fonts used to render captions.

use std::fmt;
use std::fs;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::model::FontFamily;
use crate::util::cache::ThreadSafeCache;


pub const FILE_EXTENSION: &str = "ttf";


/// Font that can be used to render captions.
pub struct Font {
    family: FontFamily,
    inner: rusttype::Font<'static>,
}

impl Font {
    /// Parse a font of given family from the bytes of a TTF/OTF file.
    pub fn from_bytes(family: FontFamily, bytes: Vec<u8>) -> Result<Self, FontError> {
        let inner = rusttype::Font::try_from_vec(bytes)
            .ok_or(FontError::Invalid(family))?;
        Ok(Font{family, inner})
    }

    /// Family this font was loaded for.
    ///
    /// If the family had to be substituted, this is the substitute.
    #[inline]
    pub fn family(&self) -> FontFamily {
        self.family
    }
}

impl Deref for Font {
    type Target = rusttype::Font<'static>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Font({})", self.family)
    }
}


/// Loads fonts from a directory of `{file_stem}.ttf` files
/// and caches them in memory.
#[derive(Debug)]
pub struct FontLoader {
    directory: PathBuf,
    cache: ThreadSafeCache<FontFamily, Font>,
}

impl FontLoader {
    pub fn new<D: AsRef<Path>>(directory: D) -> Self {
        FontLoader{
            directory: directory.as_ref().to_owned(),
            cache: ThreadSafeCache::new(),
        }
    }

    /// Create a `FontLoader` whose cache is seeded with the given font bytes.
    ///
    /// The loader still looks into its directory for the other families.
    pub fn with_font<D: AsRef<Path>>(directory: D,
                                     family: FontFamily,
                                     bytes: Vec<u8>) -> Result<Self, FontError> {
        let loader = Self::new(directory);
        loader.cache.put(family, Font::from_bytes(family, bytes)?);
        Ok(loader)
    }
}

impl FontLoader {
    #[inline]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The internal font cache.
    /// This can be used to examine cache statistics (hits & misses).
    #[inline]
    pub fn cache(&self) -> &ThreadSafeCache<FontFamily, Font> {
        &self.cache
    }

    /// Path to the file that given font family would be loaded from.
    pub fn path_for(&self, family: FontFamily) -> PathBuf {
        self.directory.join(format!("{}.{}", family.file_stem(), FILE_EXTENSION))
    }

    /// List the font families that can be loaded.
    pub fn available(&self) -> Vec<FontFamily> {
        let result: Vec<_> = FontFamily::iter()
            .filter(|&f| self.cache.contains_key(&f) || self.path_for(f).is_file())
            .collect();
        debug!("{} font(s) available in {}", result.len(), self.directory.display());
        result
    }
}

impl FontLoader {
    /// Load the font of given family, from cache if possible.
    pub fn load(&self, family: FontFamily) -> Result<Arc<Font>, FontError> {
        if let Some(font) = self.cache.get(&family) {
            return Ok(font);
        }

        let path = self.path_for(family);
        trace!("Loading font `{}` from {}", family, path.display());
        let bytes = fs::read(&path).map_err(|e| FontError::Io{path: path.clone(), source: e})?;
        let font = Font::from_bytes(family, bytes)?;
        debug!("Font `{}` loaded successfully", family);
        Ok(self.cache.put(family, font))
    }

    /// Load the font of given family or, if it's unavailable,
    /// the first other family that can be loaded.
    pub fn load_or_fallback(&self, family: FontFamily) -> Result<Arc<Font>, FontError> {
        let err = match self.load(family) {
            Ok(font) => return Ok(font),
            Err(e) => e,
        };
        for other in FontFamily::iter().filter(|&f| f != family) {
            if let Ok(font) = self.load(other) {
                warn!("Cannot load font `{}` ({}), falling back to `{}`", family, err, other);
                return Ok(font);
            }
        }
        error!("No fonts could be loaded from {}", self.directory.display());
        Err(err)
    }
}


/// Error that may occur while loading a font.
#[derive(Debug, Error)]
pub enum FontError {
    /// Error while reading the font file.
    #[error("cannot read font file {}: {}", .path.display(), .source)]
    Io { path: PathBuf, source: io::Error },
    /// The font file couldn't be parsed.
    #[error("invalid font data for `{0}`")]
    Invalid(FontFamily),
}
