//! Data structures for command-line arguments.

use std::num::ParseFloatError;
use std::path::PathBuf;

use clap;
use conv::errors::RangeError;
use memegen::{ColorParseError, ExportError, ExportFormat, StyleParameters, UnknownFontFamily};
use thiserror::Error;


/// Structure to hold options received from the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// Verbosity of the logging output.
    ///
    /// Corresponds to the number of times the -v flag has been passed.
    /// If -q has been used instead, this will be negative.
    pub verbosity: isize,

    /// Directory with the caption fonts.
    pub font_dir: PathBuf,
    /// URL of the upstream template listing.
    pub upstream_url: String,

    /// What the program should do.
    pub command: Command,
}

#[allow(dead_code)]
impl Options {
    #[inline]
    pub fn verbose(&self) -> bool { self.verbosity > 0 }
    #[inline]
    pub fn quiet(&self) -> bool { self.verbosity < 0 }
}


/// Action requested on the command line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Print the listing of meme templates.
    List,
    /// Render a meme.
    Render(RenderOptions),
}

/// Options for rendering a meme.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Where the meme image comes from.
    pub source: Source,
    /// Captions and their style.
    pub style: StyleParameters,
    /// Format of the final image.
    pub format: ExportFormat,
    /// Path to write the finished meme to.
    ///
    /// If absent, it shall be written to standard output.
    pub output_path: Option<PathBuf>,
}

/// Source of the meme image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// Local image file.
    Image(PathBuf),
    /// Template with given ID.
    Template(String),
    /// Randomly chosen template.
    Random,
}


/// Error that can occur while parsing of command line arguments.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// General when parsing the arguments.
    #[error("invalid arguments: {0}")]
    Parse(#[from] clap::Error),
    /// Neither an image nor a template was given.
    #[error("one of --image, --template or --random is required")]
    NoSource,
    /// Invalid value of a numeric style flag.
    #[error("invalid --{flag}: {error}")]
    Number {
        flag: &'static str,
        #[source] error: NumberError,
    },
    /// Invalid --font.
    #[error("invalid --font: {0}")]
    Font(#[from] UnknownFontFamily),
    /// Invalid --color or --stroke-color.
    #[error("invalid --{flag}: {error}")]
    Color {
        flag: &'static str,
        #[source] error: ColorParseError,
    },
    /// Invalid --format.
    #[error("invalid --format: {0}")]
    Format(#[from] ExportError),
}

/// Error that can occur while parsing a numeric flag.
#[derive(Debug, Error)]
pub enum NumberError {
    /// Error while parsing the value as number.
    #[error("{0}")]
    Parse(#[from] ParseFloatError),
    /// Error for when the value is out of the allowed range.
    #[error("{error} (allowed range is {min}..{max})")]
    Range {
        #[source] error: RangeError<f32>,
        min: f32,
        max: f32,
    },
    /// Error for when the value doesn't fall on the allowed increments.
    #[error("{value} is not a multiple of {step}")]
    Step {
        value: f32,
        step: f32,
    },
}
