//! Defines the output of an export operation.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use mime::{self, Mime};

use crate::model::EXPORT_FILE_STEM;
use super::error::ExportError;


/// Raster format that composite images can be exported to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    /// File extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    /// The MIME type that matches the format.
    pub fn mime_type(self) -> Mime {
        match self {
            ExportFormat::Png => mime::IMAGE_PNG,
            ExportFormat::Jpeg => mime::IMAGE_JPEG,
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Png
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            _ => Err(ExportError::UnsupportedFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.extension())
    }
}


/// Output of the export: encoded bytes of the composite image.
#[derive(Clone, Debug)]
#[must_use = "unused export output which must be used"]
pub struct ExportOutput {
    format: ExportFormat,
    bytes: Vec<u8>,
}

impl ExportOutput {
    #[inline]
    pub(super) fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        ExportOutput{format, bytes}
    }
}

impl ExportOutput {
    /// Image format of the output.
    #[inline]
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Raw bytes of the output.
    ///
    /// See `ExportOutput::format` for how to interpret it.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    /// Convert the output into a vector of bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The MIME type that matches output's format.
    #[inline]
    pub fn mime_type(&self) -> Mime {
        self.format.mime_type()
    }

    /// Name of the file that the output should be downloaded as.
    pub fn file_name(&self) -> String {
        format!("{}.{}", EXPORT_FILE_STEM, self.format.extension())
    }
}

impl Deref for ExportOutput {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.bytes()
    }
}

impl From<ExportOutput> for Vec<u8> {
    fn from(output: ExportOutput) -> Vec<u8> {
        output.into_bytes()
    }
}
