//! Module with compositor configuration.


/// Structure holding configuration for the `Compositor`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Quality of the exported JPEG images (in %).
    pub jpeg_quality: u8,
}

impl Default for Config {
    /// Initialize Config with default values.
    fn default() -> Self {
        Config {
            jpeg_quality: 85,
        }
    }
}
