use std::path::PathBuf;

/// Result alias that carries the custom [`PagerError`] type.
pub type Result<T> = std::result::Result<T, PagerError>;

/// Common error type for the hardware control layer.
///
/// Only [`PagerError::DisplayUnavailable`] is fatal at init. Every other
/// variant is reported for a single call and leaves the device usable.
#[derive(Debug, thiserror::Error)]
pub enum PagerError {
    /// Free-form failure with a readable message.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The framebuffer device could not be opened.
    #[error("display device `{}` is unavailable: {source}", path.display())]
    DisplayUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An optional peripheral or collaborator is not present on this device.
    #[error("{0} is not available")]
    Unavailable(&'static str),
    /// The image collaborator failed to decode a file.
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The font collaborator rejected a font or glyph request.
    #[error("font error: {0}")]
    Font(String),
    /// A shared lock was poisoned by a panicking thread.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
}

impl PagerError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for PagerError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for PagerError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
