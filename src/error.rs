use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Not a RIFF/WAVE stream, a chunk is missing or truncated, or the file
    /// format has no codec.
    #[error("format error: {0}")]
    Format(String),

    /// Compressed audio, channel counts other than mono/stereo, or bit depths
    /// other than 8, 16 and 24.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The derived `fmt ` fields disagree with each other.
    #[error("inconsistent header: {0}")]
    HeaderInconsistency(String),

    /// The encoder produced sizes that do not match its own output.
    #[error("internal consistency check failed: {0}")]
    InternalConsistency(String),

    #[error("invalid audio buffer: {0}")]
    InvalidBuffer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }
}
