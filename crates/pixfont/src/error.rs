use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("invalid glyph on line {line}: {reason}")]
    InvalidGlyphLine { line: usize, reason: String },
    #[error("pixel buffer holds {actual} entries, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("archive error: {0}")]
    Archive(String),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FontError>;
