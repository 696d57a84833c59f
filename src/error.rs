use std::io;

/// Describes an error that might happen when loading, saving or querying glyph widths.
#[derive(Debug)]
pub enum WidthError {
    /// A header or a record was shorter than 8 bytes.
    CorruptData,
    /// The underlying stream failed for any other reason.
    Io(io::Error),
    /// A nearest-width query was made but no space glyph has been indexed.
    EmptyIndex,
    /// A bitmap glyph sheet cannot be divided into glyph cells.
    InvalidSheet(&'static str),
    /// A bitmap glyph sheet image failed to decode.
    Image(image::ImageError),
}

pub type Result<T> = std::result::Result<T, WidthError>;

impl std::fmt::Display for WidthError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WidthError::CorruptData => write!(f, "corrupt glyph data"),
            WidthError::Io(e) => write!(f, "i/o error while accessing glyph data: {}", e),
            WidthError::EmptyIndex => write!(f, "no space glyph data loaded"),
            WidthError::InvalidSheet(reason) => write!(f, "invalid glyph sheet: {}", reason),
            WidthError::Image(e) => write!(f, "failed to decode glyph sheet: {}", e),
        }
    }
}

impl std::error::Error for WidthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WidthError::Io(e) => Some(e),
            WidthError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WidthError {
    fn from(e: io::Error) -> WidthError {
        WidthError::Io(e)
    }
}

impl From<image::ImageError> for WidthError {
    fn from(e: image::ImageError) -> WidthError {
        WidthError::Image(e)
    }
}
