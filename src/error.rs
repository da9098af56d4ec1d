//! Error types for the PNM codec and pixel matrix.

use crate::core_modules::image::Image;
use crate::core_modules::pixel::pixel::PixelKind;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PnmError>;

/// Errors surfaced by reading, writing, allocating or transforming images.
#[derive(Debug, thiserror::Error)]
pub enum PnmError {
    /// Opening, reading or writing the underlying stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The header is not a binary P5/P6 header this codec understands.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// The caller asked for one pixel kind and the file holds the other.
    #[error("kind mismatch: requested {requested}, file is {found}")]
    KindMismatch {
        requested: PixelKind,
        found: PixelKind,
    },

    /// Pixel storage for the requested dimensions could not be obtained.
    #[error("could not allocate a {width}x{height} pixel matrix")]
    Allocation { width: u32, height: u32 },

    /// The payload ended before every pixel promised by the header was read.
    /// `partial` holds the image with the unread cells left zeroed.
    #[error("truncated payload: read {read} of {expected} pixels")]
    TruncatedPayload {
        expected: usize,
        read: usize,
        partial: Box<Image>,
    },

    /// Two matrices taking part in one operation have different dimensions.
    #[error("dimension mismatch: {dest_width}x{dest_height} vs {src_width}x{src_height}")]
    DimensionMismatch {
        dest_width: u32,
        dest_height: u32,
        src_width: u32,
        src_height: u32,
    },
}

/// Malformed or unsupported header contents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The stream does not start with `P` followed by a digit.
    #[error("bad magic number {0:?}")]
    BadMagic(Vec<u8>),

    /// A PNM variant other than P5/P6 (ASCII, bitmap, PAM).
    #[error("unsupported PNM kind P{}", magic_char(.0))]
    UnsupportedKind(u8),

    /// Only a maxval of 255 is supported.
    #[error("unsupported maxval {0}, only 255 is supported")]
    UnsupportedMaxval(u32),

    /// A header field was expected but something else was found.
    #[error("missing header field: {0}")]
    MissingField(&'static str),

    /// A header field does not fit in 32 bits.
    #[error("header field out of range: {0}")]
    InvalidNumber(&'static str),

    /// The stream ended while the header was still being parsed.
    #[error("end of file reached while reading {0}")]
    UnexpectedEof(&'static str),

    /// Bytes follow the last pixel and trailing data is rejected by config.
    #[error("{0} bytes of trailing data after the payload")]
    TrailingData(usize),
}

fn magic_char(digit: &u8) -> char {
    char::from(*digit)
}
