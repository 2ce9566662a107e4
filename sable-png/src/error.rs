//! Decode and encode error types.
use std::fmt::{Debug, Display, Formatter};
use std::io;

use zune_inflate::errors::InflateDecodeErrors;

/// Errors arising when decoding a PNG stream
pub enum PngDecodeErrors {
    /// Magic bytes at the start of the stream are not a PNG signature
    BadSignature,
    /// A chunk type byte fell outside `A-Z`/`a-z`
    InvalidChunkType([u8; 4]),
    /// A chunk the decoder does not know, but whose type marks it
    /// as necessary for a faithful decode
    UnsupportedCritical([u8; 4]),
    /// A chunk appeared somewhere the format forbids
    ChunkOrder(&'static str),
    /// IHDR carried an unsupported depth, color type, compression,
    /// filter or interlace field
    BadIhdr(String),
    /// Stored and computed checksums disagree, `(stored, computed)`
    BadCrc(u32, u32),
    /// The stream ended while the decoder still expected bytes
    Truncated(&'static str),
    /// Bytes remained once the image was fully decoded
    ExtraData(usize),
    /// A scanline began with a filter byte outside `0..=4`
    BadFilterType(u8),
    /// A palette image referenced an entry past the palette end,
    /// `(index, palette length)`
    PaletteIndex(u8, usize),
    /// A palette image carried no PLTE chunk
    EmptyPalette,
    /// Raster gamma that cannot be corrected for
    UnsupportedGamma(f64),
    /// The deflate collaborator gave up on the IDAT stream
    Inflate(InflateDecodeErrors),
    GenericStatic(&'static str),
    Generic(String)
}

impl Debug for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadSignature => writeln!(f, "Bad PNG signature, not a png"),
            Self::InvalidChunkType(chunk) => {
                writeln!(f, "Invalid chunk type {chunk:?}, bytes are not ASCII letters")
            }
            Self::UnsupportedCritical(chunk) => {
                let name = std::str::from_utf8(chunk).unwrap_or("XXXX");
                writeln!(f, "Chunk {name:?} is unknown but marked as critical")
            }
            Self::ChunkOrder(reason) => writeln!(f, "Chunk ordering violated: {reason}"),
            Self::BadIhdr(reason) => writeln!(f, "Bad IHDR: {reason}"),
            Self::BadCrc(stored, computed) => writeln!(
                f,
                "CRC does not match, stream stored {stored:08X} but computed {computed:08X}",
            ),
            Self::Truncated(reason) => writeln!(f, "Stream ended unexpectedly: {reason}"),
            Self::ExtraData(count) => {
                writeln!(f, "{count} bytes remaining after the image ended")
            }
            Self::BadFilterType(filter) => writeln!(f, "Unknown filter type {filter}"),
            Self::PaletteIndex(index, length) => writeln!(
                f,
                "Palette index {index} out of range, palette has {length} entries"
            ),
            Self::EmptyPalette => writeln!(f, "Indexed image without a PLTE chunk"),
            Self::UnsupportedGamma(gamma) => {
                writeln!(f, "Cannot gamma correct with gamma value {gamma}")
            }
            Self::Inflate(err) => writeln!(f, "Error decoding idat chunks: {err:?}"),
            Self::GenericStatic(val) => writeln!(f, "{val}"),
            Self::Generic(val) => writeln!(f, "{val}")
        }
    }
}

impl Display for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for PngDecodeErrors {}

impl From<&'static str> for PngDecodeErrors {
    // the byte reader reports exhaustion through bare messages
    fn from(val: &'static str) -> Self {
        Self::Truncated(val)
    }
}

impl From<String> for PngDecodeErrors {
    fn from(val: String) -> Self {
        Self::Generic(val)
    }
}

impl From<InflateDecodeErrors> for PngDecodeErrors {
    fn from(val: InflateDecodeErrors) -> Self {
        Self::Inflate(val)
    }
}

/// Errors arising when encoding an image into a PNG stream
pub enum PngEncodeErrors {
    Static(&'static str),
    /// Input buffer does not match the dimensions promised by the
    /// options, `(expected, found)`
    TooShortInput(usize, usize),
    /// The combination of colorspace and depth asked for is not
    /// one the encoder can write
    UnsupportedOption(&'static str),
    /// The deflate collaborator failed
    CompressionFailed(io::Error)
}

impl Debug for PngEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(reason) => writeln!(f, "{reason}"),
            Self::TooShortInput(expected, found) => {
                writeln!(f, "Expected input of length {expected} but found {found}")
            }
            Self::UnsupportedOption(option) => {
                writeln!(f, "Unsupported encoder option: {option}")
            }
            Self::CompressionFailed(err) => writeln!(f, "Compression failed: {err}")
        }
    }
}

impl Display for PngEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for PngEncodeErrors {}

impl From<io::Error> for PngEncodeErrors {
    fn from(err: io::Error) -> Self {
        Self::CompressionFailed(err)
    }
}
