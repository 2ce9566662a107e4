//! A PNG decoder and encoder.
//!
//! Covers the PNG-1.2 still image feature set: all five color types,
//! bit depths 1 through 16, Adam7 interlacing, scanline filters,
//! simple transparency and gamma.
//!
//! # Decoding
//!
//! [`PngDecoder::decode`] normalizes every input to tightly packed
//! 8 bit RGBA:
//!
//! ```no_run
//! use sable_png::PngDecoder;
//!
//! let data = std::fs::read("image.png").unwrap();
//!
//! let raster = PngDecoder::new(&data).decode().unwrap();
//! let (width, height) = (raster.width(), raster.height());
//! ```
//!
//! [`PngDecoder::decode_raw`] skips normalization and returns pixels
//! in the file's own colorspace, and [`StreamingDecoder`] produces
//! the same results from input arriving in pieces.
//!
//! # Encoding
//!
//! ```
//! use sable_core::bit_depth::BitDepth;
//! use sable_core::colorspace::ColorSpace;
//! use sable_core::options::EncoderOptions;
//! use sable_png::PngEncoder;
//!
//! let pixels = vec![255_u8; 4 * 8 * 8];
//! let options = EncoderOptions::new(8, 8, ColorSpace::RGBA, BitDepth::Eight);
//!
//! let png = PngEncoder::new(&pixels, options).encode().unwrap();
//! ```
pub use decoder::{PngChunk, PngDecoder, PngInfo};
pub use encoder::PngEncoder;
pub use enums::{FilterMethod, FilterStrategy, InterlaceMethod, PngChunkType, PngColor};
pub use headers::{default_chunk_handler, UnknownChunkHandler};
pub use raster::Raster;
pub use stream::StreamingDecoder;

mod adam7;
mod constants;
mod crc;
mod decoder;
mod encoder;
mod enums;
pub mod error;
mod filters;
mod gamma;
mod headers;
mod normalize;
mod raster;
mod stream;
