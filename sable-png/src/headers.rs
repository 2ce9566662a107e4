//! Parsers for individual chunk bodies.
//!
//! The chunk loops (one shot and streaming) hand fully buffered,
//! checksum verified bodies in here, these functions only deal with
//! the semantics.
use log::{info, trace, warn};
use sable_core::bytestream::ByteReader;

use crate::constants::GAMMA_SCALE;
use crate::decoder::{DecoderContext, PLTEEntry, PngChunk};
use crate::enums::{InterlaceMethod, PngColor};
use crate::error::PngDecodeErrors;

pub(crate) mod writers;

/// Callback invoked for chunks the decoder does not understand.
///
/// Returning an error aborts the decode, returning `Ok` skips the
/// chunk. The body itself is not exposed, a handler only sees the
/// header.
pub type UnknownChunkHandler = fn(chunk: &PngChunk) -> Result<(), PngDecodeErrors>;

/// The default unknown chunk policy: error when the chunk is marked
/// critical, skip it otherwise
pub fn default_chunk_handler(chunk: &PngChunk) -> Result<(), PngDecodeErrors> {
    let chunk_name = std::str::from_utf8(&chunk.chunk).unwrap_or("XXXX");

    if chunk.chunk[0] & (1 << 5) == 0 {
        return Err(PngDecodeErrors::UnsupportedCritical(chunk.chunk));
    }

    trace!("encountered unknown chunk {chunk_name:?}");
    trace!("skipping {} bytes of chunk data", chunk.length);

    Ok(())
}

impl DecoderContext {
    pub(crate) fn parse_ihdr(
        &mut self, chunk: &PngChunk, body: &[u8]
    ) -> Result<(), PngDecodeErrors> {
        if self.seen_hdr {
            return Err(PngDecodeErrors::ChunkOrder("multiple IHDR chunks"));
        }
        if chunk.length != 13 || body.len() != 13 {
            return Err(PngDecodeErrors::BadIhdr(format!(
                "invalid IHDR length {}",
                chunk.length
            )));
        }

        let mut stream = ByteReader::new(body);

        self.png_info.width = stream.get_u32_be() as usize;
        self.png_info.height = stream.get_u32_be() as usize;

        if self.png_info.width == 0 || self.png_info.height == 0 {
            return Err(PngDecodeErrors::BadIhdr(
                "width or height cannot be zero".to_string()
            ));
        }

        if self.png_info.width > self.options.get_max_width() {
            return Err(PngDecodeErrors::Generic(format!(
                "image width {}, larger than maximum configured width {}, aborting",
                self.png_info.width,
                self.options.get_max_width()
            )));
        }
        if self.png_info.height > self.options.get_max_height() {
            return Err(PngDecodeErrors::Generic(format!(
                "image height {}, larger than maximum configured height {}, aborting",
                self.png_info.height,
                self.options.get_max_height()
            )));
        }

        self.png_info.depth = stream.get_u8();

        let color = stream.get_u8();

        if let Some(img_color) = PngColor::from_int(color) {
            self.png_info.color = img_color;
        } else {
            return Err(PngDecodeErrors::BadIhdr(format!(
                "unknown color type {color}"
            )));
        }
        self.png_info.component = self.png_info.color.num_components();

        // verify color and bit depth agree
        match self.png_info.depth {
            1 | 2 | 4 => {
                if !matches!(self.png_info.color, PngColor::Luma | PngColor::Palette) {
                    return Err(PngDecodeErrors::BadIhdr(format!(
                        "depth {} is only valid for grayscale and indexed images",
                        self.png_info.depth
                    )));
                }
            }
            8 => { /* every color type allows it */ }
            16 => {
                if self.png_info.color == PngColor::Palette {
                    return Err(PngDecodeErrors::BadIhdr(
                        "indexed color cannot have 16 bit depth".to_string()
                    ));
                }
            }
            _ => {
                return Err(PngDecodeErrors::BadIhdr(format!(
                    "unknown bit depth {}",
                    self.png_info.depth
                )))
            }
        }

        if stream.get_u8() != 0 {
            return Err(PngDecodeErrors::BadIhdr(
                "unknown compression method".to_string()
            ));
        }
        if stream.get_u8() != 0 {
            return Err(PngDecodeErrors::BadIhdr("unknown filter method".to_string()));
        }

        let interlace = stream.get_u8();

        if let Some(method) = InterlaceMethod::from_int(interlace) {
            self.png_info.interlace_method = method;
        } else {
            return Err(PngDecodeErrors::BadIhdr(format!(
                "unknown interlace method {interlace}"
            )));
        }

        info!("width: {}", self.png_info.width);
        info!("height: {}", self.png_info.height);
        info!("depth: {}", self.png_info.depth);
        info!("color type: {:?}", self.png_info.color);
        info!("interlace: {:?}", self.png_info.interlace_method);

        self.seen_hdr = true;

        Ok(())
    }

    pub(crate) fn parse_plte(
        &mut self, chunk: &PngChunk, body: &[u8]
    ) -> Result<(), PngDecodeErrors> {
        if self.seen_idat {
            return Err(PngDecodeErrors::ChunkOrder("PLTE chunk after the first IDAT"));
        }
        if chunk.length % 3 != 0 {
            return Err(PngDecodeErrors::GenericStatic("invalid PLTE length, corrupt PNG"));
        }
        if chunk.length > 256 * 3 {
            return Err(PngDecodeErrors::Generic(format!(
                "PLTE length {} holds more than 256 entries",
                chunk.length
            )));
        }

        self.palette.resize(256, PLTEEntry::default());
        self.palette_size = chunk.length / 3;

        let mut stream = ByteReader::new(body);

        for pal_chunk in self.palette.iter_mut().take(self.palette_size) {
            pal_chunk.red = stream.get_u8();
            pal_chunk.green = stream.get_u8();
            pal_chunk.blue = stream.get_u8();
        }

        self.seen_ptle = true;

        Ok(())
    }

    pub(crate) fn parse_trns(
        &mut self, chunk: &PngChunk, body: &[u8]
    ) -> Result<(), PngDecodeErrors> {
        if self.seen_idat {
            return Err(PngDecodeErrors::ChunkOrder("tRNS chunk after the first IDAT"));
        }

        let mut stream = ByteReader::new(body);

        match self.png_info.color {
            PngColor::Luma => {
                self.trns_bytes[0] = stream.get_u16_be();
            }
            PngColor::RGB => {
                self.trns_bytes[0] = stream.get_u16_be();
                self.trns_bytes[1] = stream.get_u16_be();
                self.trns_bytes[2] = stream.get_u16_be();
            }
            PngColor::Palette => {
                if !self.seen_ptle || self.palette.is_empty() {
                    return Err(PngDecodeErrors::ChunkOrder("tRNS chunk before PLTE"));
                }
                if self.palette_size < chunk.length {
                    return Err(PngDecodeErrors::Generic(format!(
                        "tRNS chunk with {} entries for a {} entry palette",
                        chunk.length, self.palette_size
                    )));
                }
                for (entry, alpha) in self.palette.iter_mut().zip(body) {
                    entry.alpha = *alpha;
                }
            }
            _ => {
                return Err(PngDecodeErrors::Generic(format!(
                    "a tRNS chunk shall not appear for color type {:?}, it already carries alpha",
                    self.png_info.color
                )));
            }
        }

        self.seen_trns = true;

        Ok(())
    }

    pub(crate) fn parse_gama(
        &mut self, chunk: &PngChunk, body: &[u8]
    ) -> Result<(), PngDecodeErrors> {
        if self.seen_ptle || self.seen_idat {
            return Err(PngDecodeErrors::ChunkOrder("gAMA chunk after PLTE or IDAT"));
        }

        if chunk.length != 4 {
            if self.options.get_strict_mode() {
                return Err(PngDecodeErrors::Generic(format!(
                    "gAMA chunk length is not 4 but {}",
                    chunk.length
                )));
            }
            warn!("invalid gAMA chunk length {}, ignoring the chunk", chunk.length);

            return Ok(());
        }

        let mut stream = ByteReader::new(body);

        self.gamma = f64::from(stream.get_u32_be()) / GAMMA_SCALE;

        if self.gamma == 0.0 {
            // zero encodes nothing useful, treat the gamma as unset
            warn!("gAMA value of zero is invalid, leaving gamma unset");
        }
        self.seen_gamma = true;

        Ok(())
    }
}
