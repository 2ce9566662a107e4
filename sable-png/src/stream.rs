//! A push fed decoder.
//!
//! [`StreamingDecoder`] accepts input in arbitrary sized pieces and
//! buffers internally until the parser's current demand is satisfied,
//! so a host can interleave reads with its own I/O. The semantic state
//! and the pixel pipeline are shared with the one shot
//! [`PngDecoder`](crate::PngDecoder), only the chunk loop differs.
use log::warn;
use sable_core::options::DecoderOptions;

use crate::constants::PNG_SIGNATURE;
use crate::crc::{crc32_slice, Crc32};
use crate::decoder::{DecoderContext, PngChunk, PngInfo};
use crate::enums::PngChunkType;
use crate::error::PngDecodeErrors;
use crate::headers::UnknownChunkHandler;
use crate::raster::Raster;

/// What the parser is waiting for next
enum State {
    Signature,
    ChunkHeader,
    /// A full chunk body plus its trailing checksum
    ChunkBody { chunk: PngChunk },
    /// IDAT bodies are drained as they arrive rather than buffered
    /// whole, the checksum is folded in incrementally
    IdatBody { remaining: usize, crc: Crc32 },
    IdatCrc { computed: u32 },
    Finished
}

/// A PNG decoder fed by the caller.
///
/// Feed bytes with [`write`](Self::write) as they arrive, in pieces of
/// any size, then call [`end`](Self::end) for the raster. The result
/// is identical to a one shot decode of the concatenated input.
///
/// ```no_run
/// use sable_png::StreamingDecoder;
///
/// let data = std::fs::read("image.png").unwrap();
///
/// let mut decoder = StreamingDecoder::new();
///
/// // any piece size works, one shot included
/// for piece in data.chunks(4096) {
///     decoder.write(piece).unwrap();
/// }
/// let raster = decoder.end().unwrap();
/// ```
pub struct StreamingDecoder {
    ctx:         DecoderContext,
    buffered:    Vec<u8>,
    pos:         usize,
    state:       State,
    first_chunk: bool,
    errored:     bool
}

impl StreamingDecoder {
    pub fn new() -> StreamingDecoder {
        StreamingDecoder::new_with_options(DecoderOptions::default())
    }

    pub fn new_with_options(options: DecoderOptions) -> StreamingDecoder {
        StreamingDecoder {
            ctx:         DecoderContext::new(options),
            buffered:    Vec::new(),
            pos:         0,
            state:       State::Signature,
            first_chunk: true,
            errored:     false
        }
    }

    /// The parsed IHDR fields, present once enough input has arrived
    pub fn info(&self) -> Option<&PngInfo> {
        if !self.ctx.seen_hdr {
            return None;
        }

        Some(&self.ctx.png_info)
    }

    /// Replace the handler called for chunks the decoder does not
    /// understand
    pub fn set_unknown_chunk_handler(&mut self, handler: UnknownChunkHandler) {
        self.ctx.chunk_handler = handler;
    }

    /// Feed a piece of the PNG stream.
    ///
    /// Parsing advances as far as the buffered input allows, so
    /// malformed streams fail here as soon as the offending bytes
    /// arrive. Errors are terminal, the decoder accepts no further
    /// input after one.
    pub fn write(&mut self, data: &[u8]) -> Result<(), PngDecodeErrors> {
        if self.errored {
            return Err(PngDecodeErrors::GenericStatic("decoding already failed"));
        }

        self.buffered.extend_from_slice(data);

        let result = self.pump();

        if result.is_err() {
            self.errored = true;
            // scratch is released on failure, nothing partial survives
            self.buffered = Vec::new();
            self.ctx.idat_chunks = Vec::new();
            self.pos = 0;
        } else if self.pos > 0 {
            // drop the consumed prefix so memory stays bounded by the
            // largest unfinished chunk
            self.buffered.drain(..self.pos);
            self.pos = 0;
        }

        result
    }

    /// Finish decoding, returning the raster.
    ///
    /// Errors with `Truncated` when the stream stopped before IEND.
    pub fn end(mut self) -> Result<Raster, PngDecodeErrors> {
        if self.errored {
            return Err(PngDecodeErrors::GenericStatic("decoding already failed"));
        }
        if !matches!(self.state, State::Finished) {
            return Err(PngDecodeErrors::Truncated("stream ended before the IEND chunk"));
        }

        self.ctx.finish_raster()
    }

    fn pump(&mut self) -> Result<(), PngDecodeErrors> {
        loop {
            let available = self.buffered.len() - self.pos;

            match &mut self.state {
                State::Signature => {
                    if available < 8 {
                        return Ok(());
                    }
                    let magic = &self.buffered[self.pos..self.pos + 8];

                    if magic != &PNG_SIGNATURE.to_be_bytes()[..] {
                        return Err(PngDecodeErrors::BadSignature);
                    }
                    self.pos += 8;
                    self.state = State::ChunkHeader;
                }

                State::ChunkHeader => {
                    if available < 8 {
                        return Ok(());
                    }
                    let header = &self.buffered[self.pos..self.pos + 8];

                    let length = u32::from_be_bytes(header[0..4].try_into().unwrap()) as usize;
                    let chunk_bytes: [u8; 4] = header[4..8].try_into().unwrap();

                    if length > (1 << 31) - 1 {
                        return Err(PngDecodeErrors::Generic(format!(
                            "chunk length {length} larger than the format allows"
                        )));
                    }
                    for byte in chunk_bytes {
                        if !byte.is_ascii_alphabetic() {
                            return Err(PngDecodeErrors::InvalidChunkType(chunk_bytes));
                        }
                    }

                    let chunk_type = match &chunk_bytes {
                        b"IHDR" => PngChunkType::IHDR,
                        b"PLTE" => PngChunkType::PLTE,
                        b"IDAT" => PngChunkType::IDAT,
                        b"IEND" => PngChunkType::IEND,
                        b"gAMA" => PngChunkType::gAMA,
                        b"tRNS" => PngChunkType::tRNS,
                        _ => PngChunkType::unkn
                    };

                    if self.first_chunk && chunk_type != PngChunkType::IHDR {
                        return Err(PngDecodeErrors::ChunkOrder("first chunk is not IHDR"));
                    }
                    self.first_chunk = false;
                    self.pos += 8;

                    if chunk_type == PngChunkType::IDAT {
                        self.ctx.seen_idat = true;

                        let mut crc = Crc32::new();
                        crc.write(&chunk_bytes);

                        self.state = State::IdatBody {
                            remaining: length,
                            crc
                        };
                    } else {
                        let chunk = PngChunk {
                            length,
                            chunk_type,
                            chunk: chunk_bytes,
                            crc: 0
                        };

                        self.state = State::ChunkBody { chunk };
                    }
                }

                State::ChunkBody { chunk } => {
                    let chunk = *chunk;

                    if available < chunk.length + 4 {
                        return Ok(());
                    }

                    let body_start = self.pos;
                    let body_end = body_start + chunk.length;

                    let stored = u32::from_be_bytes(
                        self.buffered[body_end..body_end + 4].try_into().unwrap()
                    );

                    if self.ctx.options.get_confirm_crc() {
                        let computed = !crc32_slice(
                            &self.buffered[body_start..body_end],
                            crc32_slice(&chunk.chunk, u32::MAX)
                        );

                        if stored != computed {
                            return Err(PngDecodeErrors::BadCrc(stored, computed));
                        }
                    }

                    let chunk = PngChunk { crc: stored, ..chunk };
                    let body = &self.buffered[body_start..body_end];

                    match chunk.chunk_type {
                        PngChunkType::IHDR => self.ctx.parse_ihdr(&chunk, body)?,
                        PngChunkType::PLTE => self.ctx.parse_plte(&chunk, body)?,
                        PngChunkType::tRNS => self.ctx.parse_trns(&chunk, body)?,
                        PngChunkType::gAMA => self.ctx.parse_gama(&chunk, body)?,
                        PngChunkType::IEND => {}
                        PngChunkType::IDAT => unreachable!(),
                        PngChunkType::unkn => (self.ctx.chunk_handler)(&chunk)?
                    }

                    self.pos += chunk.length + 4;

                    if chunk.chunk_type == PngChunkType::IEND {
                        self.ctx.seen_iend = true;
                        self.state = State::Finished;
                    } else {
                        self.state = State::ChunkHeader;
                    }
                }

                State::IdatBody { remaining, crc } => {
                    if *remaining > 0 {
                        if available == 0 {
                            return Ok(());
                        }
                        let take = available.min(*remaining);
                        let piece = &self.buffered[self.pos..self.pos + take];

                        crc.write(piece);
                        self.ctx.idat_chunks.extend_from_slice(piece);

                        self.pos += take;
                        *remaining -= take;
                    }

                    if *remaining == 0 {
                        let computed = crc.finish();

                        self.state = State::IdatCrc { computed };
                    } else {
                        return Ok(());
                    }
                }

                State::IdatCrc { computed } => {
                    let computed = *computed;

                    if available < 4 {
                        return Ok(());
                    }
                    let stored = u32::from_be_bytes(
                        self.buffered[self.pos..self.pos + 4].try_into().unwrap()
                    );

                    if self.ctx.options.get_confirm_crc() && stored != computed {
                        return Err(PngDecodeErrors::BadCrc(stored, computed));
                    }

                    self.pos += 4;
                    self.state = State::ChunkHeader;
                }

                State::Finished => {
                    let trailing = self.buffered.len() - self.pos;

                    if trailing > 0 {
                        if self.ctx.options.get_strict_mode() {
                            return Err(PngDecodeErrors::ExtraData(trailing));
                        }
                        warn!("ignoring {trailing} bytes after the IEND chunk");
                        self.pos = self.buffered.len();
                    }
                    return Ok(());
                }
            }
        }
    }
}

impl Default for StreamingDecoder {
    fn default() -> Self {
        Self::new()
    }
}
