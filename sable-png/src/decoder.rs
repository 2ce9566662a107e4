use log::warn;
use sable_core::bit_depth::BitDepth;
use sable_core::bytestream::ByteReader;
use sable_core::colorspace::ColorSpace;
use sable_core::options::DecoderOptions;
use sable_core::result::DecodingResult;
use zune_inflate::{DeflateDecoder, DeflateOptions};

use crate::adam7;
use crate::constants::{DEPTH_SCALE_TABLE, PNG_SIGNATURE};
use crate::crc::crc32_slice;
use crate::enums::{FilterMethod, InterlaceMethod, PngChunkType, PngColor};
use crate::error::PngDecodeErrors;
use crate::filters::{
    handle_avg, handle_avg_first, handle_paeth, handle_paeth_first, handle_sub, handle_up
};
use crate::headers::{default_chunk_handler, UnknownChunkHandler};
use crate::normalize;
use crate::raster::Raster;

/// One palette entry, opaque until a tRNS chunk lowers its alpha
#[derive(Copy, Clone)]
pub(crate) struct PLTEEntry {
    pub red:   u8,
    pub green: u8,
    pub blue:  u8,
    pub alpha: u8
}

impl Default for PLTEEntry {
    fn default() -> Self {
        // a tRNS chunk may contain fewer values than there are palette
        // entries, the alpha of the remaining entries is 255
        PLTEEntry {
            red:   0,
            green: 0,
            blue:  0,
            alpha: 255
        }
    }
}

/// A chunk header as read off the stream.
///
/// `crc` is the stored checksum, covering the type and body bytes.
#[derive(Copy, Clone)]
pub struct PngChunk {
    pub length:     usize,
    pub chunk_type: PngChunkType,
    pub chunk:      [u8; 4],
    pub crc:        u32
}

/// Image properties from the IHDR chunk
#[derive(Default, Debug, Copy, Clone)]
pub struct PngInfo {
    pub width:            usize,
    pub height:           usize,
    pub depth:            u8,
    pub color:            PngColor,
    pub component:        u8,
    pub interlace_method: InterlaceMethod
}

/// Semantic decoder state shared by the one shot and the streaming
/// front ends.
///
/// The chunk loops feed parsed chunk bodies in here, and once IEND
/// has been seen the pixel pipeline below turns the accumulated IDAT
/// stream into an image.
pub(crate) struct DecoderContext {
    pub(crate) options:       DecoderOptions,
    pub(crate) png_info:      PngInfo,
    pub(crate) palette:       Vec<PLTEEntry>,
    pub(crate) palette_size:  usize,
    pub(crate) idat_chunks:   Vec<u8>,
    pub(crate) out:           Vec<u8>,
    pub(crate) trns_bytes:    [u16; 3],
    pub(crate) gamma:         f64,
    pub(crate) chunk_handler: UnknownChunkHandler,
    pub(crate) seen_hdr:      bool,
    pub(crate) seen_ptle:     bool,
    pub(crate) seen_trns:     bool,
    pub(crate) seen_gamma:    bool,
    pub(crate) seen_idat:     bool,
    pub(crate) seen_iend:     bool
}

impl DecoderContext {
    pub(crate) fn new(options: DecoderOptions) -> DecoderContext {
        DecoderContext {
            options,
            png_info: PngInfo::default(),
            palette: Vec::new(),
            palette_size: 0,
            idat_chunks: Vec::new(),
            out: Vec::new(),
            trns_bytes: [0; 3],
            gamma: 0.0,
            chunk_handler: default_chunk_handler,
            seen_hdr: false,
            seen_ptle: false,
            seen_trns: false,
            seen_gamma: false,
            seen_idat: false,
            seen_iend: false
        }
    }

    /// Size of the fully inflated stream, filter bytes included
    fn expected_inflated_size(&self) -> usize {
        let info = &self.png_info;
        let components = usize::from(info.color.num_components());

        match info.interlace_method {
            InterlaceMethod::Adam7 => {
                adam7::expected_interlaced_len(components, info.depth, info.width, info.height)
            }
            _ => {
                let row = (info.width * components * usize::from(info.depth) + 7) / 8 + 1;

                row * info.height
            }
        }
    }

    /// Undo deflate encoding on the accumulated IDAT stream.
    ///
    /// The output is clamped to the image plane size. Some encoders
    /// leave garbage after the final deflate block, so errors the
    /// decompressor reports after the whole plane was produced are
    /// ignored rather than surfaced.
    fn inflate(&mut self) -> Result<Vec<u8>, PngDecodeErrors> {
        if self.idat_chunks.is_empty() {
            return Err(PngDecodeErrors::GenericStatic("no IDAT chunks present"));
        }

        let expected = self.expected_inflated_size();

        let options = DeflateOptions::default()
            .set_size_hint(expected)
            .set_confirm_checksum(self.options.inflate_get_confirm_adler());

        let mut decoder = DeflateDecoder::new_with_options(&self.idat_chunks, options);

        match decoder.decode_zlib() {
            Ok(mut data) => {
                data.truncate(expected);
                Ok(data)
            }
            Err(error) => {
                if error.data.len() >= expected {
                    warn!(
                        "ignoring inflate error reported after the image plane was complete: {:?}",
                        error.error
                    );

                    let mut data = error.data;
                    data.truncate(expected);

                    return Ok(data);
                }
                Err(PngDecodeErrors::Inflate(error))
            }
        }
    }

    /// Run the pixel pipeline over the accumulated IDAT stream,
    /// producing the image in its native representation.
    ///
    /// Depths below 8 are widened to one byte per sample and palette
    /// indices are substituted, so the result is `components` samples
    /// per pixel at either 8 or (big endian) 16 bits.
    pub(crate) fn decode_pixels(&mut self) -> Result<Vec<u8>, PngDecodeErrors> {
        if !self.seen_hdr {
            return Err(PngDecodeErrors::GenericStatic("no IHDR chunk parsed"));
        }

        let deflate_data = self.inflate()?;
        // done with the compressed stream, drop it early
        self.idat_chunks = Vec::new();

        let info = self.png_info;
        let bytes = if info.depth == 16 { 2 } else { 1 };
        let out_n = usize::from(info.color.num_components());

        let mut new_len = info.width * info.height * out_n * bytes;

        match info.interlace_method {
            InterlaceMethod::Standard => {
                self.create_png_image_raw(&deflate_data, info.width, info.height)?;
            }
            InterlaceMethod::Adam7 => {
                let out_bytes = out_n * bytes;

                let mut final_out = vec![0_u8; new_len];
                let mut image_offset = 0;

                for p in 0..7 {
                    let (x, y) = adam7::pass_dimensions(p, info.width, info.height);

                    if x == 0 || y == 0 {
                        continue;
                    }
                    let image_len = adam7::pass_subimage_len(out_n, info.depth, x, y);

                    if deflate_data.len() < image_offset + image_len {
                        return Err(PngDecodeErrors::Truncated(
                            "inflated stream too short for an interlace pass"
                        ));
                    }
                    let deflate_slice = &deflate_data[image_offset..image_offset + image_len];

                    self.create_png_image_raw(deflate_slice, x, y)?;

                    // scatter the pass pixels onto the lattice
                    for j in 0..y {
                        for i in 0..x {
                            let out_y = j * adam7::YSPC[p] + adam7::YORIG[p];
                            let out_x = i * adam7::XSPC[p] + adam7::XORIG[p];

                            let final_start = out_y * info.width * out_bytes + out_x * out_bytes;
                            let out_start = (j * x + i) * out_bytes;

                            final_out[final_start..final_start + out_bytes]
                                .copy_from_slice(&self.out[out_start..out_start + out_bytes]);
                        }
                    }
                    image_offset += image_len;
                }
                self.out = final_out;
            }
            InterlaceMethod::Unknown => unreachable!()
        }

        if self.png_info.color == PngColor::Palette {
            if self.palette.is_empty() {
                return Err(PngDecodeErrors::EmptyPalette);
            }
            if self.seen_trns {
                // tRNS gave palette entries alpha values, expansion
                // has to carry them
                self.expand_palette(4)?;
                self.png_info.color = PngColor::RGBA;
                new_len *= 4;
            } else {
                self.expand_palette(3)?;
                self.png_info.color = PngColor::RGB;
                new_len *= 3;
            }
        }

        self.out.truncate(new_len);

        Ok(std::mem::take(&mut self.out))
    }

    /// Finish a decode into the canonical RGBA raster
    pub(crate) fn finish_raster(&mut self) -> Result<Raster, PngDecodeErrors> {
        let color_before = self.png_info.color;

        let native = self.decode_pixels()?;

        let info = self.png_info;
        // palette transparency already lives in the expanded pixels,
        // keying only applies to grayscale and RGB sources
        let trns = if self.seen_trns && matches!(color_before, PngColor::Luma | PngColor::RGB) {
            Some(self.trns_bytes)
        } else {
            None
        };

        let data = normalize::to_rgba8(info.color, info.depth, trns, &native, info.width, info.height)?;

        Ok(Raster::new(
            info.width as u32,
            info.height as u32,
            data,
            self.gamma
        ))
    }

    /// Un-filter one (sub-)image of `width` by `height` pixels from the
    /// inflated stream into `self.out`, widening depths below 8 to one
    /// byte per sample afterwards
    fn create_png_image_raw(
        &mut self, deflate_data: &[u8], width: usize, height: usize
    ) -> Result<(), PngDecodeErrors> {
        let info = self.png_info;
        let bytes = if info.depth == 16 { 2 } else { 1 };
        let out_n = usize::from(info.color.num_components());

        let mut img_width_bytes = out_n * width;
        img_width_bytes *= usize::from(info.depth);
        img_width_bytes += 7;
        img_width_bytes /= 8;

        let image_len = img_width_bytes * height;

        // account for the filter byte leading every scanline
        if deflate_data.len() < image_len + height {
            return Err(PngDecodeErrors::Truncated(
                "inflated stream ended inside a scanline"
            ));
        }

        self.out = vec![0; image_len];

        let out = &mut self.out[..];

        // filter distance: one pixel of bytes at depths >= 8,
        // a single byte below that since filters work on the
        // packed representation
        let mut components = out_n * bytes;

        if info.depth < 8 {
            components = 1;
        }

        let chunk_size = img_width_bytes + 1;
        let width_stride = img_width_bytes;

        let chunks = deflate_data.chunks_exact(chunk_size);

        let mut prev_row_start = 0;
        let mut first_row = true;
        let mut out_position = 0;

        for in_stride in chunks.take(height) {
            // split output into current and previous rows, the
            // de-filters read the previous row while writing the
            // current one
            let (prev, current) = out.split_at_mut(out_position);

            let mut prev_row: &[u8] = &[0_u8];

            if !first_row {
                prev_row = &prev[prev_row_start..prev_row_start + width_stride];
                prev_row_start += width_stride;
            }

            out_position += width_stride;

            let filter_byte = in_stride[0];
            let raw = &in_stride[1..];

            let mut filter = FilterMethod::from_int(filter_byte)
                .ok_or(PngDecodeErrors::BadFilterType(filter_byte))?;

            if first_row {
                // the first scanline has no row above it, swap in the
                // variants that treat that row as zero
                if filter == FilterMethod::Paeth {
                    filter = FilterMethod::PaethFirst;
                }
                if filter == FilterMethod::Up {
                    // up on the first row is a straight copy
                    filter = FilterMethod::None;
                }
                if filter == FilterMethod::Average {
                    filter = FilterMethod::AvgFirst;
                }

                first_row = false;
            }

            match filter {
                FilterMethod::None => current[0..width_stride].copy_from_slice(raw),

                FilterMethod::Sub => handle_sub(raw, current, components),

                FilterMethod::Up => handle_up(prev_row, raw, current),

                FilterMethod::Average => handle_avg(prev_row, raw, current, components),

                FilterMethod::Paeth => handle_paeth(prev_row, raw, current, components),

                FilterMethod::PaethFirst => handle_paeth_first(raw, current, components),

                FilterMethod::AvgFirst => handle_avg_first(raw, current, components),

                FilterMethod::Unknown => unreachable!()
            }
        }

        if info.depth < 8 {
            self.expand_bits_to_byte(width, height, out_n);
        }

        Ok(())
    }

    /// Widen packed samples at depths 1, 2 and 4 to one byte each.
    ///
    /// Grayscale samples are scaled to the full 8 bit range while
    /// palette indices keep their value. Packing never crosses a row
    /// boundary, trailing bits in the last byte of a row are dropped.
    fn expand_bits_to_byte(&mut self, width: usize, height: usize, out_n: usize) {
        let info = self.png_info;
        let depth = usize::from(info.depth);

        let img_width_bytes = (out_n * width * depth + 7) / 8;

        let scale = if info.color == PngColor::Luma {
            DEPTH_SCALE_TABLE[depth]
        } else {
            1
        };

        let mut new_out = vec![0; height * width * out_n];
        let mut current = 0;

        for row in 0..height {
            let mut in_offset = row * img_width_bytes;
            // samples still to write for this row
            let mut k = width * out_n;

            if depth == 1 {
                while k >= 8 {
                    let cur: &mut [u8; 8] = new_out
                        .get_mut(current..current + 8)
                        .unwrap()
                        .try_into()
                        .unwrap();

                    let in_val = self.out[in_offset];

                    cur[0] = scale * ((in_val >> 7) & 0x01);
                    cur[1] = scale * ((in_val >> 6) & 0x01);
                    cur[2] = scale * ((in_val >> 5) & 0x01);
                    cur[3] = scale * ((in_val >> 4) & 0x01);
                    cur[4] = scale * ((in_val >> 3) & 0x01);
                    cur[5] = scale * ((in_val >> 2) & 0x01);
                    cur[6] = scale * ((in_val >> 1) & 0x01);
                    cur[7] = scale * (in_val & 0x01);

                    in_offset += 1;
                    current += 8;
                    k -= 8;
                }
                if k > 0 {
                    let in_val = self.out[in_offset];

                    for p in 0..k {
                        let shift = 7_usize.wrapping_sub(p);

                        new_out[current] = scale * ((in_val >> shift) & 0x01);
                        current += 1;
                    }
                }
            } else if depth == 2 {
                while k >= 4 {
                    let cur: &mut [u8; 4] = new_out
                        .get_mut(current..current + 4)
                        .unwrap()
                        .try_into()
                        .unwrap();

                    let in_val = self.out[in_offset];

                    cur[0] = scale * ((in_val >> 6) & 0x03);
                    cur[1] = scale * ((in_val >> 4) & 0x03);
                    cur[2] = scale * ((in_val >> 2) & 0x03);
                    cur[3] = scale * (in_val & 0x03);

                    in_offset += 1;
                    current += 4;
                    k -= 4;
                }
                if k > 0 {
                    let in_val = self.out[in_offset];

                    for p in 0..k {
                        let shift = 6_usize.wrapping_sub(p * 2);

                        new_out[current] = scale * ((in_val >> shift) & 0x03);
                        current += 1;
                    }
                }
            } else if depth == 4 {
                while k >= 2 {
                    let cur: &mut [u8; 2] = new_out
                        .get_mut(current..current + 2)
                        .unwrap()
                        .try_into()
                        .unwrap();

                    let in_val = self.out[in_offset];

                    cur[0] = scale * ((in_val >> 4) & 0x0f);
                    cur[1] = scale * (in_val & 0x0f);

                    in_offset += 1;
                    current += 2;
                    k -= 2;
                }
                if k > 0 {
                    let in_val = self.out[in_offset];

                    new_out[current] = scale * ((in_val >> 4) & 0x0f);
                    current += 1;
                }
            }
        }

        self.out = new_out;
    }

    /// Substitute palette indices with their RGB(A) entries
    fn expand_palette(&mut self, components: usize) -> Result<(), PngDecodeErrors> {
        let info = self.png_info;
        let out_size = info.width * info.height * components;

        let data = &self.out;
        let palette = &self.palette;
        let palette_size = self.palette_size;

        let mut out = vec![0; out_size];

        if components == 3 {
            for (px, index) in out.chunks_exact_mut(3).zip(data) {
                let position = usize::from(*index);

                if position >= palette_size {
                    return Err(PngDecodeErrors::PaletteIndex(*index, palette_size));
                }
                let entry = palette[position];

                px[0] = entry.red;
                px[1] = entry.green;
                px[2] = entry.blue;
            }
        } else if components == 4 {
            for (px, index) in out.chunks_exact_mut(4).zip(data) {
                let position = usize::from(*index);

                if position >= palette_size {
                    return Err(PngDecodeErrors::PaletteIndex(*index, palette_size));
                }
                let entry = palette[position];

                px[0] = entry.red;
                px[1] = entry.green;
                px[2] = entry.blue;
                px[3] = entry.alpha;
            }
        }

        self.out = out;

        Ok(())
    }
}

/// A one shot PNG decoder over an in-memory byte stream.
///
/// # Using
///
/// ```no_run
/// use sable_png::PngDecoder;
///
/// let data = std::fs::read("image.png").unwrap();
/// let raster = PngDecoder::new(&data).decode().unwrap();
///
/// assert_eq!(
///     raster.data().len(),
///     4 * raster.width() as usize * raster.height() as usize
/// );
/// ```
pub struct PngDecoder<'a> {
    pub(crate) stream:       ByteReader<'a>,
    pub(crate) ctx:          DecoderContext,
    pub(crate) headers_done: bool
}

impl<'a> PngDecoder<'a> {
    pub fn new(data: &'a [u8]) -> PngDecoder<'a> {
        PngDecoder::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PngDecoder<'a> {
        PngDecoder {
            stream:       ByteReader::new(data),
            ctx:          DecoderContext::new(options),
            headers_done: false
        }
    }

    /// Image width and height, present once headers were decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if !self.ctx.seen_hdr {
            return None;
        }

        Some((self.ctx.png_info.width, self.ctx.png_info.height))
    }

    /// Bit depth of the decoded output, present once headers
    /// were decoded
    pub const fn depth(&self) -> Option<BitDepth> {
        if !self.ctx.seen_hdr {
            return None;
        }
        match self.ctx.png_info.depth {
            1 | 2 | 4 | 8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            _ => unreachable!()
        }
    }

    /// Colorspace `decode_raw` will produce pixels in, present once
    /// headers were decoded
    pub fn colorspace(&self) -> Option<ColorSpace> {
        if !self.ctx.seen_hdr {
            return None;
        }
        match self.ctx.png_info.color {
            PngColor::Palette => {
                if self.ctx.seen_trns {
                    Some(ColorSpace::RGBA)
                } else {
                    Some(ColorSpace::RGB)
                }
            }
            PngColor::Luma => Some(ColorSpace::Luma),
            PngColor::LumaA => Some(ColorSpace::LumaA),
            PngColor::RGB => Some(ColorSpace::RGB),
            PngColor::RGBA => Some(ColorSpace::RGBA),
            PngColor::Unknown => unreachable!()
        }
    }

    /// The parsed IHDR fields, present once headers were decoded
    pub fn info(&self) -> Option<&PngInfo> {
        if !self.ctx.seen_hdr {
            return None;
        }

        Some(&self.ctx.png_info)
    }

    /// The file gamma, present once headers were decoded and the
    /// file carried a gAMA chunk
    pub fn gamma(&self) -> Option<f64> {
        if self.ctx.seen_gamma {
            Some(self.ctx.gamma)
        } else {
            None
        }
    }

    /// Replace the handler called for chunks the decoder does not
    /// understand.
    ///
    /// The default errors on unknown critical chunks and skips
    /// ancillary ones.
    pub fn set_unknown_chunk_handler(&mut self, handler: UnknownChunkHandler) {
        self.ctx.chunk_handler = handler;
    }

    fn read_chunk_header(&mut self) -> Result<PngChunk, PngDecodeErrors> {
        // format is length - chunk type - [data] - crc, load crc now
        let chunk_length = self.stream.get_u32_be_err()? as usize;
        let chunk_type_int = self.stream.get_u32_be_err()?.to_be_bytes();

        if chunk_length > (1 << 31) - 1 {
            return Err(PngDecodeErrors::Generic(format!(
                "chunk length {chunk_length} larger than the format allows"
            )));
        }
        for byte in chunk_type_int {
            if !byte.is_ascii_alphabetic() {
                return Err(PngDecodeErrors::InvalidChunkType(chunk_type_int));
            }
        }

        let mut crc_bytes = [0; 4];
        let crc_ref = self.stream.peek_at(chunk_length, 4)?;

        crc_bytes.copy_from_slice(crc_ref);

        let crc = u32::from_be_bytes(crc_bytes);

        let chunk_type = match &chunk_type_int {
            b"IHDR" => PngChunkType::IHDR,
            b"PLTE" => PngChunkType::PLTE,
            b"IDAT" => PngChunkType::IDAT,
            b"IEND" => PngChunkType::IEND,
            b"gAMA" => PngChunkType::gAMA,
            b"tRNS" => PngChunkType::tRNS,
            _ => PngChunkType::unkn
        };

        if self.ctx.options.get_confirm_crc() {
            // step back over the chunk type, the checksum covers it
            self.stream.rewind(4);

            let bytes = self.stream.peek_at(0, chunk_length + 4)?;
            let computed = !crc32_slice(bytes, u32::MAX);

            if crc != computed {
                return Err(PngDecodeErrors::BadCrc(crc, computed));
            }
            self.stream.skip(4);
        }

        Ok(PngChunk {
            length: chunk_length,
            chunk: chunk_type_int,
            chunk_type,
            crc
        })
    }

    fn handle_chunk(&mut self, header: PngChunk) -> Result<(), PngDecodeErrors> {
        match header.chunk_type {
            PngChunkType::IHDR => {
                let body = self.stream.get(header.length)?;
                self.stream.skip(4);

                self.ctx.parse_ihdr(&header, body)
            }
            PngChunkType::PLTE => {
                let body = self.stream.get(header.length)?;
                self.stream.skip(4);

                self.ctx.parse_plte(&header, body)
            }
            PngChunkType::tRNS => {
                let body = self.stream.get(header.length)?;
                self.stream.skip(4);

                self.ctx.parse_trns(&header, body)
            }
            PngChunkType::gAMA => {
                let body = self.stream.get(header.length)?;
                self.stream.skip(4);

                self.ctx.parse_gama(&header, body)
            }
            PngChunkType::IDAT | PngChunkType::IEND => unreachable!(),
            PngChunkType::unkn => {
                (self.ctx.chunk_handler)(&header)?;

                if !self.stream.has(header.length + 4) {
                    return Err(PngDecodeErrors::Truncated(
                        "stream ended inside a skipped chunk"
                    ));
                }
                self.stream.skip(header.length + 4);

                Ok(())
            }
        }
    }

    /// Decode headers up to, but not including, the first IDAT chunk.
    ///
    /// Useful to inspect dimensions, colorspace and depth before
    /// paying for a full decode. The decode methods resume from where
    /// this stopped, calling it twice is harmless.
    pub fn decode_headers(&mut self) -> Result<(), PngDecodeErrors> {
        if self.headers_done {
            return Ok(());
        }

        let signature = self.stream.get_u64_be_err()?;

        if signature != PNG_SIGNATURE {
            return Err(PngDecodeErrors::BadSignature);
        }

        // confirm the first chunk is IHDR before diving in
        if self.stream.peek_at(4, 4)? != b"IHDR" {
            return Err(PngDecodeErrors::ChunkOrder("first chunk is not IHDR"));
        }

        loop {
            let header = self.read_chunk_header()?;

            match header.chunk_type {
                PngChunkType::IDAT => {
                    // rewind to the length field, the decode loop
                    // re-reads this chunk
                    self.stream.rewind(8);
                    self.headers_done = true;

                    return Ok(());
                }
                PngChunkType::IEND => {
                    return Err(PngDecodeErrors::GenericStatic(
                        "no IDAT chunks before IEND, corrupt PNG"
                    ));
                }
                _ => self.handle_chunk(header)?
            }
        }
    }

    /// Drive the chunk loop to IEND, accumulating IDAT bodies
    fn run_to_iend(&mut self) -> Result<(), PngDecodeErrors> {
        self.decode_headers()?;

        while !self.ctx.seen_iend {
            let header = self.read_chunk_header()?;

            match header.chunk_type {
                PngChunkType::IDAT => {
                    let body = self.stream.get(header.length)?;
                    self.stream.skip(4);

                    self.ctx.seen_idat = true;
                    self.ctx.idat_chunks.extend_from_slice(body);
                }
                PngChunkType::IEND => {
                    self.stream.skip(header.length + 4);
                    self.ctx.seen_iend = true;
                }
                _ => self.handle_chunk(header)?
            }
        }

        let trailing = self.stream.remaining();

        if trailing > 0 {
            if self.ctx.options.get_strict_mode() {
                return Err(PngDecodeErrors::ExtraData(trailing));
            }
            warn!("ignoring {trailing} bytes after the IEND chunk");
        }

        Ok(())
    }

    /// Decode the image into its native representation.
    ///
    /// Depths below 8 are widened to one byte per sample, palette
    /// indices are substituted with their entries, and 16 bit samples
    /// stay as big endian byte pairs. No transparency keying or depth
    /// rescaling happens here, use [`decode`](Self::decode) for the
    /// normalized RGBA raster.
    pub fn decode_raw(&mut self) -> Result<Vec<u8>, PngDecodeErrors> {
        self.run_to_iend()?;
        self.ctx.decode_pixels()
    }

    /// Decode the image to 8 bit RGBA.
    ///
    /// Whatever the stored color type and depth, the result holds
    /// exactly `4 * width * height` bytes: palette entries are
    /// expanded, simple transparency is keyed out, and samples are
    /// rescaled to the 8 bit range.
    pub fn decode(&mut self) -> Result<Raster, PngDecodeErrors> {
        self.run_to_iend()?;
        self.ctx.finish_raster()
    }

    /// Decode like [`decode_raw`](Self::decode_raw), but hand 16 bit
    /// images back as native `u16` samples instead of byte pairs
    pub fn decode_native(&mut self) -> Result<DecodingResult, PngDecodeErrors> {
        let out = self.decode_raw()?;

        if self.ctx.png_info.depth == 16 {
            let samples: Vec<u16> = out
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes(chunk.try_into().unwrap()))
                .collect();

            return Ok(DecodingResult::U16(samples));
        }

        Ok(DecodingResult::U8(out))
    }
}
