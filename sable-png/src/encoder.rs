use std::borrow::Cow;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::trace;
use sable_core::bit_depth::BitDepth;
use sable_core::bytestream::ByteWriter;
use sable_core::colorspace::ColorSpace;
use sable_core::options::EncoderOptions;

use crate::constants::PNG_SIGNATURE;
use crate::enums::{FilterMethod, FilterStrategy};
use crate::error::PngEncodeErrors;
use crate::filters::{choose_filter, filter_scanline};
use crate::headers::writers::{write_chunk, write_gamma, write_header_fn, write_iend, write_ihdr};
use crate::raster::Raster;

/// How many compressed bytes each IDAT chunk carries by default.
/// Most decoders expect data in 8KB chunks since libpng writes
/// that by default, so emulate it
const DEFAULT_CHUNK_SIZE: usize = 8192;

/// A PNG encoder.
///
/// The image handed in is described by [`EncoderOptions`], the output
/// representation defaults to the same colorspace but can be changed
/// with [`set_output_colorspace`](Self::set_output_colorspace), in
/// which case samples are converted while packing.
///
/// # Endianness
///
/// 16 bit input data is expected in big endian, which lets the
/// matching-colorspace path skip a conversion pass.
///
/// # Example
///
/// Encode a 2 by 2 RGBA image
///
/// ```
/// use sable_core::bit_depth::BitDepth;
/// use sable_core::colorspace::ColorSpace;
/// use sable_core::options::EncoderOptions;
/// use sable_png::PngEncoder;
///
/// let pixels = [0_u8; 16];
/// let options = EncoderOptions::new(2, 2, ColorSpace::RGBA, BitDepth::Eight);
///
/// let bytes = PngEncoder::new(&pixels, options).encode().unwrap();
/// assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
/// ```
pub struct PngEncoder<'a> {
    pub(crate) options:    EncoderOptions,
    pub(crate) data:       &'a [u8],
    pub(crate) out_color:  ColorSpace,
    pub(crate) row_filter: FilterStrategy,
    pub(crate) level:      u8,
    pub(crate) chunk_size: usize,
    pub(crate) background: Option<[u16; 3]>,
    pub(crate) gamma:      Option<f64>
}

impl<'a> PngEncoder<'a> {
    /// Create a new encoder that will encode `data`, whose layout
    /// is described by `options`
    pub fn new(data: &'a [u8], options: EncoderOptions) -> PngEncoder<'a> {
        PngEncoder {
            options,
            data,
            out_color: options.get_colorspace(),
            row_filter: FilterStrategy::Adaptive,
            level: 6,
            chunk_size: DEFAULT_CHUNK_SIZE,
            background: None,
            gamma: None
        }
    }

    /// Create an encoder for a decoded raster, wiring dimensions,
    /// colorspace and gamma through
    pub fn from_raster(raster: &'a Raster) -> PngEncoder<'a> {
        let options = EncoderOptions::new(
            raster.width() as usize,
            raster.height() as usize,
            ColorSpace::RGBA,
            BitDepth::Eight
        );

        let mut encoder = PngEncoder::new(raster.data(), options);

        if raster.gamma() != 0.0 {
            encoder.gamma = Some(raster.gamma());
        }
        encoder
    }

    /// Choose the colorspace written to the file.
    ///
    /// When it differs from the input colorspace samples are
    /// converted, collapsing alpha over the background color and
    /// averaging color down to luminance as needed.
    pub fn set_output_colorspace(&mut self, colorspace: ColorSpace) {
        self.out_color = colorspace;
    }

    /// Choose how scanline filters are picked
    pub fn set_filter(&mut self, filter: FilterStrategy) {
        self.row_filter = filter;
    }

    /// Set the deflate compression level, 0 to 9
    pub fn set_compression_level(&mut self, level: u8) {
        self.level = level.min(9);
    }

    /// Set how many compressed bytes each IDAT chunk holds
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// The color alpha is composited against when the output
    /// colorspace drops the alpha channel, in output range.
    ///
    /// Defaults to white.
    pub fn set_background(&mut self, background: [u16; 3]) {
        self.background = Some(background);
    }

    /// Write a gAMA chunk with this gamma value
    pub fn set_gamma(&mut self, gamma: f64) {
        self.gamma = Some(gamma);
    }

    /// Encode the image, returning the PNG stream
    pub fn encode(&mut self) -> Result<Vec<u8>, PngEncodeErrors> {
        self.validate_options()?;

        let expected_data_size = self
            .options
            .get_width()
            .checked_mul(self.options.get_height())
            .and_then(|size| size.checked_mul(self.options.get_depth().size_of()))
            .and_then(|size| size.checked_mul(self.options.get_colorspace().num_components()))
            .ok_or(PngEncodeErrors::Static("image dimensions overflow"))?;

        if self.data.len() != expected_data_size {
            return Err(PngEncodeErrors::TooShortInput(
                expected_data_size,
                self.data.len()
            ));
        }

        let packed = self.pack_pixels();
        let filtered = self.add_filters(&packed);
        let compressed = self.compress(&filtered)?;

        trace!(
            "filtered {} bytes down to {} compressed",
            filtered.len(),
            compressed.len()
        );

        let mut out = Vec::with_capacity(compressed.len() + 256);

        {
            let mut writer = ByteWriter::new(&mut out);
            writer.write_u64_be(PNG_SIGNATURE);
        }

        write_header_fn(self, &mut out, b"IHDR", write_ihdr);

        if self.gamma.is_some() {
            write_header_fn(self, &mut out, b"gAMA", write_gamma);
        }

        for chunk in compressed.chunks(self.chunk_size) {
            write_chunk(b"IDAT", chunk, &mut out);
        }

        write_header_fn(self, &mut out, b"IEND", write_iend);

        Ok(out)
    }

    fn validate_options(&self) -> Result<(), PngEncodeErrors> {
        if self.options.get_width() == 0 || self.options.get_height() == 0 {
            return Err(PngEncodeErrors::Static("image dimensions cannot be zero"));
        }
        if self.options.get_width() > u32::MAX as usize
            || self.options.get_height() > u32::MAX as usize
        {
            return Err(PngEncodeErrors::Static("image dimensions do not fit the format"));
        }

        if !matches!(
            self.options.get_colorspace(),
            ColorSpace::Luma | ColorSpace::LumaA | ColorSpace::RGB | ColorSpace::RGBA
        ) {
            return Err(PngEncodeErrors::UnsupportedOption(
                "input colorspace is not one PNG can express"
            ));
        }
        if !matches!(
            self.out_color,
            ColorSpace::Luma | ColorSpace::LumaA | ColorSpace::RGB | ColorSpace::RGBA
        ) {
            return Err(PngEncodeErrors::UnsupportedOption(
                "output colorspace is not one the encoder can write"
            ));
        }

        // grayscale with alpha is the one color type the packer does
        // not produce at 16 bits
        if self.options.get_depth() == BitDepth::Sixteen && self.out_color == ColorSpace::LumaA {
            return Err(PngEncodeErrors::UnsupportedOption(
                "16 bit grayscale with alpha output"
            ));
        }

        if let FilterStrategy::Fixed(filter) = self.row_filter {
            if !matches!(
                filter,
                FilterMethod::None
                    | FilterMethod::Sub
                    | FilterMethod::Up
                    | FilterMethod::Average
                    | FilterMethod::Paeth
            ) {
                return Err(PngEncodeErrors::UnsupportedOption(
                    "fixed filter is not a scanline filter"
                ));
            }
        }

        if let Some(gamma) = self.gamma {
            if !gamma.is_finite() || gamma < 0.0 {
                return Err(PngEncodeErrors::UnsupportedOption(
                    "gamma must be finite and non-negative"
                ));
            }
        }

        Ok(())
    }

    /// Bytes in one packed output scanline
    const fn calculate_scanline_size(&self) -> usize {
        self.options.get_width()
            * self.options.get_depth().size_of()
            * self.out_color.num_components()
    }

    /// Convert the input samples to the output colorspace.
    ///
    /// When input and output agree the data is used as is.
    fn pack_pixels(&self) -> Cow<'a, [u8]> {
        let in_color = self.options.get_colorspace();
        let out_color = self.out_color;

        if in_color == out_color {
            return Cow::Borrowed(self.data);
        }

        let depth = self.options.get_depth();
        let max = depth.max_value();

        let in_n = in_color.num_components();
        let out_n = out_color.num_components();
        let sample_bytes = depth.size_of();

        let pixels = self.options.get_width() * self.options.get_height();

        let background = self.background.unwrap_or([max; 3]);
        let background = [
            background[0].min(max),
            background[1].min(max),
            background[2].min(max)
        ];

        let collapse_alpha = in_color.has_alpha() && !out_color.has_alpha();

        let mut out = Vec::with_capacity(pixels * out_n * sample_bytes);

        for px in self.data.chunks_exact(in_n * sample_bytes) {
            let mut samples = [0_u16; 4];

            for (c, value) in samples.iter_mut().take(in_n).enumerate() {
                *value = match depth {
                    BitDepth::Eight => u16::from(px[c]),
                    BitDepth::Sixteen => u16::from_be_bytes([px[2 * c], px[2 * c + 1]])
                };
            }

            let (mut r, mut g, mut b, a) = match in_color {
                ColorSpace::Luma => (samples[0], samples[0], samples[0], max),
                ColorSpace::LumaA => (samples[0], samples[0], samples[0], samples[1]),
                ColorSpace::RGB => (samples[0], samples[1], samples[2], max),
                ColorSpace::RGBA => (samples[0], samples[1], samples[2], samples[3]),
                _ => unreachable!()
            };

            if collapse_alpha {
                r = blend(r, background[0], a, max);
                g = blend(g, background[1], a, max);
                b = blend(b, background[2], a, max);
            }

            match out_color {
                ColorSpace::Luma => {
                    write_sample(&mut out, luminance(r, g, b, max), depth);
                }
                ColorSpace::LumaA => {
                    write_sample(&mut out, luminance(r, g, b, max), depth);
                    write_sample(&mut out, a, depth);
                }
                ColorSpace::RGB => {
                    write_sample(&mut out, r, depth);
                    write_sample(&mut out, g, depth);
                    write_sample(&mut out, b, depth);
                }
                ColorSpace::RGBA => {
                    write_sample(&mut out, r, depth);
                    write_sample(&mut out, g, depth);
                    write_sample(&mut out, b, depth);
                    write_sample(&mut out, a, depth);
                }
                _ => unreachable!()
            }
        }

        Cow::Owned(out)
    }

    /// Apply a filter to every packed scanline, producing the stream
    /// that goes to deflate: one filter byte then the filtered row
    fn add_filters(&self, packed: &[u8]) -> Vec<u8> {
        let height = self.options.get_height();
        let scanline_size = self.calculate_scanline_size();
        // filter distance, bytes per full pixel
        let components = self.out_color.num_components() * self.options.get_depth().size_of();

        let mut filtered = vec![0; (scanline_size + 1) * height];
        let mut scratch = vec![0; scanline_size + 1];

        let mut previous_scanline: &[u8] = &[];

        for (i, filter_s) in filtered
            .chunks_exact_mut(scanline_size + 1)
            .take(height)
            .enumerate()
        {
            let current_scanline = &packed[i * scanline_size..(i + 1) * scanline_size];

            let filter = match self.row_filter {
                FilterStrategy::Fixed(filter) => filter,
                FilterStrategy::Adaptive => {
                    choose_filter(previous_scanline, current_scanline, components, &mut scratch)
                }
            };

            filter_scanline(current_scanline, previous_scanline, filter_s, filter, components);

            previous_scanline = current_scanline;
        }

        filtered
    }

    fn compress(&self, filtered: &[u8]) -> Result<Vec<u8>, PngEncodeErrors> {
        let sink = Vec::with_capacity(filtered.len() / 2);
        let mut encoder = ZlibEncoder::new(sink, Compression::new(u32::from(self.level)));

        encoder.write_all(filtered)?;

        Ok(encoder.finish()?)
    }
}

/// Composite `sample` over `background` with coverage `alpha`,
/// all at scale `max`
#[inline]
fn blend(sample: u16, background: u16, alpha: u16, max: u16) -> u16 {
    let coverage = f64::from(alpha) / f64::from(max);
    let value = f64::from(background) * (1.0 - coverage) + f64::from(sample) * coverage;

    value.round().clamp(0.0, f64::from(max)) as u16
}

/// Plain mean luminance
#[inline]
fn luminance(r: u16, g: u16, b: u16, max: u16) -> u16 {
    let value = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0;

    (value.round() as u16).min(max)
}

#[inline]
fn write_sample(out: &mut Vec<u8>, sample: u16, depth: BitDepth) {
    match depth {
        BitDepth::Eight => out.push(sample as u8),
        BitDepth::Sixteen => out.extend_from_slice(&sample.to_be_bytes())
    }
}
