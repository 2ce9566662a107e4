//! Encode then decode round trips.
use sable_core::bit_depth::BitDepth;
use sable_core::colorspace::ColorSpace;
use sable_core::options::EncoderOptions;
use sable_png::error::PngDecodeErrors;
use sable_png::{FilterMethod, FilterStrategy, PngDecoder, PngEncoder};

fn checkerboard_rgba(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 * size * size);

    for y in 0..size {
        for x in 0..size {
            let value = if (x ^ y) & 1 == 0 { 0xE5 } else { 0xFF };

            data.extend_from_slice(&[value, value, value, value]);
        }
    }
    data
}

#[test]
fn test_rgba_adaptive_round_trip() {
    // the filter heuristic must stay invisible in the output
    let data = checkerboard_rgba(10);
    let options = EncoderOptions::new(10, 10, ColorSpace::RGBA, BitDepth::Eight);

    let png = PngEncoder::new(&data, options).encode().unwrap();
    let raster = PngDecoder::new(&png).decode().unwrap();

    assert_eq!(raster.width(), 10);
    assert_eq!(raster.height(), 10);
    assert_eq!(raster.data(), &data[..]);
}

#[test]
fn test_rgba_identity_with_filter_none() {
    let data = checkerboard_rgba(10);
    let options = EncoderOptions::new(10, 10, ColorSpace::RGBA, BitDepth::Eight);

    let mut encoder = PngEncoder::new(&data, options);
    encoder.set_filter(FilterStrategy::Fixed(FilterMethod::None));

    let png = encoder.encode().unwrap();
    let raster = PngDecoder::new(&png).decode().unwrap();

    assert_eq!(raster.data(), &data[..]);
}

#[test]
fn test_every_fixed_filter_round_trips() {
    // a gradient so each filter produces distinct residuals
    let (width, height) = (13_usize, 7_usize);
    let mut data = Vec::new();

    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x * 19) as u8, (y * 31) as u8, ((x + y) * 7) as u8]);
        }
    }

    for filter in [
        FilterMethod::None,
        FilterMethod::Sub,
        FilterMethod::Up,
        FilterMethod::Average,
        FilterMethod::Paeth
    ] {
        let options = EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Eight);

        let mut encoder = PngEncoder::new(&data, options);
        encoder.set_filter(FilterStrategy::Fixed(filter));

        let png = encoder.encode().unwrap();
        let pixels = PngDecoder::new(&png).decode_raw().unwrap();

        assert_eq!(pixels, data, "filter {filter:?} corrupted the image");
    }
}

#[test]
fn test_luma_alpha_round_trip() {
    let (width, height) = (9_usize, 4_usize);
    let mut data = Vec::new();

    for i in 0..width * height {
        data.extend_from_slice(&[(i * 5) as u8, (255 - i) as u8]);
    }

    let options = EncoderOptions::new(width, height, ColorSpace::LumaA, BitDepth::Eight);

    let png = PngEncoder::new(&data, options).encode().unwrap();
    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, data);
}

#[test]
fn test_sixteen_bit_round_trip() {
    let (width, height) = (6_usize, 5_usize);
    let mut samples = Vec::new();

    for i in 0..width * height * 3 {
        samples.push((i * 797) as u16);
    }

    // the encoder expects 16 bit input in big endian
    let mut data = Vec::with_capacity(samples.len() * 2);

    for sample in &samples {
        data.extend_from_slice(&sample.to_be_bytes());
    }

    let options = EncoderOptions::new(width, height, ColorSpace::RGB, BitDepth::Sixteen);

    let png = PngEncoder::new(&data, options).encode().unwrap();

    let mut decoder = PngDecoder::new(&png);
    let decoded = decoder.decode_native().unwrap().u16().unwrap();

    assert_eq!(decoded, samples);
}

#[test]
fn test_decode_normalizes_sixteen_bit_to_eight() {
    let data = [0xFF, 0xFF, 0x80, 0x00, 0x00, 0x00];
    let options = EncoderOptions::new(1, 1, ColorSpace::RGB, BitDepth::Sixteen);

    let png = PngEncoder::new(&data, options).encode().unwrap();
    let raster = PngDecoder::new(&png).decode().unwrap();

    // round(0x8000 * 255 / 65535) = 128
    assert_eq!(raster.data(), [255, 128, 0, 255]);
}

#[test]
fn test_small_chunk_size_splits_idat() {
    let data = checkerboard_rgba(16);
    let options = EncoderOptions::new(16, 16, ColorSpace::RGBA, BitDepth::Eight);

    let mut encoder = PngEncoder::new(&data, options);
    encoder.set_chunk_size(16);

    let png = encoder.encode().unwrap();

    // more than one IDAT chunk must be present
    let idat_count = png.windows(4).filter(|w| *w == b"IDAT").count();
    assert!(idat_count > 1, "expected a split IDAT stream, got {idat_count}");

    let raster = PngDecoder::new(&png).decode().unwrap();
    assert_eq!(raster.data(), &data[..]);
}

#[test]
fn test_gamma_survives_the_round_trip() {
    let data = [10, 20, 30, 255];
    let options = EncoderOptions::new(1, 1, ColorSpace::RGBA, BitDepth::Eight);

    let mut encoder = PngEncoder::new(&data, options);
    encoder.set_gamma(0.45455);

    let png = encoder.encode().unwrap();
    let raster = PngDecoder::new(&png).decode().unwrap();

    assert!((raster.gamma() - 0.45455).abs() < 1e-5);
}

#[test]
fn test_compression_levels_agree() {
    let data = checkerboard_rgba(12);

    let mut outputs = Vec::new();

    for level in [0, 1, 6, 9] {
        let options = EncoderOptions::new(12, 12, ColorSpace::RGBA, BitDepth::Eight);

        let mut encoder = PngEncoder::new(&data, options);
        encoder.set_compression_level(level);

        let png = encoder.encode().unwrap();
        outputs.push(PngDecoder::new(&png).decode().unwrap().into_data());
    }

    assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_raster_re_encodes() {
    let data = checkerboard_rgba(10);
    let options = EncoderOptions::new(10, 10, ColorSpace::RGBA, BitDepth::Eight);

    let mut encoder = PngEncoder::new(&data, options);
    encoder.set_gamma(0.45455);

    let png = encoder.encode().unwrap();
    let raster = PngDecoder::new(&png).decode().unwrap();

    // a decoded raster goes straight back into an encoder, keeping
    // its gamma
    let second = PngEncoder::from_raster(&raster).encode().unwrap();
    let again = PngDecoder::new(&second).decode().unwrap();

    assert_eq!(again.data(), raster.data());
    assert!((again.gamma() - 0.45455).abs() < 1e-5);
}

#[test]
fn test_corrupted_body_fails_the_crc_check() {
    let data = checkerboard_rgba(8);
    let options = EncoderOptions::new(8, 8, ColorSpace::RGBA, BitDepth::Eight);

    let mut png = PngEncoder::new(&data, options).encode().unwrap();

    // flip a byte inside the IDAT body
    let idat = png.windows(4).position(|w| w == b"IDAT").unwrap();
    png[idat + 6] ^= 0xFF;

    let err = PngDecoder::new(&png).decode().unwrap_err();

    assert!(matches!(err, PngDecodeErrors::BadCrc(_, _)));
}
