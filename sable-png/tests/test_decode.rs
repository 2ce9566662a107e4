//! Decoding of hand assembled streams, covering the chunk parser
//! and the normalized RGBA output.
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use sable_core::options::DecoderOptions;
use sable_png::error::PngDecodeErrors;
use sable_png::{PngDecoder, Raster};

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Serialize a chunk with a dummy checksum, fixtures are decoded
/// with checksum confirmation off
fn chunk(name: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 12);

    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(body);
    out.extend_from_slice(&[0; 4]);
    out
}

fn ihdr(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
    let mut body = Vec::with_capacity(13);

    body.extend_from_slice(&width.to_be_bytes());
    body.extend_from_slice(&height.to_be_bytes());
    body.extend_from_slice(&[depth, color, 0, 0, interlace]);
    body
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());

    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn decode_lenient(data: &[u8]) -> Result<Raster, PngDecodeErrors> {
    let options = DecoderOptions::default().set_confirm_crc(false);

    PngDecoder::new_with_options(data, options).decode()
}

#[test]
fn test_signature_rejection() {
    let err = PngDecoder::new(b"I AM NOT").decode().unwrap_err();

    assert!(matches!(err, PngDecodeErrors::BadSignature));
}

#[test]
fn test_empty_input_is_truncated() {
    let err = PngDecoder::new(&[]).decode().unwrap_err();

    assert!(matches!(err, PngDecodeErrors::Truncated(_)));
}

#[test]
fn test_truncated_chunk_header() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&[0x00, 0x00, 0x00]);

    let err = PngDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, PngDecodeErrors::Truncated(_)));
}

#[test]
fn test_first_chunk_must_be_ihdr() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"gAMA", &45455_u32.to_be_bytes()));

    let err = decode_lenient(&data).unwrap_err();

    assert!(matches!(err, PngDecodeErrors::ChunkOrder(_)));
}

#[test]
fn test_one_bit_all_black() {
    // 1024x1024 at one bit per pixel, every bit zero
    let (width, height) = (1024_usize, 1024_usize);
    let row_bytes = width / 8;

    let mut raw = Vec::with_capacity((row_bytes + 1) * height);

    for _ in 0..height {
        raw.push(0); // filter: none
        raw.extend(std::iter::repeat(0x00).take(row_bytes));
    }

    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(width as u32, height as u32, 1, 0, 0)));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&raw)));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let raster = decode_lenient(&data).unwrap();

    assert_eq!(raster.data().len(), 4 * width * height);
    assert!(raster
        .data()
        .chunks_exact(4)
        .all(|px| px == [0x00, 0x00, 0x00, 0xFF]));
}

#[test]
fn test_grayscale_xor_gradient() {
    // 16x16 eight bit grayscale, g(x, y) = x ^ y
    let size = 16_usize;
    let mut raw = Vec::new();

    for y in 0..size {
        raw.push(0);

        for x in 0..size {
            raw.push((x ^ y) as u8);
        }
    }

    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(16, 16, 8, 0, 0)));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&raw)));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let raster = decode_lenient(&data).unwrap();

    for y in 0..size {
        for x in 0..size {
            let g = (x ^ y) as u8;
            let px = &raster.data()[4 * (y * size + x)..][..4];

            assert_eq!(px, [g, g, g, 255], "pixel at ({x}, {y})");
        }
    }
}

#[test]
fn test_unknown_critical_chunk_errors() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(1, 1, 8, 0, 0)));
    data.extend_from_slice(&chunk(b"FAKE", &[1, 2, 3]));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&[0, 42])));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let err = decode_lenient(&data).unwrap_err();

    assert!(matches!(err, PngDecodeErrors::UnsupportedCritical(_)));
}

#[test]
fn test_unknown_ancillary_chunk_is_skipped() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(1, 1, 8, 0, 0)));
    data.extend_from_slice(&chunk(b"fAKE", &[1, 2, 3, 4, 5]));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&[0, 42])));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let raster = decode_lenient(&data).unwrap();

    assert_eq!(raster.data(), [42, 42, 42, 255]);
}

#[test]
fn test_invalid_chunk_type_bytes() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(1, 1, 8, 0, 0)));
    data.extend_from_slice(&chunk(b"ab1c", &[]));

    let err = decode_lenient(&data).unwrap_err();

    assert!(matches!(err, PngDecodeErrors::InvalidChunkType(_)));
}

#[test]
fn test_bad_filter_byte() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(1, 1, 8, 0, 0)));
    // filter byte 9 does not exist
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&[9, 42])));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let err = decode_lenient(&data).unwrap_err();

    assert!(matches!(err, PngDecodeErrors::BadFilterType(9)));
}

#[test]
fn test_bad_ihdr_depth_and_color() {
    for (depth, color) in [(3, 0), (8, 1), (16, 3), (2, 2)] {
        let mut data = SIGNATURE.to_vec();
        data.extend_from_slice(&chunk(b"IHDR", &ihdr(1, 1, depth, color, 0)));
        data.extend_from_slice(&chunk(b"IDAT", &zlib(&[0, 0])));
        data.extend_from_slice(&chunk(b"IEND", &[]));

        let err = decode_lenient(&data).unwrap_err();

        assert!(
            matches!(err, PngDecodeErrors::BadIhdr(_)),
            "depth {depth} color {color} accepted"
        );
    }
}

#[test]
fn test_inflated_surplus_is_truncated() {
    // some encoders append junk after the image plane inside the
    // deflate stream, everything past the plane is dropped
    let mut raw = vec![0_u8, 42];
    raw.extend_from_slice(&[0x99; 64]);

    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(1, 1, 8, 0, 0)));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&raw)));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let raster = decode_lenient(&data).unwrap();

    assert_eq!(raster.data(), [42, 42, 42, 255]);
}

#[test]
fn test_gamma_is_surfaced_on_the_raster() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(1, 1, 8, 0, 0)));
    data.extend_from_slice(&chunk(b"gAMA", &45455_u32.to_be_bytes()));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&[0, 100])));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let raster = decode_lenient(&data).unwrap();

    assert!((raster.gamma() - 0.45455).abs() < 1e-9);
}

#[test]
fn test_headers_only_pass() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(640, 480, 8, 6, 0)));
    data.extend_from_slice(&chunk(b"IDAT", &[])); // never reached

    let options = DecoderOptions::default().set_confirm_crc(false);
    let mut decoder = PngDecoder::new_with_options(&data, options);

    assert_eq!(decoder.dimensions(), None);

    decoder.decode_headers().unwrap();

    assert_eq!(decoder.dimensions(), Some((640, 480)));
    assert_eq!(
        decoder.colorspace(),
        Some(sable_core::colorspace::ColorSpace::RGBA)
    );
}

#[test]
fn test_dimension_limits_are_enforced() {
    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(100, 1, 8, 0, 0)));

    let options = DecoderOptions::default()
        .set_confirm_crc(false)
        .set_max_width(64);

    let err = PngDecoder::new_with_options(&data, options)
        .decode_headers()
        .unwrap_err();

    assert!(matches!(err, PngDecodeErrors::Generic(_)));
}
