//! Adam7 interlaced images against their sequential equivalents.
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use sable_core::options::DecoderOptions;
use sable_png::{PngDecoder, Raster};

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

// the Adam7 lattice, spelled out independently of the library
const XORIG: [usize; 7] = [0, 4, 0, 2, 0, 1, 0];
const YORIG: [usize; 7] = [0, 0, 4, 0, 2, 0, 1];
const XSPC: [usize; 7] = [8, 8, 4, 4, 2, 2, 1];
const YSPC: [usize; 7] = [8, 8, 8, 4, 4, 2, 2];

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

fn decode_lenient(data: &[u8]) -> Raster {
    let options = DecoderOptions::default().set_confirm_crc(false);

    PngDecoder::new_with_options(data, options).decode().unwrap()
}

fn pass_dimensions(pass: usize, width: usize, height: usize) -> (usize, usize) {
    let x = (width.saturating_sub(XORIG[pass]) + XSPC[pass] - 1) / XSPC[pass];
    let y = (height.saturating_sub(YORIG[pass]) + YSPC[pass] - 1) / YSPC[pass];

    (x, y)
}

/// Serialize `pixels` (one byte per sample) as the seven Adam7
/// sub-images, each scanline prefixed with a None filter byte
fn interlace_8bit(pixels: &[u8], width: usize, height: usize, components: usize) -> Vec<u8> {
    let mut raw = Vec::new();

    for pass in 0..7 {
        let (x, y) = pass_dimensions(pass, width, height);

        if x == 0 || y == 0 {
            continue;
        }
        for j in 0..y {
            raw.push(0);

            for i in 0..x {
                let src_x = i * XSPC[pass] + XORIG[pass];
                let src_y = j * YSPC[pass] + YORIG[pass];
                let offset = (src_y * width + src_x) * components;

                raw.extend_from_slice(&pixels[offset..offset + components]);
            }
        }
    }
    raw
}

/// Same for a 1 bit grayscale image, packing pass pixels MSB first
/// with each pass row padded to a byte boundary
fn interlace_1bit(bits: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut raw = Vec::new();

    for pass in 0..7 {
        let (x, y) = pass_dimensions(pass, width, height);

        if x == 0 || y == 0 {
            continue;
        }
        for j in 0..y {
            raw.push(0);

            let mut accum = 0_u8;
            let mut filled = 0;

            for i in 0..x {
                let src_x = i * XSPC[pass] + XORIG[pass];
                let src_y = j * YSPC[pass] + YORIG[pass];

                accum = (accum << 1) | bits[src_y * width + src_x];
                filled += 1;

                if filled == 8 {
                    raw.push(accum);
                    accum = 0;
                    filled = 0;
                }
            }
            if filled > 0 {
                raw.push(accum << (8 - filled));
            }
        }
    }
    raw
}

#[test]
fn test_interlaced_grayscale_odd_size() {
    // 9x9 hits partial 8x8 blocks in every direction
    let (width, height) = (9_usize, 9_usize);
    let mut pixels = Vec::new();

    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 16 + y) as u8);
        }
    }

    let raw = interlace_8bit(&pixels, width, height, 1);

    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(9, 9, 8, 0, 1)));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&raw)));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let raster = decode_lenient(&data);

    for y in 0..height {
        for x in 0..width {
            let g = (x * 16 + y) as u8;
            let px = &raster.data()[4 * (y * width + x)..][..4];

            assert_eq!(px, [g, g, g, 255], "pixel at ({x}, {y})");
        }
    }
}

#[test]
fn test_interlaced_matches_sequential_rgb() {
    let (width, height) = (8_usize, 8_usize);
    let mut pixels = Vec::new();

    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[(x * 31) as u8, (y * 29) as u8, ((x * y) & 255) as u8]);
        }
    }

    // sequential stream
    let mut plain = Vec::new();

    for row in pixels.chunks_exact(width * 3) {
        plain.push(0);
        plain.extend_from_slice(row);
    }

    let mut sequential = SIGNATURE.to_vec();
    sequential.extend_from_slice(&chunk(b"IHDR", &ihdr(8, 8, 8, 2, 0)));
    sequential.extend_from_slice(&chunk(b"IDAT", &zlib(&plain)));
    sequential.extend_from_slice(&chunk(b"IEND", &[]));

    // interlaced stream of the same image
    let raw = interlace_8bit(&pixels, width, height, 3);

    let mut interlaced = SIGNATURE.to_vec();
    interlaced.extend_from_slice(&chunk(b"IHDR", &ihdr(8, 8, 8, 2, 1)));
    interlaced.extend_from_slice(&chunk(b"IDAT", &zlib(&raw)));
    interlaced.extend_from_slice(&chunk(b"IEND", &[]));

    let a = decode_lenient(&sequential);
    let b = decode_lenient(&interlaced);

    assert_eq!(a.data(), b.data());
}

#[test]
fn test_interlaced_one_bit_checkerboard() {
    let (width, height) = (5_usize, 5_usize);
    let mut bits = Vec::new();

    for y in 0..height {
        for x in 0..width {
            bits.push(((x + y) & 1) as u8);
        }
    }

    let raw = interlace_1bit(&bits, width, height);

    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(5, 5, 1, 0, 1)));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&raw)));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let raster = decode_lenient(&data);

    for y in 0..height {
        for x in 0..width {
            let expected = if (x + y) & 1 == 1 { 0xFF } else { 0x00 };
            let px = &raster.data()[4 * (y * width + x)..][..4];

            assert_eq!(px, [expected, expected, expected, 255], "pixel at ({x}, {y})");
        }
    }
}

#[test]
fn test_interlaced_single_pixel() {
    // only the first pass carries data
    let raw = [0_u8, 77];

    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(1, 1, 8, 0, 1)));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&raw)));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let raster = decode_lenient(&data);

    assert_eq!(raster.data(), [77, 77, 77, 255]);
}

#[test]
fn test_truncated_interlaced_stream() {
    // drop the last pass entirely
    let (width, height) = (8_usize, 8_usize);
    let pixels = vec![7_u8; width * height];

    let mut raw = interlace_8bit(&pixels, width, height, 1);
    raw.truncate(raw.len() - 9 * 4);

    let mut data = SIGNATURE.to_vec();
    data.extend_from_slice(&chunk(b"IHDR", &ihdr(8, 8, 8, 0, 1)));
    data.extend_from_slice(&chunk(b"IDAT", &zlib(&raw)));
    data.extend_from_slice(&chunk(b"IEND", &[]));

    let options = DecoderOptions::default().set_confirm_crc(false);
    let err = PngDecoder::new_with_options(&data, options)
        .decode()
        .unwrap_err();

    assert!(matches!(
        err,
        sable_png::error::PngDecodeErrors::Truncated(_)
    ));
}
