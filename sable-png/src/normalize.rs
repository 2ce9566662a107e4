//! Conversion of decoded native planes into the canonical
//! 8 bit RGBA representation.
//!
//! Palette images arrive here already expanded, what remains is
//! transparency keying, depth rescaling and channel expansion.
use crate::constants::DEPTH_SCALE_TABLE;
use crate::enums::PngColor;
use crate::error::PngDecodeErrors;

/// Narrow a 16 bit sample to 8 bits, rounding rather than
/// truncating: `round(sample * 255 / 65535)`
#[inline]
fn scale16(sample: u16) -> u8 {
    ((u32::from(sample) * 255 + 32767) / 65535) as u8
}

/// The tRNS key at the scale the decoded 8 bit samples use.
///
/// Samples below depth 8 were widened with the depth scale table,
/// so the key has to be widened the same way before comparing.
#[inline]
fn luma_key(trns: [u16; 3], depth: u8) -> u8 {
    let mask = (1_u32 << depth) - 1;

    ((u32::from(trns[0]) & mask) as u8).wrapping_mul(DEPTH_SCALE_TABLE[usize::from(depth)])
}

/// Convert a decoded native plane to tightly packed 8 bit RGBA.
///
/// `trns` carries the simple transparency key for grayscale and RGB
/// sources, any pixel matching it is written fully transparent with
/// all four channels zero.
pub(crate) fn to_rgba8(
    color: PngColor, depth: u8, trns: Option<[u16; 3]>, native: &[u8], width: usize, height: usize
) -> Result<Vec<u8>, PngDecodeErrors> {
    let pixels = width * height;

    let components = usize::from(color.num_components());
    let sample_bytes = if depth == 16 { 2 } else { 1 };
    let expected = pixels * components * sample_bytes;

    if native.len() < expected {
        return Err(PngDecodeErrors::Truncated("image plane is incomplete"));
    }

    let native = &native[..expected];
    let mut out = Vec::with_capacity(pixels * 4);

    if depth == 16 {
        match color {
            PngColor::Luma => {
                let key = trns.map(|t| t[0]);

                for px in native.chunks_exact(2) {
                    let g16 = u16::from_be_bytes([px[0], px[1]]);

                    if key == Some(g16) {
                        out.extend_from_slice(&[0, 0, 0, 0]);
                    } else {
                        let g = scale16(g16);
                        out.extend_from_slice(&[g, g, g, 255]);
                    }
                }
            }
            PngColor::LumaA => {
                for px in native.chunks_exact(4) {
                    let g = scale16(u16::from_be_bytes([px[0], px[1]]));
                    let a = scale16(u16::from_be_bytes([px[2], px[3]]));

                    out.extend_from_slice(&[g, g, g, a]);
                }
            }
            PngColor::RGB => {
                let key = trns.map(|t| [t[0], t[1], t[2]]);

                for px in native.chunks_exact(6) {
                    let r16 = u16::from_be_bytes([px[0], px[1]]);
                    let g16 = u16::from_be_bytes([px[2], px[3]]);
                    let b16 = u16::from_be_bytes([px[4], px[5]]);

                    if key == Some([r16, g16, b16]) {
                        out.extend_from_slice(&[0, 0, 0, 0]);
                    } else {
                        out.extend_from_slice(&[scale16(r16), scale16(g16), scale16(b16), 255]);
                    }
                }
            }
            PngColor::RGBA => {
                for px in native.chunks_exact(8) {
                    let r = scale16(u16::from_be_bytes([px[0], px[1]]));
                    let g = scale16(u16::from_be_bytes([px[2], px[3]]));
                    let b = scale16(u16::from_be_bytes([px[4], px[5]]));
                    let a = scale16(u16::from_be_bytes([px[6], px[7]]));

                    out.extend_from_slice(&[r, g, b, a]);
                }
            }
            PngColor::Palette | PngColor::Unknown => unreachable!()
        }
    } else {
        match color {
            PngColor::Luma => {
                let key = trns.map(|t| luma_key(t, depth));

                for g in native {
                    if key == Some(*g) {
                        out.extend_from_slice(&[0, 0, 0, 0]);
                    } else {
                        out.extend_from_slice(&[*g, *g, *g, 255]);
                    }
                }
            }
            PngColor::LumaA => {
                for px in native.chunks_exact(2) {
                    out.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
                }
            }
            PngColor::RGB => {
                let key = trns.map(|t| [(t[0] & 255) as u8, (t[1] & 255) as u8, (t[2] & 255) as u8]);

                for px in native.chunks_exact(3) {
                    if key == Some([px[0], px[1], px[2]]) {
                        out.extend_from_slice(&[0, 0, 0, 0]);
                    } else {
                        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                    }
                }
            }
            PngColor::RGBA => out.extend_from_slice(native),
            PngColor::Palette | PngColor::Unknown => unreachable!()
        }
    }

    Ok(out)
}
