//! Writers for the chunks the encoder emits.
use sable_core::bytestream::ByteWriter;
use sable_core::colorspace::ColorSpace;

use crate::constants::GAMMA_SCALE;
use crate::crc::{calc_crc, crc32_slice};
use crate::encoder::PngEncoder;

pub(crate) fn write_ihdr(ctx: &PngEncoder, output: &mut ByteWriter<'_>) {
    output.write_u32_be(ctx.options.get_width() as u32);
    output.write_u32_be(ctx.options.get_height() as u32);
    output.write_u8(ctx.options.get_depth().bit_size() as u8);

    let color_int = match ctx.out_color {
        ColorSpace::Luma => 0,
        ColorSpace::RGB => 2,
        ColorSpace::LumaA => 4,
        ColorSpace::RGBA => 6,
        _ => unreachable!()
    };

    output.write_u8(color_int);
    // compression method
    output.write_u8(0);
    // filter method
    output.write_u8(0);
    // interlace method, the encoder never interlaces
    output.write_u8(0);
}

pub(crate) fn write_gamma(ctx: &PngEncoder, writer: &mut ByteWriter<'_>) {
    if let Some(gamma) = ctx.gamma {
        writer.write_u32_be((gamma * GAMMA_SCALE).floor() as u32);
    }
}

// iend carries no body
pub(crate) fn write_iend(_: &PngEncoder, _: &mut ByteWriter<'_>) {}

/// Write the boilerplate around one chunk.
///
/// The length prefix is only known after the body is written, so the
/// chunk is staged in a scratch vector, the length patched in, and the
/// checksum (which covers type and body but not the length) appended.
pub(crate) fn write_header_fn<F>(ctx: &PngEncoder, out: &mut Vec<u8>, name: &[u8; 4], func: F)
where
    F: Fn(&PngEncoder, &mut ByteWriter<'_>)
{
    let mut temp_space = Vec::with_capacity(32);

    // space for the length
    temp_space.extend_from_slice(&[0; 4]);
    {
        let mut local_writer = ByteWriter::new(&mut temp_space);

        local_writer.write_all(name);
        (func)(ctx, &mut local_writer);
    }

    let data_len = temp_space.len() - 8;
    temp_space[0..4].copy_from_slice(&(data_len as u32).to_be_bytes());

    let crc = calc_crc(&temp_space[4..]);
    temp_space.extend_from_slice(&crc.to_be_bytes());

    out.extend_from_slice(&temp_space);
}

/// Write one chunk whose body already exists as a slice, used for
/// the IDAT stream
pub(crate) fn write_chunk(name: &[u8; 4], data: &[u8], out: &mut Vec<u8>) {
    let mut writer = ByteWriter::new(out);

    writer.write_u32_be(data.len() as u32);
    writer.write_all(name);
    writer.write_all(data);

    // crc is a continuation, checksum the type then fold the body in
    let crc = crc32_slice(name, u32::MAX);
    let crc = !crc32_slice(data, crc);

    writer.write_u32_be(crc);
}
