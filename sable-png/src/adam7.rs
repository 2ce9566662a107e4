//! Adam7 pass geometry.
//!
//! Interlaced images store seven sub-images, each one sampling the
//! full image on a lattice inside every 8x8 block. The tables below
//! give the lattice origin and spacing per pass.

pub(crate) const XORIG: [usize; 7] = [0, 4, 0, 2, 0, 1, 0];
pub(crate) const YORIG: [usize; 7] = [0, 0, 4, 0, 2, 0, 1];

pub(crate) const XSPC: [usize; 7] = [8, 8, 4, 4, 2, 2, 1];
pub(crate) const YSPC: [usize; 7] = [8, 8, 8, 4, 4, 2, 2];

/// Width and height in pixels of `pass` for an image of
/// `width` by `height`.
///
/// Either dimension may come out as zero for small images, such
/// passes carry no data at all in the stream.
pub(crate) fn pass_dimensions(pass: usize, width: usize, height: usize) -> (usize, usize) {
    let x = (width.saturating_sub(XORIG[pass]) + XSPC[pass] - 1) / XSPC[pass];
    let y = (height.saturating_sub(YORIG[pass]) + YSPC[pass] - 1) / YSPC[pass];

    (x, y)
}

/// Number of bytes a pass sub-image of `width` by `height` pixels
/// occupies in the inflated stream, filter bytes included
pub(crate) fn pass_subimage_len(components: usize, depth: u8, width: usize, height: usize) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    let mut len = components * width;

    len *= usize::from(depth);
    len += 7;
    len /= 8;
    // filter byte
    len += 1;
    len * height
}

/// Total size of the inflated stream for an interlaced image,
/// the sum of all seven sub-images
pub(crate) fn expected_interlaced_len(
    components: usize, depth: u8, width: usize, height: usize
) -> usize {
    let mut total = 0;

    for pass in 0..7 {
        let (x, y) = pass_dimensions(pass, width, height);

        total += pass_subimage_len(components, depth, x, y);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    // The seven passes must cover every pixel exactly once,
    // whatever the image dimensions.
    #[test]
    fn test_passes_partition_the_image() {
        for (width, height) in [(1, 1), (2, 2), (5, 5), (7, 5), (8, 8), (13, 9), (33, 17)] {
            let mut seen = vec![false; width * height];

            for pass in 0..7 {
                let (x, y) = pass_dimensions(pass, width, height);

                for j in 0..y {
                    for i in 0..x {
                        let out_x = i * XSPC[pass] + XORIG[pass];
                        let out_y = j * YSPC[pass] + YORIG[pass];

                        assert!(out_x < width, "{width}x{height} pass {pass}");
                        assert!(out_y < height, "{width}x{height} pass {pass}");

                        let position = out_y * width + out_x;

                        assert!(!seen[position], "{width}x{height} pass {pass} repeats a pixel");
                        seen[position] = true;
                    }
                }
            }
            assert!(seen.iter().all(|c| *c), "{width}x{height} left pixels uncovered");
        }
    }

    #[test]
    fn test_empty_passes_for_tiny_images() {
        // a single pixel image only has data in the first pass
        for pass in 1..7 {
            let (x, y) = pass_dimensions(pass, 1, 1);
            assert!(x == 0 || y == 0);
            assert_eq!(pass_subimage_len(3, 8, x, y), 0);
        }

        assert_eq!(pass_dimensions(0, 1, 1), (1, 1));
    }

    #[test]
    fn test_expected_len_matches_sequential_for_full_blocks() {
        // an 8x8 block contains each pass fully
        let len = expected_interlaced_len(1, 8, 8, 8);

        // pass widths 1,1,2,2,4,4,8 and heights 1,1,1,2,2,4,4
        // each row pays one filter byte
        let by_hand = (1 + 1) * 1
            + (1 + 1) * 1
            + (2 + 1) * 1
            + (2 + 1) * 2
            + (4 + 1) * 2
            + (4 + 1) * 4
            + (8 + 1) * 4;

        assert_eq!(len, by_hand);
    }
}
