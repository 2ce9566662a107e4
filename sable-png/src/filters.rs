//! Scanline filters, both directions.
//!
//! The de-filtering half undoes the five PNG filters on decode. The
//! first scanline of every pass has no row above it, those cases get
//! dedicated `*_first` handlers that treat the previous row as zero.
//!
//! The filtering half applies a filter when encoding, plus the
//! heuristic that picks one per scanline.
use crate::enums::FilterMethod;

/// Reverse the `Sub` filter, the left neighbour is `components`
/// bytes back
pub(crate) fn handle_sub(raw: &[u8], current: &mut [u8], components: usize) {
    let end = current.len().min(raw.len());

    for i in 0..components.min(end) {
        current[i] = raw[i];
    }
    for i in components..end {
        current[i] = raw[i].wrapping_add(current[i - components]);
    }
}

/// Reverse the `Up` filter
pub(crate) fn handle_up(prev_row: &[u8], raw: &[u8], current: &mut [u8]) {
    for ((recon, filt), up) in current.iter_mut().zip(raw).zip(prev_row) {
        *recon = filt.wrapping_add(*up);
    }
}

/// Reverse the `Average` filter.
///
/// The sum needs nine bits before halving, so it runs in u16.
pub(crate) fn handle_avg(prev_row: &[u8], raw: &[u8], current: &mut [u8], components: usize) {
    let end = current.len().min(raw.len()).min(prev_row.len());

    for i in 0..components.min(end) {
        current[i] = raw[i].wrapping_add(prev_row[i] >> 1);
    }
    for i in components..end {
        let left = u16::from(current[i - components]);
        let up = u16::from(prev_row[i]);

        current[i] = raw[i].wrapping_add(((left + up) >> 1) as u8);
    }
}

/// Reverse the `Average` filter on the first scanline, the
/// row above is all zero
pub(crate) fn handle_avg_first(raw: &[u8], current: &mut [u8], components: usize) {
    let end = current.len().min(raw.len());

    for i in 0..components.min(end) {
        current[i] = raw[i];
    }
    for i in components..end {
        current[i] = raw[i].wrapping_add(current[i - components] >> 1);
    }
}

/// Reverse the `Paeth` filter
pub(crate) fn handle_paeth(prev_row: &[u8], raw: &[u8], current: &mut [u8], components: usize) {
    let end = current.len().min(raw.len()).min(prev_row.len());

    for i in 0..components.min(end) {
        current[i] = raw[i].wrapping_add(paeth(0, prev_row[i], 0));
    }
    for i in components..end {
        let predictor = paeth(
            current[i - components],
            prev_row[i],
            prev_row[i - components]
        );

        current[i] = raw[i].wrapping_add(predictor);
    }
}

/// Reverse the `Paeth` filter on the first scanline, the
/// row above is all zero
pub(crate) fn handle_paeth_first(raw: &[u8], current: &mut [u8], components: usize) {
    let end = current.len().min(raw.len());

    for i in 0..components.min(end) {
        current[i] = raw[i];
    }
    for i in components..end {
        let predictor = paeth(current[i - components], 0, 0);

        current[i] = raw[i].wrapping_add(predictor);
    }
}

/// The Paeth predictor, the neighbour closest to `left + up - upleft`,
/// ties broken in the order a, b, c
#[inline(always)]
pub(crate) fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let a = i32::from(a);
    let b = i32::from(b);
    let c = i32::from(c);

    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        return a as u8;
    }
    if pb <= pc {
        return b as u8;
    }
    c as u8
}

/// Apply `filter` to a scanline when encoding.
///
/// `output` receives the filter byte followed by the filtered data,
/// `previous` is empty on the first scanline.
pub(crate) fn filter_scanline(
    current: &[u8], previous: &[u8], output: &mut [u8], filter: FilterMethod, components: usize
) {
    output[0] = filter.to_int();

    let out = &mut output[1..=current.len()];

    match filter {
        FilterMethod::None => out.copy_from_slice(current),

        FilterMethod::Sub => {
            for i in 0..current.len() {
                let left = if i >= components { current[i - components] } else { 0 };

                out[i] = current[i].wrapping_sub(left);
            }
        }
        FilterMethod::Up => {
            for i in 0..current.len() {
                let up = previous.get(i).copied().unwrap_or(0);

                out[i] = current[i].wrapping_sub(up);
            }
        }
        FilterMethod::Average => {
            for i in 0..current.len() {
                let left = if i >= components {
                    u16::from(current[i - components])
                } else {
                    0
                };
                let up = previous.get(i).copied().map(u16::from).unwrap_or(0);

                out[i] = current[i].wrapping_sub(((left + up) >> 1) as u8);
            }
        }
        FilterMethod::Paeth => {
            for i in 0..current.len() {
                let a = if i >= components { current[i - components] } else { 0 };
                let b = previous.get(i).copied().unwrap_or(0);
                let c = if i >= components {
                    previous.get(i - components).copied().unwrap_or(0)
                } else {
                    0
                };

                out[i] = current[i].wrapping_sub(paeth(a, b, c));
            }
        }
        _ => unreachable!()
    }
}

/// Pick the filter whose output carries the least energy, the
/// minimum sum of absolute values heuristic.
///
/// `scratch` must hold one filtered scanline, `current.len() + 1`
/// bytes. Ties keep the earlier filter in scan order.
pub(crate) fn choose_filter(
    previous: &[u8], current: &[u8], components: usize, scratch: &mut [u8]
) -> FilterMethod {
    const CANDIDATES: [FilterMethod; 5] = [
        FilterMethod::None,
        FilterMethod::Sub,
        FilterMethod::Up,
        FilterMethod::Average,
        FilterMethod::Paeth
    ];

    let mut best = FilterMethod::None;
    let mut best_sum = u64::MAX;

    for filter in CANDIDATES {
        filter_scanline(current, previous, scratch, filter, components);

        let sum: u64 = scratch[1..=current.len()]
            .iter()
            .map(|b| u64::from((*b as i8).unsigned_abs()))
            .sum();

        if sum < best_sum {
            best_sum = sum;
            best = filter;
        }
    }
    best
}
