//! Speckle removal and intensity rescaling ahead of feature detection.

use ndarray::Array2;

/// Square binary erosion (`all`) or dilation (`any`) of `mask`.
fn square_filter(mask: &Array2<bool>, size: usize, all: bool) -> Array2<bool> {
    let (rows, cols) = mask.dim();
    let lo = (size / 2) as isize;
    let hi = (size as isize - 1) - lo;
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let mut hit = all;
        'outer: for dr in -lo..=hi {
            for dc in -lo..=hi {
                let rr = r as isize + dr;
                let cc = c as isize + dc;
                // Outside the grid counts as background.
                let inside = rr >= 0 && cc >= 0 && (rr as usize) < rows && (cc as usize) < cols;
                let v = inside && mask[[rr as usize, cc as usize]];
                if all && !v {
                    hit = false;
                    break 'outer;
                }
                if !all && v {
                    hit = true;
                    break 'outer;
                }
            }
        }
        hit
    })
}

/// Morphological opening of the region above `floor` with a `size`×`size`
/// square. Pixels removed by the opening are set to `floor`.
///
/// A `size` of 0 or 1 leaves the field unchanged.
pub fn open_above(field: &Array2<f64>, floor: f64, size: usize) -> Array2<f64> {
    if size <= 1 {
        return field.clone();
    }
    let mask = field.mapv(|v| v.is_finite() && v > floor);
    let opened = square_filter(&square_filter(&mask, size, true), size, false);
    Array2::from_shape_fn(field.dim(), |(r, c)| {
        if opened[[r, c]] { field[[r, c]] } else { floor }
    })
}

/// Linearly map `[lo, hi]` to `[0, 255]`. Values are clamped; non-finite
/// pixels map to 0. When `hi <= lo` the result is all zeros.
pub fn rescale(field: &Array2<f64>, lo: f64, hi: f64) -> Array2<f64> {
    if !(hi > lo) {
        return Array2::zeros(field.dim());
    }
    let scale = 255.0 / (hi - lo);
    field.mapv(|v| {
        if v.is_finite() {
            ((v - lo) * scale).clamp(0.0, 255.0)
        } else {
            0.0
        }
    })
}

/// Finite minimum and maximum over several fields.
pub fn joint_range<'a, I>(fields: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a Array2<f64>>,
{
    let mut range: Option<(f64, f64)> = None;
    for f in fields {
        for &v in f.iter().filter(|v| v.is_finite()) {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
    }
    range
}
