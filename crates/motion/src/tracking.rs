//! Template matching of corners between two fields.

use ndarray::{Array2, ArrayView2, s};
use rayon::prelude::*;

use crate::corners::Corner;
use crate::sample::MotionSample;

/// Small penalty on displacement length so that zero motion wins ties.
const MOTION_LAMBDA: f64 = 0.01;

/// Template variance below which a patch is considered featureless.
const FLAT_VARIANCE: f64 = 1e-9;

/// Mean squared difference between two equally sized patches.
fn msd(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> f64 {
    let n = a.len() as f64;
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        / n
}

/// Vertex offset of the parabola through `(-1, m)`, `(0, c)`, `(1, p)`.
fn parabolic_offset(m: f64, c: f64, p: f64) -> f64 {
    let denom = m - 2.0 * c + p;
    if denom <= 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (0.5 * (m - p) / denom).clamp(-0.5, 0.5)
}

/// Track one corner; `None` if the search area leaves the grid or the
/// template is flat.
fn track_one(
    older: &Array2<f64>,
    newer: &Array2<f64>,
    corner: &Corner,
    half: usize,
    radius: usize,
) -> Option<MotionSample> {
    let (rows, cols) = older.dim();
    let (r, c) = (corner.row, corner.col);
    let margin = half + radius;
    if r < margin || c < margin || r + margin >= rows || c + margin >= cols {
        return None;
    }
    let template = older.slice(s![r - half..=r + half, c - half..=c + half]);
    let mean = template.mean()?;
    let var = template.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / template.len() as f64;
    if var < FLAT_VARIANCE {
        return None;
    }

    let radius = radius as isize;
    let side = (2 * radius + 1) as usize;
    let mut costs = Array2::from_elem((side, side), f64::INFINITY);
    let mut best = (0isize, 0isize, f64::INFINITY, f64::INFINITY);

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let rr = (r as isize + dy) as usize;
            let cc = (c as isize + dx) as usize;
            let candidate = newer.slice(s![rr - half..=rr + half, cc - half..=cc + half]);
            let err = msd(&template, &candidate);
            let cost = err + MOTION_LAMBDA * ((dy * dy + dx * dx) as f64).sqrt();
            costs[[(dy + radius) as usize, (dx + radius) as usize]] = cost;
            if cost < best.2 {
                best = (dy, dx, cost, err);
            }
        }
    }
    let (dy, dx, _, err) = best;
    if !err.is_finite() {
        return None;
    }

    // An exact match cannot be improved by interpolation.
    let (mut sub_y, mut sub_x) = (0.0, 0.0);
    if err > 0.0 {
        let (iy, ix) = ((dy + radius) as usize, (dx + radius) as usize);
        let c0 = costs[[iy, ix]];
        if iy > 0 && iy + 1 < side {
            sub_y = parabolic_offset(costs[[iy - 1, ix]], c0, costs[[iy + 1, ix]]);
        }
        if ix > 0 && ix + 1 < side {
            sub_x = parabolic_offset(costs[[iy, ix - 1]], c0, costs[[iy, ix + 1]]);
        }
    }

    Some(MotionSample::new(
        c as f64,
        r as f64,
        dx as f64 + sub_x,
        dy as f64 + sub_y,
    ))
}

/// Track every corner of `older` into `newer` by exhaustive template search
/// within `radius` pixels. Templates are `(2 * half + 1)` pixels wide.
///
/// Corners whose search area leaves the grid, and corners on featureless
/// patches, are dropped.
pub fn track_corners(
    older: &Array2<f64>,
    newer: &Array2<f64>,
    corners: &[Corner],
    half: usize,
    radius: usize,
) -> Vec<MotionSample> {
    corners
        .par_iter()
        .filter_map(|corner| track_one(older, newer, corner, half, radius))
        .collect()
}
