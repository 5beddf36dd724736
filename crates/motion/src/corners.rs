//! Shi-Tomasi corner detection.
//!
//! The corner score is the smaller eigenvalue of the gradient structure
//! tensor summed over a `block_size` window. Candidates must be local maxima,
//! exceed `quality * max_score`, and are accepted strongest first while
//! keeping `min_distance` from every accepted corner.

use ndarray::Array2;

/// A detected corner on the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Minimum eigenvalue of the structure tensor.
    pub score: f64,
}

/// Parameters for [`detect_corners`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerParams {
    /// Maximum number of corners returned.
    pub max_corners: usize,
    /// Fraction of the best score a corner must reach.
    pub quality: f64,
    /// Minimum Euclidean distance between corners (pixels).
    pub min_distance: f64,
    /// Side of the summation window (pixels).
    pub block_size: usize,
}

impl Default for CornerParams {
    fn default() -> Self {
        Self {
            max_corners: 500,
            quality: 0.05,
            min_distance: 5.0,
            block_size: 15,
        }
    }
}

/// Sobel derivatives along columns (`gx`) and rows (`gy`); zero on the border.
fn sobel(img: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
    let (rows, cols) = img.dim();
    let mut gx = Array2::zeros((rows, cols));
    let mut gy = Array2::zeros((rows, cols));
    for r in 1..rows.saturating_sub(1) {
        for c in 1..cols.saturating_sub(1) {
            let p = |dr: isize, dc: isize| {
                img[[(r as isize + dr) as usize, (c as isize + dc) as usize]]
            };
            gx[[r, c]] = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
            gy[[r, c]] = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
        }
    }
    (gx, gy)
}

/// Summed-area table with a leading row and column of zeros.
fn integral(img: &Array2<f64>) -> Array2<f64> {
    let (rows, cols) = img.dim();
    let mut sat = Array2::zeros((rows + 1, cols + 1));
    for r in 0..rows {
        let mut row_sum = 0.0;
        for c in 0..cols {
            row_sum += img[[r, c]];
            sat[[r + 1, c + 1]] = sat[[r, c + 1]] + row_sum;
        }
    }
    sat
}

fn box_sum(sat: &Array2<f64>, r0: usize, c0: usize, r1: usize, c1: usize) -> f64 {
    sat[[r1, c1]] - sat[[r0, c1]] - sat[[r1, c0]] + sat[[r0, c0]]
}

/// Minimum-eigenvalue corner response. Pixels whose window leaves the grid
/// score 0.
pub fn corner_response(img: &Array2<f64>, block_size: usize) -> Array2<f64> {
    let (rows, cols) = img.dim();
    let (gx, gy) = sobel(img);
    let sxx = integral(&(&gx * &gx));
    let syy = integral(&(&gy * &gy));
    let sxy = integral(&(&gx * &gy));
    let half = block_size / 2;

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        if r < half + 1 || c < half + 1 || r + half + 1 >= rows || c + half + 1 >= cols {
            return 0.0;
        }
        let (r0, c0, r1, c1) = (r - half, c - half, r + half + 1, c + half + 1);
        let a = box_sum(&sxx, r0, c0, r1, c1);
        let b = box_sum(&sxy, r0, c0, r1, c1);
        let d = box_sum(&syy, r0, c0, r1, c1);
        let half_trace = 0.5 * (a + d);
        let disc = (0.25 * (a - d) * (a - d) + b * b).sqrt();
        (half_trace - disc).max(0.0)
    })
}

/// Detect up to `params.max_corners` well separated corners in `img`.
pub fn detect_corners(img: &Array2<f64>, params: &CornerParams) -> Vec<Corner> {
    let (rows, cols) = img.dim();
    if rows < 3 || cols < 3 || params.max_corners == 0 {
        return Vec::new();
    }
    let response = corner_response(img, params.block_size);
    let best = response.iter().copied().fold(0.0, f64::max);
    if best <= 0.0 {
        return Vec::new();
    }
    let threshold = params.quality * best;

    let mut candidates: Vec<Corner> = Vec::new();
    for r in 1..rows - 1 {
        for c in 1..cols - 1 {
            let s = response[[r, c]];
            if s <= threshold {
                continue;
            }
            let is_max = (r - 1..=r + 1)
                .flat_map(|rr| (c - 1..=c + 1).map(move |cc| (rr, cc)))
                .all(|(rr, cc)| response[[rr, cc]] <= s);
            if is_max {
                candidates.push(Corner { row: r, col: c, score: s });
            }
        }
    }
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let min_d2 = params.min_distance * params.min_distance;
    let mut accepted: Vec<Corner> = Vec::new();
    for cand in candidates {
        let far = accepted.iter().all(|a| {
            let dr = a.row as f64 - cand.row as f64;
            let dc = a.col as f64 - cand.col as f64;
            dr * dr + dc * dc >= min_d2
        });
        if far {
            accepted.push(cand);
            if accepted.len() == params.max_corners {
                break;
            }
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_image(n: usize, lo: usize, hi: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(r, c)| {
            if (lo..hi).contains(&r) && (lo..hi).contains(&c) { 255.0 } else { 0.0 }
        })
    }

    #[test]
    fn flat_image_has_no_corners() {
        let img = Array2::from_elem((32, 32), 7.0);
        assert!(detect_corners(&img, &CornerParams::default()).is_empty());
    }

    #[test]
    fn square_yields_its_four_corners() {
        let img = square_image(64, 20, 44);
        let params = CornerParams {
            block_size: 5,
            min_distance: 10.0,
            ..CornerParams::default()
        };
        let corners = detect_corners(&img, &params);
        assert!(corners.len() >= 4);
        for (r, c) in [(20, 20), (20, 43), (43, 20), (43, 43)] {
            let near = corners.iter().any(|k| {
                (k.row as isize - r as isize).abs() <= 3 && (k.col as isize - c as isize).abs() <= 3
            });
            assert!(near, "no corner near ({r}, {c})");
        }
    }

    #[test]
    fn respects_max_and_distance() {
        let img = square_image(64, 20, 44);
        let params = CornerParams {
            max_corners: 2,
            block_size: 5,
            min_distance: 10.0,
            ..CornerParams::default()
        };
        let corners = detect_corners(&img, &params);
        assert_eq!(corners.len(), 2);
        let d = ((corners[0].row as f64 - corners[1].row as f64).powi(2)
            + (corners[0].col as f64 - corners[1].col as f64).powi(2))
        .sqrt();
        assert!(d >= 10.0);
    }

    #[test]
    fn straight_edge_scores_low() {
        // A vertical edge has one dominant gradient direction.
        let img = Array2::from_shape_fn((32, 32), |(_, c)| if c < 16 { 0.0 } else { 255.0 });
        let resp = corner_response(&img, 5);
        assert!(resp.iter().all(|v| *v < 1e-6));
    }
}
