//! Integration tests for the motion estimator on synthetic textures.

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nimbus_motion::{Bandwidth, MotionConfig, MotionError, MotionEstimator, MotionWindow};

/// Sum of random Gaussian cells, evaluated at `(row - dy, col - dx)`.
struct Texture {
    cells: Vec<(f64, f64, f64, f64)>,
}

impl Texture {
    fn new(n: usize, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let cells = (0..count)
            .map(|_| {
                (
                    rng.random_range(0.0..n as f64),
                    rng.random_range(0.0..n as f64),
                    rng.random_range(3.0..6.0),
                    rng.random_range(50.0..255.0),
                )
            })
            .collect();
        Self { cells }
    }

    fn render(&self, n: usize, dy: f64, dx: f64) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(r, c)| {
            let y = r as f64 - dy;
            let x = c as f64 - dx;
            self.cells
                .iter()
                .map(|&(cy, cx, s, a)| {
                    a * (-((y - cy).powi(2) + (x - cx).powi(2)) / (2.0 * s * s)).exp()
                })
                .sum()
        })
    }
}

#[test]
fn uniform_translation_is_recovered() {
    let n = 96;
    let tex = Texture::new(n, 60, 11);
    let older = tex.render(n, 0.0, 0.0);
    let newer = tex.render(n, 1.0, 2.0);

    let est = MotionEstimator::new(MotionConfig::default()).unwrap();
    let mut window = MotionWindow::new(3).unwrap();
    let out = est.estimate(&older, &newer, &mut window).unwrap();

    let (u, v) = out.flow().mean_motion();
    assert_abs_diff_eq!(u, 2.0, epsilon = 0.05);
    assert_abs_diff_eq!(v, 1.0, epsilon = 0.05);
    assert_eq!(out.bandwidth(), 100.0);
    let d = out.diagnostics();
    assert!(d.n_corners >= d.n_tracked);
    assert!(d.n_tracked >= d.n_filtered);
    assert!(d.n_declustered >= 3);
}

#[test]
fn static_texture_gives_zero_flow() {
    let n = 96;
    let f = Texture::new(n, 60, 12).render(n, 0.0, 0.0);
    let est = MotionEstimator::new(MotionConfig::default()).unwrap();
    let mut window = MotionWindow::new(3).unwrap();
    let out = est.estimate(&f, &f, &mut window).unwrap();
    assert!(out.flow().u().iter().all(|&u| u == 0.0));
    assert!(out.flow().v().iter().all(|&v| v == 0.0));
    assert_eq!(out.diagnostics().median_speed, Some(0.0));
}

#[test]
fn window_pools_successive_pairs() {
    let n = 96;
    let tex = Texture::new(n, 60, 13);
    let frames: Vec<Array2<f64>> = (0..5).map(|t| tex.render(n, 0.0, t as f64)).collect();
    let est = MotionEstimator::new(MotionConfig::default().with_bandwidth(Bandwidth::Silverman))
        .unwrap();
    let mut window = MotionWindow::new(3).unwrap();

    let mut pooled = Vec::new();
    for pair in frames.windows(2) {
        let out = est.estimate(&pair[0], &pair[1], &mut window).unwrap();
        pooled.push(out.diagnostics().n_pooled);
        assert_abs_diff_eq!(out.flow().mean_motion().0, 1.0, epsilon = 0.05);
    }
    assert_eq!(window.len(), 3);
    // Pool grows while the window fills, then stays bounded.
    assert!(pooled[1] > pooled[0]);
    assert!(pooled[2] > pooled[1]);
}

#[test]
fn uniform_field_leaves_motion_undefined() {
    // A uniform field has no features: motion must be undefined, not zero.
    let f = Array2::from_elem((64, 64), 12.0);
    let est = MotionEstimator::new(MotionConfig::default()).unwrap();
    let mut window = MotionWindow::new(3).unwrap();
    let err = est.estimate(&f, &f, &mut window).unwrap_err();
    assert!(matches!(err, MotionError::InsufficientSamples { .. }));
}
