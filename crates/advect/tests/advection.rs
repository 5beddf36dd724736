//! Integration tests for semi-Lagrangian advection.

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use nimbus_advect::{Advector, SemiLagrangian};
use nimbus_motion::DenseFlowField;

fn texture(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(r, c)| {
        20.0 + 10.0 * ((r as f64) * 0.3).sin() * ((c as f64) * 0.2).cos()
    })
}

#[test]
fn zero_flow_is_identity() {
    let f = texture(32);
    for downscale in [1.0, 0.5] {
        let adv = SemiLagrangian::new(downscale).unwrap();
        let out = adv.advect(&f, &DenseFlowField::zeros((32, 32)), 1).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], f);
    }
}

#[test]
fn zero_flow_identity_for_every_lag() {
    let f = texture(16);
    let adv = SemiLagrangian::default();
    let out = adv.advect(&f, &DenseFlowField::zeros((16, 16)), 3).unwrap();
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|p| *p == f));
}

#[test]
fn uniform_shift_moves_field() {
    let f = texture(24);
    let adv = SemiLagrangian::new(0.5).unwrap();
    let flow = DenseFlowField::uniform((24, 24), 1.0, 2.0);
    let out = adv.advect(&f, &flow, 2).unwrap();

    for r in 4..24 {
        for c in 2..24 {
            assert_abs_diff_eq!(out[0][[r, c]], f[[r - 2, c - 1]], epsilon = 1e-12);
            assert_abs_diff_eq!(out[1][[r, c]], f[[r - 4, c - 2]], epsilon = 1e-12);
        }
    }
    // Trajectories entering from outside the grid are undefined.
    assert!(out[0][[0, 5]].is_nan());
    assert!(out[1][[3, 5]].is_nan());
}

#[test]
fn half_pixel_shift_interpolates() {
    let f = Array2::from_shape_fn((8, 8), |(_, c)| c as f64);
    let flow = DenseFlowField::uniform((8, 8), 0.5, 0.0);
    let out = SemiLagrangian::default().advect_to(&f, &flow, 1).unwrap();
    assert_abs_diff_eq!(out[[3, 4]], 3.5, epsilon = 1e-12);
}

#[test]
fn advection_never_exceeds_source_range() {
    let f = texture(32);
    let flow = DenseFlowField::uniform((32, 32), 0.37, -1.21);
    let out = SemiLagrangian::default().advect_to(&f, &flow, 2).unwrap();
    let lo = f.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = f.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    for v in out.iter().filter(|v| v.is_finite()) {
        assert!(*v >= lo - 1e-12 && *v <= hi + 1e-12);
    }
}
