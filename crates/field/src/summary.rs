//! Unconditional and conditional field statistics.

use ndarray::{Array2, Zip};
use nimbus_stats::{nan_mean, nan_std};
use serde::Serialize;

/// Mean and population standard deviation of a field, over all valid pixels
/// and over rainy pixels only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FieldSummary {
    /// Mean over valid pixels.
    pub mean: Option<f64>,
    /// Standard deviation over valid pixels.
    pub std: Option<f64>,
    /// Mean over pixels at or above the rain threshold.
    pub cond_mean: Option<f64>,
    /// Standard deviation over pixels at or above the rain threshold.
    pub cond_std: Option<f64>,
}

/// Summarise `values`, conditioning on `mask[i]` (same layout as `values`).
fn summarize_masked(values: &Array2<f64>, mask: &Array2<bool>) -> FieldSummary {
    let all: Vec<f64> = values.iter().copied().collect();
    let cond: Vec<f64> = values
        .iter()
        .zip(mask.iter())
        .filter(|(_, m)| **m)
        .map(|(v, _)| *v)
        .collect();
    FieldSummary {
        mean: nan_mean(&all),
        std: nan_std(&all),
        cond_mean: nan_mean(&cond),
        cond_std: nan_std(&cond),
    }
}

/// Statistics of a rain-rate field, conditioning on rain >= `threshold`.
pub fn summarize(field: &Array2<f64>, threshold: f64) -> FieldSummary {
    let mask = field.mapv(|v| v.is_finite() && v >= threshold);
    summarize_masked(field, &mask)
}

/// Statistics of a dBZ field, conditioning on the companion rain field.
///
/// Pixels missing in `rain` are left out even if `dbz` holds a fill value
/// there. `dbz` and `rain` must have the same shape.
pub fn summarize_with_mask(dbz: &Array2<f64>, rain: &Array2<f64>, threshold: f64) -> FieldSummary {
    let valid = Zip::from(dbz)
        .and(rain)
        .map_collect(|&d, &r| if r.is_finite() { d } else { f64::NAN });
    let mask = rain.mapv(|v| v.is_finite() && v >= threshold);
    summarize_masked(&valid, &mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn conditional_and_unconditional() {
        let f = array![[0.0, 2.0], [4.0, f64::NAN]];
        let s = summarize(&f, 0.08);
        assert_relative_eq!(s.mean.unwrap(), 2.0);
        assert_relative_eq!(s.cond_mean.unwrap(), 3.0);
        assert_relative_eq!(s.cond_std.unwrap(), 1.0);
        // population std of [0, 2, 4]
        assert_relative_eq!(s.std.unwrap(), (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn dry_field_has_no_conditional_stats() {
        let f = array![[0.0, 0.0], [0.0, 0.0]];
        let s = summarize(&f, 0.08);
        assert_eq!(s.mean, Some(0.0));
        assert!(s.cond_mean.is_none());
        assert!(s.cond_std.is_none());
    }

    #[test]
    fn mask_from_rain_field() {
        let rain = array![[0.0, 1.0], [1.0, 0.0]];
        let dbz = array![[10.0, 20.0], [30.0, 10.0]];
        let s = summarize_with_mask(&dbz, &rain, 0.08);
        assert_relative_eq!(s.cond_mean.unwrap(), 25.0);
        assert_relative_eq!(s.mean.unwrap(), 17.5);
    }

    #[test]
    fn missing_rain_pixels_excluded_from_dbz() {
        // Filled reflectivity under missing rain must not count.
        let rain = array![[f64::NAN, 2.0], [f64::NAN, 4.0]];
        let dbz = array![[5.15, 30.0], [5.15, 40.0]];
        let s = summarize_with_mask(&dbz, &rain, 0.08);
        assert_relative_eq!(s.mean.unwrap(), 35.0);
        assert_relative_eq!(s.cond_mean.unwrap(), 35.0);
        assert_relative_eq!(s.std.unwrap(), s.cond_std.unwrap());
    }
}
