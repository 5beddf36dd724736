//! Statistical helper functions shared by the nimbus analysis crates.
//!
//! Everything here works on plain `&[f64]` slices. Functions prefixed with
//! `nan_` ignore non-finite entries, matching how radar fields mark
//! missing pixels.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Sample standard deviation with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Mean of the finite values in `data`.
///
/// Returns `None` when no finite value is present.
pub fn nan_mean(data: &[f64]) -> Option<f64> {
    let (sum, n) = data
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Population standard deviation (N denominator) of the finite values in `data`.
///
/// Returns `None` when no finite value is present.
pub fn nan_std(data: &[f64]) -> Option<f64> {
    let m = nan_mean(data)?;
    let (ss, n) = data
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + (v - m) * (v - m), n + 1));
    Some((ss / n as f64).sqrt())
}

/// Type-7 quantile (linear interpolation between order statistics).
///
/// **Expects pre-sorted input** (caller's responsibility).
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "quantile_type7: input must not be empty"
    );
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Median of pre-sorted data. For even length, averages the middle two values.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "median: input must not be empty");
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Sorted copy of the finite values in `data`.
pub fn sorted_finite(data: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Percentile (0..=100) of the finite values in unsorted `data`.
///
/// Returns `None` if `data` has no finite value.
pub fn percentile(data: &[f64], pct: f64) -> Option<f64> {
    let sorted = sorted_finite(data);
    if sorted.is_empty() {
        return None;
    }
    Some(quantile_type7(&sorted, pct / 100.0))
}

/// First quartile, median and third quartile of the finite values in `data`.
///
/// Returns `None` if `data` has no finite value.
pub fn quartiles(data: &[f64]) -> Option<(f64, f64, f64)> {
    let sorted = sorted_finite(data);
    if sorted.is_empty() {
        return None;
    }
    Some((
        quantile_type7(&sorted, 0.25),
        quantile_type7(&sorted, 0.50),
        quantile_type7(&sorted, 0.75),
    ))
}

/// Pearson correlation coefficient.
///
/// Filters to indices where both `x[i]` and `y[i]` are finite.
/// Returns `None` if fewer than 3 finite pairs or if the denominator is zero
/// (constant input). The result is clamped to `[-1, 1]`.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
        .map(|(xi, yi)| (*xi, *yi))
        .collect();

    if pairs.len() < 3 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx: f64 = pairs.iter().map(|(xi, _)| xi).sum::<f64>() / n;
    let my: f64 = pairs.iter().map(|(_, yi)| yi).sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    for &(xi, yi) in &pairs {
        let dx = xi - mx;
        let dy = yi - my;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }

    let denom = (sum_xx * sum_yy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    Some((sum_xy / denom).clamp(-1.0, 1.0))
}

/// A straight line `y = intercept + slope * x` fitted by (weighted) least squares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Slope of the fitted line.
    pub slope: f64,
    /// Intercept of the fitted line.
    pub intercept: f64,
    /// (Weighted) Pearson correlation between `x` and `y`; carries the sign of the slope.
    pub r: f64,
    /// Number of points used in the fit.
    pub n: usize,
}

/// Ordinary least-squares line fit.
///
/// See [`weighted_line_fit`] for the conditions under which `None` is returned.
pub fn line_fit(x: &[f64], y: &[f64]) -> Option<LineFit> {
    let weights = vec![1.0; x.len()];
    weighted_line_fit(x, y, &weights)
}

/// Weighted least-squares line fit.
///
/// Only triples where `x`, `y` and `w` are all finite and `w > 0` are used.
/// Returns `None` if the slices differ in length, fewer than 2 points
/// remain, or `x` is constant. A constant `y` yields a zero slope with
/// `r = 0`.
pub fn weighted_line_fit(x: &[f64], y: &[f64], w: &[f64]) -> Option<LineFit> {
    if x.len() != y.len() || x.len() != w.len() {
        return None;
    }

    let pts: Vec<(f64, f64, f64)> = x
        .iter()
        .zip(y)
        .zip(w)
        .filter(|((xi, yi), wi)| xi.is_finite() && yi.is_finite() && wi.is_finite() && **wi > 0.0)
        .map(|((&xi, &yi), &wi)| (xi, yi, wi))
        .collect();

    if pts.len() < 2 {
        return None;
    }

    let sw: f64 = pts.iter().map(|p| p.2).sum();
    let mx = pts.iter().map(|p| p.2 * p.0).sum::<f64>() / sw;
    let my = pts.iter().map(|p| p.2 * p.1).sum::<f64>() / sw;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for &(xi, yi, wi) in &pts {
        let dx = xi - mx;
        let dy = yi - my;
        sxx += wi * dx * dx;
        syy += wi * dy * dy;
        sxy += wi * dx * dy;
    }

    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let r = if syy > 0.0 {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    Some(LineFit {
        slope,
        intercept,
        r,
        n: pts.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sd(&data), 2.138090, epsilon = 1e-6);
    }

    #[test]
    fn test_variance_two() {
        // [3.0, 7.0]: mean=5, sum_sq=8, var=8/1=8
        assert_relative_eq!(variance(&[3.0, 7.0]), 8.0, epsilon = 1e-10);
    }

    #[test]
    fn test_nan_mean_skips_missing() {
        let data = [1.0, f64::NAN, 3.0, f64::INFINITY];
        assert_relative_eq!(nan_mean(&data).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_mean_all_missing() {
        assert!(nan_mean(&[f64::NAN, f64::NAN]).is_none());
        assert!(nan_std(&[]).is_none());
    }

    #[test]
    fn test_nan_std_population() {
        // Population std of [2,4,4,4,5,5,7,9] is exactly 2.
        let data = [2.0, 4.0, f64::NAN, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(nan_std(&data).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quantile_type7_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        // p=0.1 → h=0.4, lo=0, hi=1 → 1 + 0.4*(2-1) = 1.4
        assert_relative_eq!(quantile_type7(&sorted, 0.1), 1.4, epsilon = 1e-10);
    }

    #[test]
    fn test_quantile_type7_crossvalidation() {
        // numpy.percentile(range(1, 11), 30) = 3.7
        let sorted: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        assert_relative_eq!(quantile_type7(&sorted, 0.3), 3.7, epsilon = 1e-10);
    }

    #[test]
    #[should_panic(expected = "quantile_type7: input must not be empty")]
    fn test_quantile_type7_empty_panics() {
        quantile_type7(&[], 0.5);
    }

    #[test]
    fn test_median_even() {
        assert_relative_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_percentile_unsorted() {
        let data = [5.0, 1.0, f64::NAN, 3.0, 2.0, 4.0];
        assert_relative_eq!(percentile(&data, 50.0).unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(percentile(&data, 100.0).unwrap(), 5.0, epsilon = 1e-12);
        assert!(percentile(&[f64::NAN], 50.0).is_none());
    }

    #[test]
    fn test_quartiles() {
        let data: Vec<f64> = (1..=10).rev().map(|x| x as f64).collect();
        let (q1, q2, q3) = quartiles(&data).unwrap();
        assert_relative_eq!(q1, 3.25, epsilon = 1e-12);
        assert_relative_eq!(q2, 5.5, epsilon = 1e-12);
        assert_relative_eq!(q3, 7.75, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_correlation_perfect() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let r = pearson_correlation(&x, &y);
        assert_relative_eq!(r.unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pearson_correlation_constant_is_none() {
        let x = [1.0, 1.0, 1.0, 1.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!(pearson_correlation(&x, &y).is_none());
    }

    #[test]
    fn test_pearson_correlation_with_nan() {
        let x = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, f64::NAN, 8.0, 10.0];
        // Finite pairs: (1,2), (4,8), (5,10): 3 pairs, perfect linear
        let r = pearson_correlation(&x, &y);
        assert_relative_eq!(r.unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_line_fit_exact() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, -1.0, -3.0, -5.0];
        let fit = line_fit(&x, &y).unwrap();
        assert_relative_eq!(fit.slope, -2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r, -1.0, epsilon = 1e-12);
        assert_eq!(fit.n, 4);
    }

    #[test]
    fn test_line_fit_too_few_points() {
        assert!(line_fit(&[1.0], &[2.0]).is_none());
        assert!(line_fit(&[1.0, f64::NAN], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn test_line_fit_constant_x() {
        assert!(line_fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_weighted_line_fit_emphasises_heavy_points() {
        // Three collinear points plus one outlier with negligible weight.
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 30.0];
        let w = [1.0, 1.0, 1.0, 1e-9];
        let fit = weighted_line_fit(&x, &y, &w).unwrap();
        assert_relative_eq!(fit.slope, 1.0, epsilon = 1e-6);

        let ols = line_fit(&x, &y).unwrap();
        assert!(ols.slope > 5.0);
    }

    #[test]
    fn test_weighted_line_fit_length_mismatch() {
        assert!(weighted_line_fit(&[1.0, 2.0], &[1.0, 2.0], &[1.0]).is_none());
    }
}
