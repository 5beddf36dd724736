//! Robust speed-outlier rejection.

use nimbus_stats::quartiles;

use crate::sample::MotionSample;

/// Result of [`filter_by_speed`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedFilterOutcome {
    /// Samples that passed.
    pub kept: Vec<MotionSample>,
    /// Upper speed bound applied.
    pub upper: Option<f64>,
    /// Lower speed bound, computed always, applied only when enabled.
    pub lower: Option<f64>,
    /// Median speed of the input.
    pub median: Option<f64>,
}

/// Drop samples faster than `min(max_speed, median + iqr_multiplier * IQR)`.
///
/// The lower bound `max(0, median - 2 * IQR)` is always reported and only
/// enforced when `apply_lower` is set. Bounds are inclusive.
pub fn filter_by_speed(
    samples: &[MotionSample],
    max_speed: f64,
    iqr_multiplier: f64,
    apply_lower: bool,
) -> SpeedFilterOutcome {
    let speeds: Vec<f64> = samples.iter().map(MotionSample::speed).collect();
    let Some((q1, q2, q3)) = quartiles(&speeds) else {
        return SpeedFilterOutcome {
            kept: Vec::new(),
            upper: None,
            lower: None,
            median: None,
        };
    };
    let iqr = q3 - q1;
    let upper = max_speed.min(q2 + iqr_multiplier * iqr);
    let lower = (q2 - 2.0 * iqr).max(0.0);

    let kept = samples
        .iter()
        .zip(&speeds)
        .filter(|(_, s)| **s <= upper && (!apply_lower || **s >= lower))
        .map(|(m, _)| *m)
        .collect();

    SpeedFilterOutcome {
        kept,
        upper: Some(upper),
        lower: Some(lower),
        median: Some(q2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn with_speeds(speeds: &[f64]) -> Vec<MotionSample> {
        speeds
            .iter()
            .enumerate()
            .map(|(i, &s)| MotionSample::new(i as f64, 0.0, s, 0.0))
            .collect()
    }

    #[test]
    fn outlier_removed() {
        let samples = with_speeds(&[1.0, 1.1, 0.9, 1.0, 1.2, 0.8, 1.0, 7.5]);
        let out = filter_by_speed(&samples, 100.0 / 12.0, 3.0, false);
        assert_eq!(out.kept.len(), 7);
        assert!(out.kept.iter().all(|s| s.speed() < 2.0));
    }

    #[test]
    fn hard_ceiling_applies() {
        let samples = with_speeds(&[9.0, 9.0, 9.0, 9.0]);
        let out = filter_by_speed(&samples, 100.0 / 12.0, 3.0, false);
        assert!(out.kept.is_empty());
        assert_relative_eq!(out.upper.unwrap(), 100.0 / 12.0);
    }

    #[test]
    fn zero_motion_is_kept() {
        let samples = with_speeds(&[0.0; 6]);
        let out = filter_by_speed(&samples, 100.0 / 12.0, 3.0, false);
        assert_eq!(out.kept.len(), 6);
        assert_eq!(out.upper, Some(0.0));
    }

    #[test]
    fn lower_bound_reported_but_optional() {
        let samples = with_speeds(&[0.05, 2.0, 2.1, 2.0, 1.9, 2.0, 2.05, 1.95]);
        let relaxed = filter_by_speed(&samples, 10.0, 3.0, false);
        assert_eq!(relaxed.kept.len(), 8);
        assert!(relaxed.lower.unwrap() > 0.05);

        let strict = filter_by_speed(&samples, 10.0, 3.0, true);
        assert_eq!(strict.kept.len(), 7);
    }

    #[test]
    fn empty_input() {
        let out = filter_by_speed(&[], 10.0, 3.0, false);
        assert!(out.kept.is_empty());
        assert!(out.upper.is_none());
    }
}
