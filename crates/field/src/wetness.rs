//! Wetted-area ratio and the wetness gate.

use ndarray::Array2;

use crate::error::FieldError;

/// Default minimum wetted-area ratio below which a field counts as dry.
pub const DEFAULT_MIN_WAR: f64 = 0.01;

/// Result of classifying one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wetness {
    war: f64,
    is_wet: bool,
}

impl Wetness {
    /// Fraction of valid pixels at or above the rain threshold.
    pub fn war(&self) -> f64 {
        self.war
    }

    /// Whether the field passed the gate.
    pub fn is_wet(&self) -> bool {
        self.is_wet
    }
}

/// Computes the wetted-area ratio and gates downstream processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WetnessClassifier {
    threshold: f64,
    min_war: f64,
}

impl WetnessClassifier {
    /// Create a classifier for rain threshold `threshold` (mm/h) using
    /// [`DEFAULT_MIN_WAR`].
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidThreshold`] for negative or non-finite thresholds.
    pub fn new(threshold: f64) -> Result<Self, FieldError> {
        Self::with_min_war(threshold, DEFAULT_MIN_WAR)
    }

    /// Create a classifier with an explicit minimum WAR.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidThreshold`] or [`FieldError::InvalidMinWar`].
    pub fn with_min_war(threshold: f64, min_war: f64) -> Result<Self, FieldError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(FieldError::InvalidThreshold { value: threshold });
        }
        if !(0.0..=1.0).contains(&min_war) {
            return Err(FieldError::InvalidMinWar { value: min_war });
        }
        Ok(Self { threshold, min_war })
    }

    /// Rain threshold in mm/h.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Minimum WAR for a wet field.
    pub fn min_war(&self) -> f64 {
        self.min_war
    }

    /// Fraction of non-missing pixels with value >= threshold.
    ///
    /// A field without any valid pixel has WAR 0.
    pub fn war(&self, field: &Array2<f64>) -> f64 {
        let (valid, wet) = field
            .iter()
            .filter(|v| v.is_finite())
            .fold((0usize, 0usize), |(n, w), &v| {
                (n + 1, w + usize::from(v >= self.threshold))
            });
        if valid == 0 {
            0.0
        } else {
            wet as f64 / valid as f64
        }
    }

    /// Classify a field as wet or dry.
    pub fn classify(&self, field: &Array2<f64>) -> Wetness {
        let war = self.war(field);
        Wetness {
            war,
            is_wet: war >= self.min_war,
        }
    }
}
