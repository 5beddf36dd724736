//! Eulerian and Lagrangian correlation of the field history.

use ndarray::Array2;
use nimbus_advect::{AdvectError, Advector};
use nimbus_field::FieldStack;
use nimbus_motion::DenseFlowField;
use nimbus_stats::pearson_correlation;
use serde::Serialize;

/// Pearson correlation over pixels finite in both fields.
///
/// `None` for mismatched shapes, fewer than 3 shared pixels or a constant field.
pub fn field_correlation(a: &Array2<f64>, b: &Array2<f64>) -> Option<f64> {
    if a.dim() != b.dim() {
        return None;
    }
    let x: Vec<f64> = a.iter().copied().collect();
    let y: Vec<f64> = b.iter().copied().collect();
    pearson_correlation(&x, &y)
}

/// Eulerian correlation of the newest field with the field `k` steps back,
/// for `k = 1..=max_lag`.
pub fn eulerian(stack: &FieldStack, max_lag: usize) -> Vec<Option<f64>> {
    let Some(current) = stack.latest() else {
        return vec![None; max_lag];
    };
    (1..=max_lag)
        .map(|k| stack.get(k).and_then(|past| field_correlation(current, past)))
        .collect()
}

/// Lagrangian correlation for `k = 1..=max_lag`: the field `k` steps back
/// is advected `k` intervals along `flow` and compared to the newest field.
///
/// # Errors
///
/// Propagates [`AdvectError`] from the advector.
pub fn lagrangian(
    stack: &FieldStack,
    flow: &DenseFlowField,
    advector: &dyn Advector,
    max_lag: usize,
) -> Result<Vec<Option<f64>>, AdvectError> {
    let Some(current) = stack.latest() else {
        return Ok(vec![None; max_lag]);
    };
    (1..=max_lag)
        .map(|k| match stack.get(k) {
            Some(past) => {
                let predicted = advector.advect_to(past, flow, k)?;
                Ok(field_correlation(&predicted, current))
            }
            None => Ok(None),
        })
        .collect()
}

/// Correlations per lag; index 0 holds lag 1.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CorrelationSummary {
    eulerian: Vec<Option<f64>>,
    lagrangian: Vec<Option<f64>>,
}

impl CorrelationSummary {
    /// Pair Eulerian and Lagrangian correlations of equal length.
    pub fn new(eulerian: Vec<Option<f64>>, lagrangian: Vec<Option<f64>>) -> Self {
        Self {
            eulerian,
            lagrangian,
        }
    }

    /// All lags undefined.
    pub fn undefined(max_lag: usize) -> Self {
        Self::new(vec![None; max_lag], vec![None; max_lag])
    }

    /// Eulerian correlations by lag.
    pub fn eulerian(&self) -> &[Option<f64>] {
        &self.eulerian
    }

    /// Lagrangian correlations by lag.
    pub fn lagrangian(&self) -> &[Option<f64>] {
        &self.lagrangian
    }

    /// Eulerian correlation at `lag` (1-based).
    pub fn eulerian_at(&self, lag: usize) -> Option<f64> {
        lag.checked_sub(1)
            .and_then(|i| self.eulerian.get(i).copied().flatten())
    }

    /// Lagrangian correlation at `lag` (1-based).
    pub fn lagrangian_at(&self, lag: usize) -> Option<f64> {
        lag.checked_sub(1)
            .and_then(|i| self.lagrangian.get(i).copied().flatten())
    }

    /// Lagrangian minus Eulerian at `lag`; defined only when both are.
    pub fn difference_at(&self, lag: usize) -> Option<f64> {
        Some(self.lagrangian_at(lag)? - self.eulerian_at(lag)?)
    }

    /// Number of lags held.
    pub fn max_lag(&self) -> usize {
        self.eulerian.len()
    }
}
