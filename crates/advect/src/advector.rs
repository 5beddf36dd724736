//! The advection interface.

use ndarray::Array2;
use nimbus_motion::DenseFlowField;

use crate::error::AdvectError;

/// Warps a past field along a dense flow to predict later fields.
///
/// `advect` returns one prediction per step `1..=steps`; prediction `k`
/// is `source` resampled at positions displaced by `-k` intervals of motion.
/// Implementations must return an unchanged field for a zero flow.
pub trait Advector: Send + Sync {
    /// Predict `steps` fields ahead of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`AdvectError`] for empty inputs or `steps == 0`.
    fn advect(
        &self,
        source: &Array2<f64>,
        flow: &DenseFlowField,
        steps: usize,
    ) -> Result<Vec<Array2<f64>>, AdvectError>;

    /// Prediction exactly `steps` intervals ahead.
    ///
    /// # Errors
    ///
    /// Same as [`Advector::advect`].
    fn advect_to(
        &self,
        source: &Array2<f64>,
        flow: &DenseFlowField,
        steps: usize,
    ) -> Result<Array2<f64>, AdvectError> {
        self.advect(source, flow, steps)?
            .pop()
            .ok_or(AdvectError::ZeroSteps)
    }
}
