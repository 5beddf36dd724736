//! Reflectivity/rain-rate conversion (Z = A R^b) and rainfall conditioning.

use ndarray::Array2;

use crate::error::FieldError;

/// Marshall-Palmer type Z-R relationship `Z = a * R^b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZrRelation {
    a: f64,
    b: f64,
}

impl Default for ZrRelation {
    fn default() -> Self {
        Self { a: 316.0, b: 1.5 }
    }
}

impl ZrRelation {
    /// Create a relationship with explicit coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidZr`] unless both coefficients are finite and positive.
    pub fn new(a: f64, b: f64) -> Result<Self, FieldError> {
        if !(a.is_finite() && b.is_finite() && a > 0.0 && b > 0.0) {
            return Err(FieldError::InvalidZr { a, b });
        }
        Ok(Self { a, b })
    }

    /// Multiplicative coefficient.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Exponent.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Rain rate (mm/h) to reflectivity (dBZ). Zero rain maps to `-inf`.
    pub fn to_dbz(&self, rain: f64) -> f64 {
        10.0 * (self.a * rain.powf(self.b)).log10()
    }

    /// Reflectivity (dBZ) to rain rate (mm/h).
    pub fn to_rainrate(&self, dbz: f64) -> f64 {
        (10f64.powf(dbz / 10.0) / self.a).powf(1.0 / self.b)
    }

    /// Convert a rain-rate field to dBZ.
    ///
    /// Pixels without a finite reflectivity, i.e. missing (NaN) or zero
    /// rain, are replaced by `fill`. Positive rain keeps its own dBZ even
    /// when that is below `fill`.
    pub fn field_to_dbz(&self, rain: &Array2<f64>, fill: f64) -> Array2<f64> {
        rain.mapv(|r| {
            let dbz = self.to_dbz(r);
            if dbz.is_finite() { dbz } else { fill }
        })
    }
}

/// How missing or dry pixels are filled before spectral analysis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FillPolicy {
    /// Reflectivity equivalent of the rain threshold.
    #[default]
    ThresholdReflectivity,
    /// Zero.
    Zero,
    /// A fixed value in the analysed unit.
    Value(f64),
}

impl FillPolicy {
    /// Resolve the fill value for a given threshold and Z-R relation.
    pub fn resolve(&self, threshold: f64, zr: &ZrRelation) -> f64 {
        match self {
            FillPolicy::ThresholdReflectivity => zr.to_dbz(threshold),
            FillPolicy::Zero => 0.0,
            FillPolicy::Value(v) => *v,
        }
    }
}

/// Condition a raw rain-rate field for analysis.
///
/// Non-finite values, `no_data` and negative values become NaN. Rain
/// strictly between zero and `threshold` is set to zero.
pub fn condition_rainfall(raw: &Array2<f64>, threshold: f64, no_data: f64) -> Array2<f64> {
    raw.mapv(|r| {
        if !r.is_finite() || r == no_data || r < 0.0 {
            f64::NAN
        } else if r > 0.0 && r < threshold {
            0.0
        } else {
            r
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn dbz_roundtrip() {
        let zr = ZrRelation::default();
        for r in [0.08, 1.0, 12.5, 100.0] {
            assert_relative_eq!(zr.to_rainrate(zr.to_dbz(r)), r, max_relative = 1e-12);
        }
    }

    #[test]
    fn dbz_of_one_mm_is_log_a() {
        let zr = ZrRelation::default();
        assert_relative_eq!(zr.to_dbz(1.0), 10.0 * 316f64.log10(), epsilon = 1e-12);
    }

    #[test]
    fn invalid_coefficients() {
        assert!(ZrRelation::new(0.0, 1.5).is_err());
        assert!(ZrRelation::new(200.0, f64::NAN).is_err());
        assert!(ZrRelation::new(200.0, 1.6).is_ok());
    }

    #[test]
    fn field_to_dbz_fills_dry_and_missing() {
        let zr = ZrRelation::default();
        let fill = zr.to_dbz(0.08);
        let rain = array![[0.0, f64::NAN], [1.0, 0.08]];
        let dbz = zr.field_to_dbz(&rain, fill);
        assert_relative_eq!(dbz[[0, 0]], fill);
        assert_relative_eq!(dbz[[0, 1]], fill);
        assert_relative_eq!(dbz[[1, 0]], zr.to_dbz(1.0));
        assert_relative_eq!(dbz[[1, 1]], fill, epsilon = 1e-12);
    }

    #[test]
    fn field_to_dbz_keeps_wet_values_below_fill() {
        let zr = ZrRelation::default();
        // A fill above the reflectivity of 1 mm/h must not overwrite it.
        let fill = 30.0;
        let rain = array![[1.0, 0.0]];
        let dbz = zr.field_to_dbz(&rain, fill);
        assert_relative_eq!(dbz[[0, 0]], zr.to_dbz(1.0), epsilon = 1e-12);
        assert!(dbz[[0, 0]] < fill);
        assert_relative_eq!(dbz[[0, 1]], fill);
    }

    #[test]
    fn fill_policy_resolution() {
        let zr = ZrRelation::default();
        assert_relative_eq!(
            FillPolicy::ThresholdReflectivity.resolve(0.08, &zr),
            zr.to_dbz(0.08)
        );
        assert_eq!(FillPolicy::Zero.resolve(0.08, &zr), 0.0);
        assert_eq!(FillPolicy::Value(-5.0).resolve(0.08, &zr), -5.0);
    }

    #[test]
    fn conditioning() {
        let raw = array![[-999.0, -1.0], [0.05, 2.0]];
        let out = condition_rainfall(&raw, 0.08, -999.0);
        assert!(out[[0, 0]].is_nan());
        assert!(out[[0, 1]].is_nan());
        assert_eq!(out[[1, 0]], 0.0);
        assert_eq!(out[[1, 1]], 2.0);
    }
}
