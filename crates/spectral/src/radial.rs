//! Radially averaged 1D power spectrum.

use ndarray::Array2;

/// Power averaged over rings of integer radius around the zero frequency.
///
/// Bins are ordered by increasing frequency. Bin 0 is the zero frequency
/// and has an infinite wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialProfile {
    frequencies: Vec<f64>,
    wavelengths: Vec<f64>,
    power: Vec<f64>,
    counts: Vec<usize>,
}

impl RadialProfile {
    /// Spatial frequency of each bin (cycles per km).
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Wavelength of each bin (km).
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Mean power in each bin.
    pub fn power(&self) -> &[f64] {
        &self.power
    }

    /// Number of 2D spectrum pixels averaged into each bin.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// True if the profile has no bins.
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}

/// Radially average a centred (shifted) square power spectrum.
///
/// Pixels are binned by their rounded distance to `(S/2, S/2)`; only bins
/// with radius below `S/2` are kept. `resolution_km` is the pixel size.
pub fn radial_average(psd_shifted: &Array2<f64>, resolution_km: f64) -> RadialProfile {
    let (rows, cols) = psd_shifted.dim();
    let size = rows.min(cols);
    let n_bins = size / 2;
    let (cr, cc) = (rows / 2, cols / 2);

    let mut sums = vec![0.0; n_bins];
    let mut counts = vec![0usize; n_bins];
    for ((r, c), &p) in psd_shifted.indexed_iter() {
        let dr = r as f64 - cr as f64;
        let dc = c as f64 - cc as f64;
        let bin = (dr * dr + dc * dc).sqrt().round() as usize;
        if bin < n_bins {
            sums[bin] += p;
            counts[bin] += 1;
        }
    }

    let domain_km = size as f64 * resolution_km;
    let frequencies: Vec<f64> = (0..n_bins).map(|k| k as f64 / domain_km).collect();
    let wavelengths = frequencies
        .iter()
        .map(|&f| if f > 0.0 { 1.0 / f } else { f64::INFINITY })
        .collect();
    let power = sums
        .iter()
        .zip(&counts)
        .map(|(s, &n)| if n > 0 { s / n as f64 } else { f64::NAN })
        .collect();

    RadialProfile {
        frequencies,
        wavelengths,
        power,
        counts,
    }
}
