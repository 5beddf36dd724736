//! Collapse spatially close motion samples into cluster representatives.

use std::collections::HashMap;

use nimbus_stats::{median, sorted_finite};
use rayon::prelude::*;

use crate::sample::MotionSample;

fn median_of(values: impl Iterator<Item = f64>) -> f64 {
    let v: Vec<f64> = values.collect();
    let sorted = sorted_finite(&v);
    if sorted.is_empty() { f64::NAN } else { median(&sorted) }
}

/// For every sample, the indices of all samples within `radius` of it
/// (itself included), in ascending order.
///
/// Samples are bucketed into square cells of side `radius`, so only the
/// 3x3 block of cells around a sample needs to be searched.
fn neighbourhoods(samples: &[MotionSample], radius: f64) -> Vec<Vec<usize>> {
    let cell = |s: &MotionSample| {
        (
            (s.y / radius).floor() as i64,
            (s.x / radius).floor() as i64,
        )
    };
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, s) in samples.iter().enumerate() {
        grid.entry(cell(s)).or_default().push(i);
    }

    let r2 = radius * radius;
    samples
        .par_iter()
        .map(|s| {
            let (cy, cx) = cell(s);
            let mut near = Vec::new();
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let Some(bucket) = grid.get(&(cy + dy, cx + dx)) else {
                        continue;
                    };
                    near.extend(bucket.iter().copied().filter(|&j| {
                        let o = &samples[j];
                        (o.x - s.x).powi(2) + (o.y - s.y).powi(2) <= r2
                    }));
                }
            }
            near.sort_unstable();
            near
        })
        .collect()
}

/// Merge samples lying within `radius` of a cluster seed, keep clusters of
/// at least `min_n` members, and represent each by the median position and
/// velocity of its members.
///
/// Seeds are visited from the most to the least crowded sample (ties by
/// input order). A seed claims every still unclaimed sample within
/// `radius`; if fewer than `min_n` are left the seed is skipped and its
/// neighbours stay available to later seeds. Every kept cluster fits in a
/// disc of radius `radius` around its seed.
///
/// Samples with a non-finite position are ignored. The output order
/// follows the seed order, so it is deterministic.
pub fn decluster(samples: &[MotionSample], radius: f64, min_n: usize) -> Vec<MotionSample> {
    if radius <= 0.0 || !radius.is_finite() {
        return Vec::new();
    }
    let samples: Vec<MotionSample> = samples
        .iter()
        .filter(|s| s.x.is_finite() && s.y.is_finite())
        .copied()
        .collect();
    let near = neighbourhoods(&samples, radius);

    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| near[b].len().cmp(&near[a].len()));

    let min_n = min_n.max(1);
    let mut claimed = vec![false; samples.len()];
    let mut out = Vec::new();
    for seed in order {
        if claimed[seed] {
            continue;
        }
        let members: Vec<usize> = near[seed].iter().copied().filter(|&j| !claimed[j]).collect();
        if members.len() < min_n {
            continue;
        }
        for &j in &members {
            claimed[j] = true;
        }
        out.push(MotionSample::new(
            median_of(members.iter().map(|&j| samples[j].x)),
            median_of(members.iter().map(|&j| samples[j].y)),
            median_of(members.iter().map(|&j| samples[j].u)),
            median_of(members.iter().map(|&j| samples[j].v)),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tight_cluster_kept_outlier_dropped() {
        let mut samples: Vec<MotionSample> = (0..10)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / 10.0;
                MotionSample::new(100.0 + 2.0 * a.cos(), 100.0 + 2.0 * a.sin(), 2.0, -1.0)
            })
            .collect();
        samples.push(MotionSample::new(400.0, 300.0, 8.0, 8.0));

        let out = decluster(&samples, 20.0, 3);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].x, 100.0, epsilon = 2.0);
        assert_relative_eq!(out[0].y, 100.0, epsilon = 2.0);
        assert_relative_eq!(out[0].u, 2.0);
        assert_relative_eq!(out[0].v, -1.0);
    }

    #[test]
    fn min_n_one_keeps_singletons() {
        let samples = vec![
            MotionSample::new(0.0, 0.0, 1.0, 1.0),
            MotionSample::new(200.0, 200.0, 2.0, 2.0),
        ];
        assert_eq!(decluster(&samples, 20.0, 1).len(), 2);
    }

    #[test]
    fn median_velocity_resists_noise() {
        let samples = vec![
            MotionSample::new(50.0, 50.0, 1.0, 0.0),
            MotionSample::new(52.0, 49.0, 1.0, 0.0),
            MotionSample::new(48.0, 51.0, 30.0, 0.0),
        ];
        let out = decluster(&samples, 20.0, 3);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].u, 1.0);
    }

    fn ring(cx: f64, cy: f64, r: f64, n: usize) -> Vec<MotionSample> {
        (0..n)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / n as f64;
                MotionSample::new(cx + r * a.cos(), cy + r * a.sin(), 1.5, 0.5)
            })
            .collect()
    }

    #[test]
    fn cluster_straddling_cell_edges_stays_whole() {
        // 110 = 5.5 * 20 sits on the edge between buckets.
        let out = decluster(&ring(110.0, 110.0, 2.0, 5), 20.0, 3);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].x, 110.0, epsilon = 2.0);
        assert_relative_eq!(out[0].y, 110.0, epsilon = 2.0);
        assert_relative_eq!(out[0].u, 1.5);
    }

    #[test]
    fn ten_close_points_and_outlier_give_one_representative() {
        let mut samples = ring(110.0, 110.0, 5.0, 10);
        samples.push(MotionSample::new(110.0, 300.0, 9.0, 9.0));
        let out = decluster(&samples, 20.0, 3);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].y, 110.0, epsilon = 5.0);
        assert_relative_eq!(out[0].v, 0.5);
    }

    #[test]
    fn separate_clusters_each_kept() {
        let mut samples = ring(40.0, 40.0, 3.0, 4);
        samples.extend(ring(160.0, 60.0, 3.0, 6));
        let out = decluster(&samples, 20.0, 3);
        assert_eq!(out.len(), 2);
        // Most crowded cluster comes first.
        assert_relative_eq!(out[0].x, 160.0, epsilon = 3.0);
        assert_relative_eq!(out[1].x, 40.0, epsilon = 3.0);
    }

    #[test]
    fn scattered_points_all_dropped() {
        let samples: Vec<MotionSample> = (0..6)
            .map(|i| MotionSample::new(50.0 * i as f64, 0.0, 1.0, 0.0))
            .collect();
        assert!(decluster(&samples, 20.0, 3).is_empty());
    }

    #[test]
    fn non_finite_positions_ignored() {
        let mut samples = ring(30.0, 30.0, 1.0, 3);
        samples.push(MotionSample::new(f64::NAN, 30.0, 50.0, 50.0));
        let out = decluster(&samples, 20.0, 3);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].u, 1.5);
    }
}
