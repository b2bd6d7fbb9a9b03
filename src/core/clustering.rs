//! K-means clustering of multi-analyte readings.
//!
//! Initial centroids are drawn with a caller-supplied seed, so a given input
//! and seed always produce the same clustering.

use crate::error::{check_window, AnalyticsError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Iteration cap used when the caller does not pick one.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clustering {
    pub centroids: Vec<Vec<f64>>,
    /// Cluster of each input row
    pub assignments: Vec<usize>,
    pub cluster_sizes: Vec<usize>,
    /// Row indices belonging to each cluster
    pub clusters: Vec<Vec<usize>>,
    pub iterations: usize,
}

/// Options for [`cluster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOptions {
    pub k: usize,
    pub seed: u64,
    pub max_iterations: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            k: 3,
            seed: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Partition rows into `k` clusters.
///
/// `None` with fewer than `2k` rows. Ties in distance go to the lower
/// centroid index. A cluster left empty keeps its previous centroid.
/// Iteration stops early once the centroids no longer move.
pub fn cluster(rows: &[Vec<f64>], options: &ClusterOptions) -> Result<Option<Clustering>> {
    check_window("cluster count", options.k)?;
    check_window("iteration limit", options.max_iterations)?;

    let k = options.k;
    if rows.len() / 2 < k {
        return Ok(None);
    }

    let dims = rows[0].len();
    if let Some(bad) = rows.iter().find(|r| r.len() != dims) {
        return Err(AnalyticsError::DimensionMismatch {
            expected: dims,
            found: bad.len(),
        });
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut centroids: Vec<Vec<f64>> = (0..k)
        .map(|_| rows[rng.gen_range(0..rows.len())].clone())
        .collect();

    let mut assignments = vec![0; rows.len()];
    let mut iterations = 0;
    while iterations < options.max_iterations {
        iterations += 1;

        for (row, slot) in rows.iter().zip(assignments.iter_mut()) {
            *slot = nearest(row, &centroids);
        }

        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (row, &c) in rows.iter().zip(&assignments) {
            for (acc, v) in sums[c].iter_mut().zip(row) {
                *acc += v;
            }
            counts[c] += 1;
        }

        let updated: Vec<Vec<f64>> = sums
            .into_iter()
            .zip(&counts)
            .zip(&centroids)
            .map(|((sum, &count), previous)| {
                if count == 0 {
                    previous.clone()
                } else {
                    sum.into_iter().map(|s| s / count as f64).collect()
                }
            })
            .collect();

        let converged = updated == centroids;
        centroids = updated;
        if converged {
            break;
        }
    }

    let mut clusters = vec![Vec::new(); k];
    for (i, &c) in assignments.iter().enumerate() {
        clusters[c].push(i);
    }

    Ok(Some(Clustering {
        centroids,
        assignments,
        cluster_sizes: clusters.iter().map(Vec::len).collect(),
        clusters,
        iterations,
    }))
}

fn nearest(row: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = euclidean_distance(row, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
