//! Synthetic minority oversampling.

use log::debug;
use ndarray::{s, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::utils::squared_distance;

/// SMOTE rebalancer.
///
/// Every class with fewer samples than the majority class is topped up with
/// synthetic points interpolated between a random member and one of its
/// `k_neighbors` nearest same-class neighbours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Smote {
    k_neighbors: usize,
    random_state: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, random_state: u64) -> Self {
        Self {
            k_neighbors,
            random_state,
        }
    }

    /// Returns the original samples followed by the synthetic ones.
    pub fn fit_resample(&self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> (Array2<f64>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in y.iter().enumerate() {
            if label < n_classes {
                members[label].push(i);
            }
        }
        let majority = members.iter().map(Vec::len).max().unwrap_or(0);

        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut labels: Vec<usize> = Vec::new();

        for (class, idx) in members.iter().enumerate() {
            if idx.is_empty() || idx.len() == majority {
                continue;
            }
            let needed = majority - idx.len();
            let k = self.k_neighbors.min(idx.len() - 1);
            let neighbors = if k > 0 { nearest_neighbors(x, idx, k) } else { Vec::new() };

            for _ in 0..needed {
                let pick = rng.random_range(0..idx.len());
                let base = x.row(idx[pick]);
                let row = if k == 0 {
                    base.to_vec()
                } else {
                    let other = x.row(neighbors[pick][rng.random_range(0..k)]);
                    let gap: f64 = rng.random();
                    base.iter().zip(other.iter()).map(|(a, b)| a + gap * (b - a)).collect()
                };
                rows.push(row);
                labels.push(class);
            }
            debug!("SMOTE: class {} oversampled by {} to {}", class, needed, majority);
        }

        if rows.is_empty() {
            return (x.clone(), y.to_vec());
        }

        let n_features = x.ncols();
        let mut out = Array2::zeros((x.nrows() + rows.len(), n_features));
        out.slice_mut(s![..x.nrows(), ..]).assign(x);
        for (offset, row) in rows.iter().enumerate() {
            out.row_mut(x.nrows() + offset).assign(&ArrayView1::from(row.as_slice()));
        }
        let mut out_y = y.to_vec();
        out_y.extend(labels);
        (out, out_y)
    }
}

/// For each member, the indices of its `k` nearest other members.
fn nearest_neighbors(x: &Array2<f64>, members: &[usize], k: usize) -> Vec<Vec<usize>> {
    members
        .iter()
        .map(|&i| {
            let mut dists: Vec<(f64, usize)> = members
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| (squared_distance(x.row(i), x.row(j)), j))
                .collect();
            dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            dists.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect()
}

/// Per-class sample counts.
pub(crate) fn class_counts(y: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &label in y {
        if label < n_classes {
            counts[label] += 1;
        }
    }
    counts
}
