//! Random forest of gini decision trees.

use log::debug;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::smote::class_counts;
use super::utils::argmax;

/// Hyper-parameters shared by every tree of a forest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub random_state: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    root: TreeNode,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    max_features: usize,
    params: &'a ForestParams,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    fn build(&self, samples: &[usize], depth: usize, rng: &mut StdRng) -> TreeNode {
        let distribution = self.class_weights(samples);
        let total: f64 = distribution.iter().sum();
        let pure = distribution.iter().filter(|&&w| w > 0.0).count() <= 1;

        if pure
            || depth >= self.params.max_depth
            || samples.len() < self.params.min_samples_split
            || samples.len() < 2 * self.params.min_samples_leaf
        {
            return leaf(distribution, total);
        }

        let Some(best) = self.find_best_split(samples, rng) else {
            return leaf(distribution, total);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| self.x[[i, best.feature]] <= best.threshold);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(&left, depth + 1, rng)),
            right: Box::new(self.build(&right, depth + 1, rng)),
        }
    }

    fn class_weights(&self, samples: &[usize]) -> Vec<f64> {
        let mut dist = vec![0.0; self.n_classes];
        for &i in samples {
            dist[self.y[i]] += self.weights[i];
        }
        dist
    }

    /// Scans features in random order until `max_features` non-constant
    /// ones have been evaluated, continuing past that while no valid split
    /// has been found.
    fn find_best_split(&self, samples: &[usize], rng: &mut StdRng) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(rng);

        let mut best: Option<BestSplit> = None;
        let mut visited = 0;
        for feature in features {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            let first = self.x[[samples[0], feature]];
            if samples.iter().all(|&i| self.x[[i, feature]] == first) {
                continue;
            }
            visited += 1;
            if let Some(candidate) = self.best_split_for_feature(samples, feature) {
                if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_for_feature(&self, samples: &[usize], feature: usize) -> Option<BestSplit> {
        let mut sorted: Vec<(f64, usize)> = samples.iter().map(|&i| (self.x[[i, feature]], i)).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut right = self.class_weights(samples);
        let mut left = vec![0.0; self.n_classes];
        let total: f64 = right.iter().sum();
        let mut left_total = 0.0;
        let min_leaf = self.params.min_samples_leaf.max(1);
        let n = sorted.len();

        let mut best: Option<BestSplit> = None;
        for pos in 0..n - 1 {
            let (value, i) = sorted[pos];
            let w = self.weights[i];
            left[self.y[i]] += w;
            right[self.y[i]] -= w;
            left_total += w;

            let n_left = pos + 1;
            if n_left < min_leaf || n - n_left < min_leaf {
                continue;
            }
            let next = sorted[pos + 1].0;
            if next <= value {
                continue;
            }

            let right_total = total - left_total;
            let impurity = (left_total * gini(&left, left_total) + right_total * gini(&right, right_total)) / total;
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(BestSplit {
                    feature,
                    threshold: value + (next - value) / 2.0,
                    impurity,
                });
            }
        }
        best
    }
}

fn gini(weights: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - weights.iter().map(|w| (w / total).powi(2)).sum::<f64>()
}

fn leaf(mut distribution: Vec<f64>, total: f64) -> TreeNode {
    if total > 0.0 {
        distribution.iter_mut().for_each(|w| *w /= total);
    } else {
        let uniform = 1.0 / distribution.len() as f64;
        distribution.iter_mut().for_each(|w| *w = uniform);
    }
    TreeNode::Leaf { distribution }
}

impl DecisionTree {
    fn predict_proba(&self, row: ArrayView1<f64>) -> &[f64] {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// Bagged ensemble of decision trees with class-balanced sample weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            n_classes: 0,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_tree_depth(&self) -> usize {
        self.trees.iter().map(|t| t.root.depth()).max().unwrap_or(0)
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<(), ClassifierError> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(ClassifierError::Training(format!(
                "forest needs matching non-empty inputs, got {} rows and {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(ClassifierError::Training(format!("label code {} outside 0..{}", bad, n_classes)));
        }
        if self.params.n_estimators == 0 {
            return Err(ClassifierError::Training("forest needs at least one tree".into()));
        }

        // Balanced weights: n_samples / (n_present_classes * class_count).
        let counts = class_counts(y, n_classes);
        let present = counts.iter().filter(|&&c| c > 0).count() as f64;
        let class_weight: Vec<f64> = counts
            .iter()
            .map(|&c| if c > 0 { y.len() as f64 / (present * c as f64) } else { 0.0 })
            .collect();
        let weights: Vec<f64> = y.iter().map(|&label| class_weight[label]).collect();

        let max_features = ((x.ncols() as f64).sqrt() as usize).max(1);
        let builder = TreeBuilder {
            x,
            y,
            weights: &weights,
            n_classes,
            max_features,
            params: &self.params,
        };

        let mut rng = StdRng::seed_from_u64(self.params.random_state);
        let n = x.nrows();
        let mut trees = Vec::with_capacity(self.params.n_estimators);
        for _ in 0..self.params.n_estimators {
            let mut tree_rng = StdRng::seed_from_u64(rng.random());
            let bootstrap: Vec<usize> = (0..n).map(|_| tree_rng.random_range(0..n)).collect();
            let root = builder.build(&bootstrap, 0, &mut tree_rng);
            trees.push(DecisionTree { root });
        }

        self.trees = trees;
        self.n_classes = n_classes;
        debug!(
            "Random forest fitted: {} trees, {} features ({} per split), max depth reached {}",
            self.trees.len(),
            x.ncols(),
            max_features,
            self.max_tree_depth()
        );
        Ok(())
    }

    /// Mean of the trees' leaf class distributions.
    pub fn predict_proba_one(&self, row: ArrayView1<f64>) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return proba;
        }
        for tree in &self.trees {
            for (p, t) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *p += t;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        x.rows()
            .into_iter()
            .map(|row| argmax(&self.predict_proba_one(row)))
            .collect()
    }
}
