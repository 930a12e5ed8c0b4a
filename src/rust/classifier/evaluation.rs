//! Data splitting and classification metrics.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use crate::labels::LabelMap;

/// Index sets of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified shuffle split holding out `ceil(test_size * n)` samples.
///
/// Each class contributes to the test set in proportion to its size; the
/// rounding remainder goes to the classes with the largest fractional share.
pub fn train_test_split(
    labels: &[usize],
    n_classes: usize,
    test_size: f64,
    random_state: u64,
) -> Result<Split, ClassifierError> {
    let n = labels.len();
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(ClassifierError::Training(format!("test size {} must be in (0, 1)", test_size)));
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    let groups = group_by_class(labels, n_classes);
    let present = groups.iter().filter(|g| !g.is_empty()).count();
    if n_test < present || n - n_test < present {
        return Err(ClassifierError::Training(format!(
            "cannot stratify {} samples of {} classes with test size {}",
            n, present, test_size
        )));
    }
    if let Some(single) = groups.iter().position(|g| g.len() == 1) {
        return Err(ClassifierError::Training(format!(
            "class {} has a single sample; stratified split needs at least two",
            single
        )));
    }

    // Largest-remainder allocation of the test quota.
    let mut quota: Vec<(usize, f64)> = groups
        .iter()
        .map(|g| {
            let exact = g.len() as f64 * n_test as f64 / n as f64;
            (exact.floor() as usize, exact - exact.floor())
        })
        .collect();
    let mut remaining = n_test - quota.iter().map(|q| q.0).sum::<usize>();
    let mut order: Vec<usize> = (0..quota.len()).collect();
    order.sort_by(|&a, &b| quota[b].1.total_cmp(&quota[a].1).then(a.cmp(&b)));
    for class in order {
        if remaining == 0 {
            break;
        }
        if quota[class].0 < groups[class].len() {
            quota[class].0 += 1;
            remaining -= 1;
        }
    }

    let mut rng = StdRng::seed_from_u64(random_state);
    let mut split = Split {
        train: Vec::with_capacity(n - n_test),
        test: Vec::with_capacity(n_test),
    };
    for (group, (take, _)) in groups.into_iter().zip(quota) {
        let mut group = group;
        group.shuffle(&mut rng);
        split.test.extend_from_slice(&group[..take]);
        split.train.extend_from_slice(&group[take..]);
    }
    split.train.shuffle(&mut rng);
    split.test.shuffle(&mut rng);
    Ok(split)
}

/// Unshuffled stratified k-fold: the i-th sample of every class goes to
/// fold `i % k`.
pub fn stratified_k_fold(labels: &[usize], n_classes: usize, k: usize) -> Result<Vec<Split>, ClassifierError> {
    if k < 2 {
        return Err(ClassifierError::Training(format!("cross-validation needs at least 2 folds, got {}", k)));
    }
    if labels.len() < k {
        return Err(ClassifierError::Training(format!(
            "cannot split {} samples into {} folds",
            labels.len(),
            k
        )));
    }

    let groups = group_by_class(labels, n_classes);
    if let Some((class, group)) = groups.iter().enumerate().find(|(_, g)| !g.is_empty() && g.len() < k) {
        return Err(ClassifierError::Training(format!(
            "class {} has {} samples, fewer than the {} cross-validation folds",
            class,
            group.len(),
            k
        )));
    }

    let mut fold_of = vec![0; labels.len()];
    for group in groups {
        for (i, &sample) in group.iter().enumerate() {
            fold_of[sample] = i % k;
        }
    }

    Ok((0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&i| fold_of[i] == fold);
            Split { train, test }
        })
        .collect())
}

fn group_by_class(labels: &[usize], n_classes: usize) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); n_classes];
    for (i, &label) in labels.iter().enumerate() {
        if label < n_classes {
            groups[label].push(i);
        }
    }
    groups
}

pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Precision, recall, F1 and support for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus macro and weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub labels: Vec<String>,
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Undefined ratios (no predictions or no support) count as zero.
    pub fn new(y_true: &[usize], y_pred: &[usize], label_map: &LabelMap) -> Self {
        let n_classes = label_map.len();
        let mut per_class = Vec::with_capacity(n_classes);
        for class in 0..n_classes {
            let tp = y_true.iter().zip(y_pred).filter(|&(&t, &p)| t == class && p == class).count();
            let predicted = y_pred.iter().filter(|&&p| p == class).count();
            let support = y_true.iter().filter(|&&t| t == class).count();
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            per_class.push(ClassMetrics {
                precision,
                recall,
                f1,
                support,
            });
        }

        let total: usize = per_class.iter().map(|m| m.support).sum();
        let k = n_classes.max(1) as f64;
        let macro_avg = ClassMetrics {
            precision: per_class.iter().map(|m| m.precision).sum::<f64>() / k,
            recall: per_class.iter().map(|m| m.recall).sum::<f64>() / k,
            f1: per_class.iter().map(|m| m.f1).sum::<f64>() / k,
            support: total,
        };
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_class.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            labels: label_map.labels().iter().map(|l| l.to_string()).collect(),
            accuracy: accuracy(y_true, y_pred),
            per_class,
            macro_avg,
            weighted_avg,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.labels.iter().map(String::len).max().unwrap_or(0).max(12);
        writeln!(f, "{:>width$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (label, m) in self.labels.iter().zip(&self.per_class) {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

/// Per-fold accuracies of a cross-validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidation {
    pub scores: Vec<f64>,
}

impl CrossValidation {
    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    /// Population standard deviation.
    pub fn std(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let var = self.scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / self.scores.len() as f64;
        var.sqrt()
    }
}

impl fmt::Display for CrossValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} (+/- {:.4})", self.mean(), self.std() * 2.0)
    }
}
