//! Isolation forest outlier detection.
//!
//! Points that random axis-aligned partitioning separates in few steps are
//! outliers. Randomness comes from a `StdRng` seeded with
//! [`IsolationForestConfig::seed`] (42 by default), so identical input always
//! yields identical scores.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Euler-Mascheroni constant used in the harmonic-number approximation.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
const MAX_SUBSAMPLE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolationForestConfig {
    /// Number of trees in the ensemble.
    pub trees: usize,
    /// Expected share of outliers, used as the score percentile threshold.
    pub contamination: f64,
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self { trees: 100, contamination: 0.1, seed: 42 }
    }
}

#[derive(Debug)]
enum Node {
    Leaf { size: usize },
    Split { feature: usize, threshold: f64, left: Box<Node>, right: Box<Node> },
}

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn build_tree(
    data: &[Vec<f64>],
    rows: &[usize],
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if rows.len() <= 1 || depth >= max_depth {
        return Node::Leaf { size: rows.len() };
    }

    let dims = data[rows[0]].len();
    let splittable: Vec<(usize, f64, f64)> = (0..dims)
        .filter_map(|feature| {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                (lo.min(data[r][feature]), hi.max(data[r][feature]))
            });
            (hi > lo).then_some((feature, lo, hi))
        })
        .collect();

    // All remaining rows are identical.
    if splittable.is_empty() {
        return Node::Leaf { size: rows.len() };
    }

    let (feature, lo, hi) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = rng.gen_range(lo..hi);
    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.iter().copied().partition(|&r| data[r][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(data, &left, depth + 1, max_depth, rng)),
        right: Box::new(build_tree(data, &right, depth + 1, max_depth, rng)),
    }
}

fn path_length(node: &Node, point: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split { feature, threshold, left, right } => {
            let next = if point[*feature] < *threshold { left } else { right };
            path_length(next, point, depth + 1)
        }
    }
}

/// Scores and labels of one fit.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierScores {
    /// One score per input row in [-1, 0); lower is more anomalous.
    pub scores: Vec<f64>,
    /// Rows whose score falls strictly below the contamination percentile.
    pub outliers: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct IsolationForest {
    config: IsolationForestConfig,
}

impl IsolationForest {
    pub fn new(config: IsolationForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IsolationForestConfig {
        &self.config
    }

    /// Fits an ensemble on `data` and scores every row of it.
    ///
    /// Rows must share one dimensionality.
    pub fn fit_score(&self, data: &[Vec<f64>]) -> OutlierScores {
        if data.is_empty() {
            return OutlierScores { scores: Vec::new(), outliers: Vec::new() };
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let sample_size = data.len().min(MAX_SUBSAMPLE);
        let max_depth = (sample_size as f64).log2().ceil().max(1.0) as usize;
        let trees = self.config.trees.max(1);

        let forest: Vec<Node> = (0..trees)
            .map(|_| {
                let rows = index::sample(&mut rng, data.len(), sample_size).into_vec();
                build_tree(data, &rows, 0, max_depth, &mut rng)
            })
            .collect();

        let normalizer = average_path_length(sample_size);
        let scores: Vec<f64> = data
            .iter()
            .map(|point| {
                let mean_path =
                    forest.iter().map(|tree| path_length(tree, point, 0)).sum::<f64>()
                        / forest.len() as f64;
                if normalizer > 0.0 { -(2f64.powf(-mean_path / normalizer)) } else { -0.5 }
            })
            .collect();

        let threshold = super::stats::percentile(&scores, self.config.contamination * 100.0);
        let outliers = scores
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score < threshold)
            .map(|(i, _)| i)
            .collect();

        OutlierScores { scores, outliers }
    }
}

/// Standardizes each column to zero mean and unit population variance.
///
/// Constant columns are centered but left unscaled.
pub fn standardize(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let dims = first.len();
    let columns: Vec<(f64, f64)> = (0..dims)
        .map(|d| {
            let column: Vec<f64> = rows.iter().map(|r| r[d]).collect();
            let std = super::stats::population_std(&column);
            (super::stats::mean(&column), if std > 0.0 { std } else { 1.0 })
        })
        .collect();

    rows.iter()
        .map(|row| row.iter().zip(&columns).map(|(v, (mean, std))| (v - mean) / std).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_with_spike() -> Vec<Vec<f64>> {
        let mut rows: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let jitter = f64::from(i % 5) * 0.1;
                vec![50.0 + jitter, 10.0 + jitter, 100.0 + jitter]
            })
            .collect();
        rows.push(vec![99.0, 80.0, 900.0]);
        rows
    }

    #[test]
    fn test_average_path_length_small_inputs() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!(average_path_length(256) > average_path_length(16));
    }

    #[test]
    fn test_spike_has_lowest_score_and_is_flagged() {
        let data = standardize(&cluster_with_spike());
        let result = IsolationForest::default().fit_score(&data);

        let spike = data.len() - 1;
        let lowest = result
            .scores
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(lowest, spike);
        assert!(result.outliers.contains(&spike));
        assert!(result.scores.iter().all(|s| (-1.0..0.0).contains(s)));
    }

    #[test]
    fn test_identical_rows_have_no_outliers() {
        let data = vec![vec![1.0, 2.0, 3.0]; 20];
        let result = IsolationForest::default().fit_score(&standardize(&data));
        assert!(result.outliers.is_empty());
    }

    #[test]
    fn test_scores_are_deterministic_for_a_seed() {
        let data = standardize(&cluster_with_spike());
        let forest = IsolationForest::default();
        assert_eq!(forest.fit_score(&data), forest.fit_score(&data));
    }

    #[test]
    fn test_standardize_handles_constant_column() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaled = standardize(&rows);
        assert_eq!(scaled, vec![vec![-1.0, 0.0], vec![1.0, 0.0]]);
    }
}
