//! Decision tree
//!
//! A greedy CART regression tree. Splits are chosen by variance reduction,
//! with the candidate search parallelized over features.
use crate::data::Matrix;
use crate::errors::ReinaError;
use crate::utils::mean;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minimum reduction in squared error required to keep a split.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    feature: usize,
    split_value: f64,
    left: usize,
    right: usize,
    value: f64,
    is_leaf: bool,
}

impl Node {
    fn leaf(value: f64) -> Self {
        Node {
            feature: 0,
            split_value: f64::NAN,
            left: 0,
            right: 0,
            value,
            is_leaf: true,
        }
    }
}

struct SplitCandidate {
    feature: usize,
    value: f64,
    gain: f64,
}

/// Regression tree with depth and leaf-size limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    /// Maximum depth of the tree. Zero yields a single leaf.
    pub max_depth: usize,
    /// Minimum number of samples required in each child of a split.
    pub min_samples_leaf: usize,
    nodes: Vec<Node>,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        DecisionTreeRegressor {
            max_depth: 5,
            min_samples_leaf: 1,
            nodes: Vec::new(),
        }
    }
}

impl DecisionTreeRegressor {
    /// Set the maximum tree depth.
    pub fn set_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples per leaf.
    pub fn set_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Number of nodes in the fitted tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn grow(&mut self, x: &Matrix<f64>, y: &[f64], indices: Vec<usize>, depth: usize) -> usize {
        let node_values: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let leaf_value = mean(&node_values);

        if depth >= self.max_depth || indices.len() < 2 * self.min_samples_leaf {
            self.nodes.push(Node::leaf(leaf_value));
            return self.nodes.len() - 1;
        }

        let min_samples_leaf = self.min_samples_leaf;
        let best = (0..x.cols)
            .into_par_iter()
            .filter_map(|feature| {
                best_split_for_feature(x.get_col(feature), &indices, y, min_samples_leaf)
                    .map(|(value, gain)| SplitCandidate { feature, value, gain })
            })
            .max_by(|a, b| a.gain.partial_cmp(&b.gain).unwrap_or(Ordering::Equal));

        let Some(split) = best else {
            self.nodes.push(Node::leaf(leaf_value));
            return self.nodes.len() - 1;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| *x.get(i, split.feature) <= split.value);

        let node_index = self.nodes.len();
        self.nodes.push(Node::leaf(leaf_value));
        let left = self.grow(x, y, left_indices, depth + 1);
        let right = self.grow(x, y, right_indices, depth + 1);
        self.nodes[node_index] = Node {
            feature: split.feature,
            split_value: split.value,
            left,
            right,
            value: leaf_value,
            is_leaf: false,
        };
        node_index
    }

    fn predict_row(&self, x: &Matrix<f64>, row: usize) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        let mut node = &self.nodes[0];
        while !node.is_leaf {
            // NaN comparisons are false, so missing values fall to the right.
            node = if *x.get(row, node.feature) <= node.split_value {
                &self.nodes[node.left]
            } else {
                &self.nodes[node.right]
            };
        }
        node.value
    }
}

impl super::Estimator for DecisionTreeRegressor {
    fn fit(&mut self, x: &Matrix<f64>, y: &[f64]) -> Result<(), ReinaError> {
        if x.rows == 0 || x.cols == 0 {
            return Err(ReinaError::EmptyData("no rows or columns to fit on".to_string()));
        }
        if self.min_samples_leaf == 0 {
            return Err(ReinaError::InvalidParameter(
                "min_samples_leaf".to_string(),
                "a value of at least 1".to_string(),
                "0".to_string(),
            ));
        }
        debug_assert_eq!(x.rows, y.len());

        self.nodes.clear();
        self.grow(x, y, (0..x.rows).collect(), 0);
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Vec<f64> {
        (0..x.rows).map(|row| self.predict_row(x, row)).collect()
    }
}

/// Scan one feature for the best split by reduction in squared error.
///
/// Returns the split threshold and its gain, or None if no valid split
/// exists for this feature.
fn best_split_for_feature(
    col: &[f64],
    indices: &[usize],
    y: &[f64],
    min_samples_leaf: usize,
) -> Option<(f64, f64)> {
    let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (col[i], y[i])).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let n = pairs.len() as f64;
    let total_sum: f64 = pairs.iter().map(|(_, y_)| y_).sum();
    let total_sq: f64 = pairs.iter().map(|(_, y_)| y_ * y_).sum();
    let total_sse = total_sq - total_sum * total_sum / n;

    let mut best: Option<(f64, f64)> = None;
    let mut left_sum = 0.0;
    let mut left_sq = 0.0;

    for k in 1..pairs.len() {
        let (value, target) = pairs[k - 1];
        left_sum += target;
        left_sq += target * target;

        if k < min_samples_leaf || pairs.len() - k < min_samples_leaf {
            continue;
        }
        let next_value = pairs[k].0;
        if !(value < next_value) || !value.is_finite() || !next_value.is_finite() {
            continue;
        }

        let left_n = k as f64;
        let right_n = n - left_n;
        let right_sum = total_sum - left_sum;
        let right_sq = total_sq - left_sq;
        let left_sse = left_sq - left_sum * left_sum / left_n;
        let right_sse = right_sq - right_sum * right_sum / right_n;
        let gain = total_sse - left_sse - right_sse;

        if gain > MIN_GAIN && best.map_or(true, |(_, g)| gain > g) {
            best = Some(((value + next_value) / 2.0, gain));
        }
    }
    best
}
