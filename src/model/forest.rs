//! Random forest
//!
//! Bootstrap-aggregated regression trees. Each tree is grown on a resampled
//! copy of the rows over a random subset of the features, in parallel.
use crate::data::Matrix;
use crate::errors::ReinaError;
use crate::model::tree::DecisionTreeRegressor;
use crate::model::Estimator;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForestTree {
    features: Vec<usize>,
    tree: DecisionTreeRegressor,
}

/// Random forest regressor.
///
/// Fitting is deterministic for a fixed `seed`: every tree derives its own
/// rng from the seed and the tree index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    /// Number of trees to grow.
    pub n_trees: usize,
    /// Maximum depth of each tree.
    pub max_depth: usize,
    /// Minimum number of samples per leaf of each tree.
    pub min_samples_leaf: usize,
    /// Fraction of features sampled for each tree.
    pub max_features: f64,
    /// Integer value used to seed any randomness used in the algorithm.
    pub seed: u64,
    trees: Vec<ForestTree>,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        RandomForestRegressor {
            n_trees: 100,
            max_depth: 5,
            min_samples_leaf: 1,
            max_features: 1.0,
            seed: 0,
            trees: Vec::new(),
        }
    }
}

impl RandomForestRegressor {
    /// Set the number of trees.
    pub fn set_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Set the maximum depth of each tree.
    pub fn set_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples per leaf.
    pub fn set_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the fraction of features sampled per tree.
    pub fn set_max_features(mut self, max_features: f64) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Estimator for RandomForestRegressor {
    fn fit(&mut self, x: &Matrix<f64>, y: &[f64]) -> Result<(), ReinaError> {
        if x.rows == 0 || x.cols == 0 {
            return Err(ReinaError::EmptyData("no rows or columns to fit on".to_string()));
        }
        if self.n_trees == 0 {
            return Err(ReinaError::InvalidParameter(
                "n_trees".to_string(),
                "a value of at least 1".to_string(),
                "0".to_string(),
            ));
        }
        if !(self.max_features > 0.0 && self.max_features <= 1.0) {
            return Err(ReinaError::InvalidParameter(
                "max_features".to_string(),
                "a fraction within (0, 1]".to_string(),
                self.max_features.to_string(),
            ));
        }
        debug_assert_eq!(x.rows, y.len());

        let n = x.rows;
        let n_features = ((x.cols as f64 * self.max_features).ceil() as usize).clamp(1, x.cols);
        let seed = self.seed;
        let max_depth = self.max_depth;
        let min_samples_leaf = self.min_samples_leaf;

        self.trees = (0..self.n_trees)
            .into_par_iter()
            .map(|index| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
                let mut features = (0..x.cols).choose_multiple(&mut rng, n_features);
                features.sort_unstable();

                let row_indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut data = Vec::with_capacity(n * features.len());
                for &feature in &features {
                    let column = x.get_col(feature);
                    data.extend(row_indices.iter().map(|&i| column[i]));
                }
                let targets: Vec<f64> = row_indices.iter().map(|&i| y[i]).collect();

                let sample = Matrix::new(&data, n, features.len());
                let mut tree = DecisionTreeRegressor::default()
                    .set_max_depth(max_depth)
                    .set_min_samples_leaf(min_samples_leaf);
                tree.fit(&sample, &targets)?;
                Ok(ForestTree { features, tree })
            })
            .collect::<Result<Vec<ForestTree>, ReinaError>>()?;
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Vec<f64> {
        if self.trees.is_empty() {
            return vec![0.0; x.rows];
        }
        let sums = self
            .trees
            .par_iter()
            .map(|forest_tree| {
                let mut data = Vec::with_capacity(x.rows * forest_tree.features.len());
                for &feature in &forest_tree.features {
                    data.extend_from_slice(x.get_col(feature));
                }
                let sample = Matrix::new(&data, x.rows, forest_tree.features.len());
                forest_tree.tree.predict(&sample)
            })
            .reduce(
                || vec![0.0; x.rows],
                |mut acc, preds| {
                    for (a, p) in acc.iter_mut().zip(&preds) {
                        *a += p;
                    }
                    acc
                },
            );
        let count = self.trees.len() as f64;
        sums.into_iter().map(|s| s / count).collect()
    }
}
