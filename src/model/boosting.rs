//! Gradient boosting
//!
//! Gradient-boosted regression trees on squared loss. Each round fits a
//! shallow tree to the current residuals and adds it to the ensemble with a
//! learning-rate step.
use crate::data::Matrix;
use crate::errors::ReinaError;
use crate::metrics::mean_squared_error;
use crate::model::tree::DecisionTreeRegressor;
use crate::model::Estimator;
use crate::utils::mean;
use log::info;
use serde::{Deserialize, Serialize};

/// Gradient boosted tree regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedTreeRegressor {
    /// Number of boosting rounds.
    pub n_rounds: usize,
    /// Step size to use at each iteration. Each tree's contribution is
    /// multiplied by this number. The smaller the value, the more
    /// conservative the ensemble will be.
    pub eta: f64,
    /// Maximum depth of each tree.
    pub max_depth: usize,
    /// Minimum number of samples per leaf of each tree.
    pub min_samples_leaf: usize,
    /// Log the training loss every this many rounds. Zero disables logging.
    pub log_iterations: usize,
    base_score: f64,
    trees: Vec<DecisionTreeRegressor>,
}

impl Default for GradientBoostedTreeRegressor {
    fn default() -> Self {
        GradientBoostedTreeRegressor {
            n_rounds: 100,
            eta: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            log_iterations: 0,
            base_score: 0.0,
            trees: Vec::new(),
        }
    }
}

impl GradientBoostedTreeRegressor {
    /// Set the number of boosting rounds.
    pub fn set_n_rounds(mut self, n_rounds: usize) -> Self {
        self.n_rounds = n_rounds;
        self
    }

    /// Set the learning rate.
    pub fn set_eta(mut self, eta: f64) -> Self {
        self.eta = eta;
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

    /// Set how often the training loss is logged.
    pub fn set_log_iterations(mut self, log_iterations: usize) -> Self {
        self.log_iterations = log_iterations;
        self
    }

    /// Number of trees in the fitted ensemble.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Estimator for GradientBoostedTreeRegressor {
    fn fit(&mut self, x: &Matrix<f64>, y: &[f64]) -> Result<(), ReinaError> {
        if x.rows == 0 || x.cols == 0 {
            return Err(ReinaError::EmptyData("no rows or columns to fit on".to_string()));
        }
        if self.n_rounds == 0 {
            return Err(ReinaError::InvalidParameter(
                "n_rounds".to_string(),
                "a value of at least 1".to_string(),
                "0".to_string(),
            ));
        }
        if !(self.eta > 0.0 && self.eta <= 1.0) {
            return Err(ReinaError::InvalidParameter(
                "eta".to_string(),
                "a value within (0, 1]".to_string(),
                self.eta.to_string(),
            ));
        }
        debug_assert_eq!(x.rows, y.len());

        self.base_score = mean(y);
        self.trees = Vec::with_capacity(self.n_rounds);
        let mut preds = vec![self.base_score; x.rows];

        for round in 0..self.n_rounds {
            let residuals: Vec<f64> = y.iter().zip(&preds).map(|(y_, p)| y_ - p).collect();

            let mut tree = DecisionTreeRegressor::default()
                .set_max_depth(self.max_depth)
                .set_min_samples_leaf(self.min_samples_leaf);
            tree.fit(x, &residuals)?;

            let update = tree.predict(x);
            for (pred, u) in preds.iter_mut().zip(&update) {
                *pred += self.eta * u;
            }
            self.trees.push(tree);

            if self.log_iterations > 0 && (round + 1) % self.log_iterations == 0 {
                info!("round {}, training loss {}", round + 1, mean_squared_error(y, &preds));
            }
        }
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Vec<f64> {
        let mut preds = vec![self.base_score; x.rows];
        for tree in &self.trees {
            for (pred, u) in preds.iter_mut().zip(tree.predict(x)) {
                *pred += self.eta * u;
            }
        }
        preds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boosting_reduces_training_error() {
        let n = 200;
        let x_data: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let y: Vec<f64> = x_data.iter().map(|x| (6.0 * x).sin() + 2.0 * x).collect();
        let matrix = Matrix::new(&x_data, n, 1);

        let mut model = GradientBoostedTreeRegressor::default().set_n_rounds(50);
        model.fit(&matrix, &y).expect("Fit failed");

        let base = vec![mean(&y); n];
        let base_error = mean_squared_error(&y, &base);
        let error = mean_squared_error(&y, &model.predict(&matrix));
        assert!(
            error < base_error / 10.0,
            "boosting should beat the base score, {error} vs {base_error}"
        );
        assert_eq!(model.tree_count(), 50);
    }

    #[test]
    fn test_boosting_rejects_bad_eta() {
        let data = vec![1.0, 2.0];
        let matrix = Matrix::new(&data, 2, 1);
        let mut model = GradientBoostedTreeRegressor::default().set_eta(0.0);
        assert!(matches!(
            model.fit(&matrix, &[0.0, 1.0]),
            Err(ReinaError::InvalidParameter(_, _, _))
        ));
    }

    #[test]
    fn test_boosting_constant_target_stays_constant() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let matrix = Matrix::new(&data, 4, 1);
        let y = vec![5.0; 4];

        let mut model = GradientBoostedTreeRegressor::default().set_n_rounds(5);
        model.fit(&matrix, &y).expect("Fit failed");
        assert!(model.predict(&matrix).iter().all(|p| (p - 5.0).abs() < 1e-9));
    }
}
