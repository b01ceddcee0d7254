//! Model
//!
//! Supervised estimators used as the outcome models of the meta-learners.
//! Each estimator fits a numeric target over a column-major feature matrix.
pub mod boosting;
pub mod forest;
pub mod linear;
pub mod tree;

pub use boosting::GradientBoostedTreeRegressor;
pub use forest::RandomForestRegressor;
pub use linear::{LinearRegression, LogisticRegression};
pub use tree::DecisionTreeRegressor;

use crate::data::Matrix;
use crate::errors::ReinaError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A supervised model that can be fit on a feature matrix and a target,
/// and can produce one prediction per row.
///
/// Classification models predict on the probability scale, so that
/// counterfactual differences of binary outcomes are risk differences.
pub trait Estimator {
    /// Fit the model.
    ///
    /// * `x` - Feature matrix, one column per feature.
    /// * `y` - Target values, one per row of `x`.
    fn fit(&mut self, x: &Matrix<f64>, y: &[f64]) -> Result<(), ReinaError>;

    /// Predict one value per row of `x`.
    fn predict(&self, x: &Matrix<f64>) -> Vec<f64>;
}

/// An outcome model of any supported kind, with default parameters.
///
/// This is the string-addressable model factory: parse a model name to get
/// a ready-to-fit estimator, or construct the variants directly for full
/// parameter control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Model {
    LinearRegression(LinearRegression),
    LogisticRegression(LogisticRegression),
    DecisionTreeRegressor(DecisionTreeRegressor),
    RandomForestRegressor(RandomForestRegressor),
    GradientBoostedTreeRegressor(GradientBoostedTreeRegressor),
}

impl FromStr for Model {
    type Err = ReinaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LinearRegression" => Ok(Model::LinearRegression(LinearRegression::default())),
            "LogisticRegression" => Ok(Model::LogisticRegression(LogisticRegression::default())),
            "DecisionTreeRegressor" => Ok(Model::DecisionTreeRegressor(DecisionTreeRegressor::default())),
            "RandomForestRegressor" => Ok(Model::RandomForestRegressor(RandomForestRegressor::default())),
            "GradientBoostedTreeRegressor" => Ok(Model::GradientBoostedTreeRegressor(
                GradientBoostedTreeRegressor::default(),
            )),
            _ => Err(ReinaError::ParseString(
                s.to_string(),
                "Model".to_string(),
                items_to_strings(&[
                    "LinearRegression",
                    "LogisticRegression",
                    "DecisionTreeRegressor",
                    "RandomForestRegressor",
                    "GradientBoostedTreeRegressor",
                ]),
            )),
        }
    }
}

impl Estimator for Model {
    fn fit(&mut self, x: &Matrix<f64>, y: &[f64]) -> Result<(), ReinaError> {
        match self {
            Model::LinearRegression(model) => model.fit(x, y),
            Model::LogisticRegression(model) => model.fit(x, y),
            Model::DecisionTreeRegressor(model) => model.fit(x, y),
            Model::RandomForestRegressor(model) => model.fit(x, y),
            Model::GradientBoostedTreeRegressor(model) => model.fit(x, y),
        }
    }

    fn predict(&self, x: &Matrix<f64>) -> Vec<f64> {
        match self {
            Model::LinearRegression(model) => model.predict(x),
            Model::LogisticRegression(model) => model.predict(x),
            Model::DecisionTreeRegressor(model) => model.predict(x),
            Model::RandomForestRegressor(model) => model.predict(x),
            Model::GradientBoostedTreeRegressor(model) => model.predict(x),
        }
    }
}
