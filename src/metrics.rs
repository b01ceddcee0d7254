//! Metrics
//!
//! Evaluation metrics for fitted outcome models.

/// Mean squared error.
pub fn mean_squared_error(y: &[f64], yhat: &[f64]) -> f64 {
    y.iter()
        .zip(yhat)
        .map(|(y_, yhat_)| (y_ - yhat_) * (y_ - yhat_))
        .sum::<f64>()
        / y.len() as f64
}

/// Root mean squared error.
pub fn root_mean_squared_error(y: &[f64], yhat: &[f64]) -> f64 {
    mean_squared_error(y, yhat).sqrt()
}

/// Negative log likelihood of binary labels given predicted probabilities.
///
/// Probabilities are clamped away from 0 and 1 to keep the result finite.
pub fn log_loss(y: &[f64], yhat: &[f64]) -> f64 {
    y.iter()
        .zip(yhat)
        .map(|(y_, yhat_)| {
            let p = yhat_.clamp(1e-15, 1.0 - 1e-15);
            -(y_ * p.ln() + (1.0 - y_) * (1.0 - p).ln())
        })
        .sum::<f64>()
        / y.len() as f64
}
