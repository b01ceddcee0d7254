//! Linear models
//!
//! Ridge-regularized linear regression solved in closed form, and binary
//! logistic regression fit with Newton iterations. Both solve their normal
//! equations with a Cholesky factorization.
use crate::data::Matrix;
use crate::errors::ReinaError;
use crate::utils::{sigmoid, validate_float_parameter};
use nalgebra::{Cholesky, DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Build the dense design matrix, optionally with a trailing intercept
/// column of ones.
fn design_matrix(x: &Matrix<f64>, fit_intercept: bool) -> DMatrix<f64> {
    let extra = usize::from(fit_intercept);
    DMatrix::from_fn(x.rows, x.cols + extra, |i, j| {
        if j < x.cols {
            *x.get(i, j)
        } else {
            1.0
        }
    })
}

/// Linear regression with an L2 penalty on the feature coefficients.
///
/// The intercept is never penalized. With `alpha` set to zero this is
/// ordinary least squares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Strength of the L2 penalty.
    pub alpha: f64,
    /// Whether to fit an intercept term.
    pub fit_intercept: bool,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        LinearRegression {
            alpha: 1e-6,
            fit_intercept: true,
            coefficients: Vec::new(),
            intercept: 0.0,
        }
    }
}

impl LinearRegression {
    /// Set the L2 penalty strength.
    pub fn set_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set whether an intercept term is fit.
    pub fn set_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Fitted feature coefficients, one per column of the training matrix.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Fitted intercept, zero when `fit_intercept` is false.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl super::Estimator for LinearRegression {
    fn fit(&mut self, x: &Matrix<f64>, y: &[f64]) -> Result<(), ReinaError> {
        validate_float_parameter(self.alpha, 0.0, f64::INFINITY, "alpha")?;
        if x.rows == 0 || x.cols == 0 {
            return Err(ReinaError::EmptyData("no rows or columns to fit on".to_string()));
        }
        debug_assert_eq!(x.rows, y.len());

        let design = design_matrix(x, self.fit_intercept);
        let xt = design.transpose();
        let mut xtx = &xt * &design;
        for j in 0..x.cols {
            xtx[(j, j)] += self.alpha;
        }
        let xty = &xt * DVector::from_column_slice(y);

        let solution = Cholesky::new(xtx)
            .ok_or_else(|| {
                ReinaError::SingularSystem("normal equations are singular, increase alpha".to_string())
            })?
            .solve(&xty);

        self.coefficients = solution.as_slice()[..x.cols].to_vec();
        self.intercept = if self.fit_intercept { solution[x.cols] } else { 0.0 };
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Vec<f64> {
        let mut preds = vec![self.intercept; x.rows];
        for (j, coefficient) in self.coefficients.iter().enumerate() {
            for (pred, value) in preds.iter_mut().zip(x.get_col(j)) {
                *pred += coefficient * value;
            }
        }
        preds
    }
}

/// Binary logistic regression fit by Newton-Raphson with an L2 penalty.
///
/// `predict` returns probabilities of the positive class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Strength of the L2 penalty.
    pub alpha: f64,
    /// Whether to fit an intercept term.
    pub fit_intercept: bool,
    /// Maximum number of Newton iterations.
    pub max_iterations: usize,
    /// Stop once the largest coefficient update falls below this value.
    pub tolerance: f64,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        LogisticRegression {
            alpha: 1e-3,
            fit_intercept: true,
            max_iterations: 100,
            tolerance: 1e-8,
            coefficients: Vec::new(),
            intercept: 0.0,
        }
    }
}

impl LogisticRegression {
    /// Set the L2 penalty strength.
    pub fn set_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set whether an intercept term is fit.
    pub fn set_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Set the maximum number of Newton iterations.
    pub fn set_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl super::Estimator for LogisticRegression {
    fn fit(&mut self, x: &Matrix<f64>, y: &[f64]) -> Result<(), ReinaError> {
        validate_float_parameter(self.alpha, 0.0, f64::INFINITY, "alpha")?;
        if x.rows == 0 || x.cols == 0 {
            return Err(ReinaError::EmptyData("no rows or columns to fit on".to_string()));
        }
        if let Some(bad) = y.iter().find(|v| **v != 0.0 && **v != 1.0) {
            return Err(ReinaError::InvalidParameter(
                "y".to_string(),
                "binary labels 0 or 1".to_string(),
                bad.to_string(),
            ));
        }

        let design = design_matrix(x, self.fit_intercept);
        let xt = design.transpose();
        let p = design.ncols();
        let yv = DVector::from_column_slice(y);
        let mut beta = DVector::zeros(p);

        for _ in 0..self.max_iterations {
            let scores = &design * &beta;
            let probs = scores.map(sigmoid);

            // Gradient of the penalized log likelihood.
            let mut gradient = &xt * (&yv - &probs);
            for j in 0..x.cols {
                gradient[j] -= self.alpha * beta[j];
            }

            // Hessian: X^T W X + alpha I, with W floored to stay invertible
            // once probabilities saturate.
            let weighted = DMatrix::from_fn(design.nrows(), p, |i, j| {
                let w = (probs[i] * (1.0 - probs[i])).max(1e-6);
                design[(i, j)] * w
            });
            let mut hessian = &xt * &weighted;
            for j in 0..x.cols {
                hessian[(j, j)] += self.alpha;
            }

            let step = Cholesky::new(hessian)
                .ok_or_else(|| {
                    ReinaError::SingularSystem("logistic Hessian is singular, increase alpha".to_string())
                })?
                .solve(&gradient);
            beta += &step;

            if !beta.iter().all(|v| v.is_finite()) {
                return Err(ReinaError::SingularSystem(
                    "logistic regression diverged, increase alpha".to_string(),
                ));
            }
            if step.amax() < self.tolerance {
                break;
            }
        }

        self.coefficients = beta.as_slice()[..x.cols].to_vec();
        self.intercept = if self.fit_intercept { beta[x.cols] } else { 0.0 };
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Vec<f64> {
        let mut scores = vec![self.intercept; x.rows];
        for (j, coefficient) in self.coefficients.iter().enumerate() {
            for (score, value) in scores.iter_mut().zip(x.get_col(j)) {
                *score += coefficient * value;
            }
        }
        scores.iter().map(|s| sigmoid(*s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Estimator;

    #[test]
    fn test_linear_regression_exact_recovery() {
        // y = 1.5 + 2x, no penalty, so the solution is exact.
        let n = 50;
        let x_data: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let y: Vec<f64> = x_data.iter().map(|x| 1.5 + 2.0 * x).collect();
        let matrix = Matrix::new(&x_data, n, 1);

        let mut model = LinearRegression::default().set_alpha(0.0);
        model.fit(&matrix, &y).expect("Fit failed");

        assert!((model.coefficients()[0] - 2.0).abs() < 1e-8);
        assert!((model.intercept() - 1.5).abs() < 1e-8);

        let preds = model.predict(&matrix);
        for (pred, actual) in preds.iter().zip(&y) {
            assert!((pred - actual).abs() < 1e-8);
        }
    }

    #[test]
    fn test_linear_regression_singular_without_penalty() {
        // A zero-variance column makes the normal equations singular.
        let mut data = vec![1.0, 2.0, 3.0, 4.0];
        data.extend_from_slice(&[0.0, 0.0, 0.0, 0.0]);
        let matrix = Matrix::new(&data, 4, 2);
        let y = vec![1.0, 2.0, 3.0, 4.0];

        let mut model = LinearRegression::default().set_alpha(0.0).set_fit_intercept(false);
        assert!(matches!(
            model.fit(&matrix, &y),
            Err(ReinaError::SingularSystem(_))
        ));

        // A positive penalty makes the same system solvable.
        let mut model = LinearRegression::default().set_alpha(1.0).set_fit_intercept(false);
        model.fit(&matrix, &y).expect("Fit failed");
        assert!(model.coefficients().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_linear_regression_rejects_negative_alpha() {
        let data = vec![1.0, 2.0];
        let matrix = Matrix::new(&data, 2, 1);
        let mut model = LinearRegression::default().set_alpha(-1.0);
        assert!(matches!(
            model.fit(&matrix, &[0.0, 1.0]),
            Err(ReinaError::InvalidParameter(_, _, _))
        ));
    }

    #[test]
    fn test_logistic_regression_orders_probabilities() {
        let n = 40;
        let x_data: Vec<f64> = (0..n).map(|i| i as f64 - n as f64 / 2.0).collect();
        let y: Vec<f64> = x_data.iter().map(|x| if *x > 0.0 { 1.0 } else { 0.0 }).collect();
        let matrix = Matrix::new(&x_data, n, 1);

        let mut model = LogisticRegression::default();
        model.fit(&matrix, &y).expect("Fit failed");

        let probs = model.predict(&matrix);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(probs[0] < 0.1);
        assert!(probs[n - 1] > 0.9);
        for pair in probs.windows(2) {
            assert!(pair[0] <= pair[1] + 1e-12);
        }
    }

    #[test]
    fn test_logistic_regression_rejects_non_binary_labels() {
        let data = vec![1.0, 2.0, 3.0];
        let matrix = Matrix::new(&data, 3, 1);
        let mut model = LogisticRegression::default();
        assert!(matches!(
            model.fit(&matrix, &[0.0, 1.0, 2.0]),
            Err(ReinaError::InvalidParameter(_, _, _))
        ));
    }
}
