//! Learners
//!
//! Meta-learners for heterogeneous treatment effect estimation. An
//! S-learner fits a single outcome model with the treatment as a feature;
//! a T-learner fits one outcome model per treatment arm. Both derive the
//! conditional average treatment effect from counterfactual predictions.
pub mod slearner;
pub mod tlearner;

mod tests;

pub use slearner::SLearner;
pub use tlearner::TLearner;

use crate::data::Dataset;
use crate::errors::ReinaError;
use crate::utils::{items_to_strings, mean};
use serde::{Deserialize, Serialize};

/// Estimated effects of a single treatment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentEffects {
    /// Conditional average treatment effect, one value per scored row.
    pub cate: Vec<f64>,
    /// Average treatment effect, the mean of `cate`.
    pub ate: f64,
}

impl TreatmentEffects {
    pub(crate) fn from_cate(cate: Vec<f64>) -> Self {
        let ate = mean(&cate);
        TreatmentEffects { cate, ate }
    }
}

/// Validate fit inputs and derive the covariate set: every column that is
/// neither a treatment nor the outcome.
pub(crate) fn fit_context(
    data: &Dataset,
    treatments: &[&str],
    outcome: &str,
) -> Result<Vec<String>, ReinaError> {
    if data.rows() == 0 {
        return Err(ReinaError::EmptyData("the dataset has no rows".to_string()));
    }
    if treatments.is_empty() {
        return Err(ReinaError::InvalidParameter(
            "treatments".to_string(),
            "at least one treatment column".to_string(),
            "none".to_string(),
        ));
    }
    data.column(outcome)?;
    for &treatment in treatments {
        let values = data.column(treatment)?;
        if let Some(bad) = values.iter().find(|v| **v != 0.0 && **v != 1.0) {
            return Err(ReinaError::NonBinaryTreatment(treatment.to_string(), *bad));
        }
    }

    let covariates: Vec<String> = data
        .names()
        .iter()
        .filter(|name| name.as_str() != outcome && !treatments.contains(&name.as_str()))
        .cloned()
        .collect();
    if covariates.is_empty() {
        return Err(ReinaError::EmptyData(
            "no covariate columns remain after removing treatments and outcome".to_string(),
        ));
    }
    Ok(covariates)
}

/// Row indices of the control and treated arms of a treatment indicator.
/// Errors if either arm is empty.
pub(crate) fn split_arms(treatment: &str, values: &[f64]) -> Result<(Vec<usize>, Vec<usize>), ReinaError> {
    let control: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == 0.0)
        .map(|(i, _)| i)
        .collect();
    let treated: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == 1.0)
        .map(|(i, _)| i)
        .collect();
    if control.is_empty() {
        return Err(ReinaError::EmptyTreatmentArm(treatment.to_string(), 0));
    }
    if treated.is_empty() {
        return Err(ReinaError::EmptyTreatmentArm(treatment.to_string(), 1));
    }
    Ok((control, treated))
}

/// Gather the selected rows of a column-major buffer and target into an
/// owned sub-buffer, preserving column-major layout.
pub(crate) fn subset_rows(
    buffer: &[f64],
    rows: usize,
    cols: usize,
    indices: &[usize],
    y: &[f64],
) -> (Vec<f64>, Vec<f64>) {
    let mut sub_x = Vec::with_capacity(indices.len() * cols);
    for col in 0..cols {
        let column = &buffer[col * rows..(col + 1) * rows];
        for &i in indices {
            sub_x.push(column[i]);
        }
    }
    let sub_y = indices.iter().map(|&i| y[i]).collect();
    (sub_x, sub_y)
}

pub(crate) fn unknown_treatment(treatment: &str, fitted: &[String]) -> ReinaError {
    let available: Vec<&str> = fitted.iter().map(String::as_str).collect();
    ReinaError::UnknownTreatment(treatment.to_string(), items_to_strings(&available))
}
