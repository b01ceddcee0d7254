//! T-learner (Two Learners).
//!
//! Fits one outcome model on the control rows and one on the treated rows,
//! over covariates only, then estimates CATE(x) = mu1(x) - mu0(x).
use crate::data::{Dataset, Matrix};
use crate::errors::ReinaError;
use crate::learners::{fit_context, split_arms, subset_rows, unknown_treatment, TreatmentEffects};
use crate::model::Estimator;
use hashbrown::HashMap;
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The pair of per-arm outcome models fitted for one treatment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmModels<E> {
    /// Outcome model fit on the control rows.
    pub mu0: E,
    /// Outcome model fit on the treated rows.
    pub mu1: E,
}

/// T-learner heterogeneous treatment effect estimator.
///
/// When multiple treatments are given, each treatment effect is estimated
/// individually with fresh copies of both estimators, and the other
/// treatment columns are left out of the covariates.
///
/// Treatment columns must only contain 0 and 1, and both arms must be
/// non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TLearner<E> {
    estimator_0: E,
    estimator_1: E,
    treatments: Vec<String>,
    covariates: Vec<String>,
    outcome: String,
    models: HashMap<String, ArmModels<E>>,
}

impl<E: Estimator + Clone> TLearner<E> {
    /// Create a T-learner around two prototype estimators, one for the
    /// control arm and one for the treated arm.
    pub fn new(estimator_0: E, estimator_1: E) -> Self {
        TLearner {
            estimator_0,
            estimator_1,
            treatments: Vec::new(),
            covariates: Vec::new(),
            outcome: String::new(),
            models: HashMap::new(),
        }
    }

    /// Fit a pair of outcome models per treatment, one per arm.
    ///
    /// * `data` - Base dataset containing covariate, treatment, and outcome columns.
    /// * `treatments` - Names of the treatment columns.
    /// * `outcome` - Name of the outcome column.
    pub fn fit(&mut self, data: &Dataset, treatments: &[&str], outcome: &str) -> Result<(), ReinaError> {
        let covariates = fit_context(data, treatments, outcome)?;
        let y = data.column(outcome)?;
        let rows = data.rows();
        let cols = covariates.len();

        let mut models = HashMap::new();
        for &treatment in treatments {
            let w = data.column(treatment)?;
            let (control, treated) = split_arms(treatment, w)?;

            let base = data.assemble(&covariates)?;
            let (x0, y0) = subset_rows(&base, rows, cols, &control, y);
            let (x1, y1) = subset_rows(&base, rows, cols, &treated, y);

            info!(
                "fitting T-learner outcome models for treatment {treatment}: {} control rows, {} treated rows",
                control.len(),
                treated.len()
            );
            let mut mu0 = self.estimator_0.clone();
            mu0.fit(&Matrix::new(&x0, control.len(), cols), &y0)?;
            let mut mu1 = self.estimator_1.clone();
            mu1.fit(&Matrix::new(&x1, treated.len(), cols), &y1)?;
            models.insert(treatment.to_string(), ArmModels { mu0, mu1 });
        }

        self.models = models;
        self.treatments = treatments.iter().map(|t| t.to_string()).collect();
        self.covariates = covariates;
        self.outcome = outcome.to_string();
        Ok(())
    }

    /// Estimate the treatment effects over `data`.
    ///
    /// Both arm models are predicted over the covariates of `data`, and the
    /// effect is the difference of the predictions.
    pub fn effects(&self, data: &Dataset, treatment: &str) -> Result<TreatmentEffects, ReinaError> {
        let arms = self.models_for(treatment)?;
        let rows = data.rows();
        if rows == 0 {
            return Err(ReinaError::EmptyData("no rows to score".to_string()));
        }
        let base = data.assemble(&self.covariates)?;
        let matrix = Matrix::new(&base, rows, self.covariates.len());

        let mu1 = arms.mu1.predict(&matrix);
        let mu0 = arms.mu0.predict(&matrix);
        let cate = mu1.iter().zip(&mu0).map(|(m1, m0)| m1 - m0).collect();
        Ok(TreatmentEffects::from_cate(cate))
    }

    /// The fitted pair of arm models for a treatment.
    pub fn models_for(&self, treatment: &str) -> Result<&ArmModels<E>, ReinaError> {
        if self.models.is_empty() {
            return Err(ReinaError::NotFitted);
        }
        self.models
            .get(treatment)
            .ok_or_else(|| unknown_treatment(treatment, &self.treatments))
    }

    /// Names of the fitted treatments.
    pub fn treatments(&self) -> &[String] {
        &self.treatments
    }

    /// Names of the covariate columns used at fit time.
    pub fn covariates(&self) -> &[String] {
        &self.covariates
    }
}

impl<E: Serialize> TLearner<E> {
    /// Dump the fitted learner as a json object.
    pub fn json_dump(&self) -> Result<String, ReinaError> {
        serde_json::to_string(self).map_err(|e| ReinaError::UnableToWrite(e.to_string()))
    }

    /// Save the fitted learner as a json object to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ReinaError> {
        let model = self.json_dump()?;
        fs::write(path, model).map_err(|e| ReinaError::UnableToWrite(e.to_string()))
    }
}

impl<E: DeserializeOwned> TLearner<E> {
    /// Load a learner from a json string.
    pub fn from_json(json_str: &str) -> Result<Self, ReinaError> {
        serde_json::from_str(json_str).map_err(|e| ReinaError::UnableToRead(e.to_string()))
    }

    /// Load a learner from a path to a json object.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReinaError> {
        let json_str = fs::read_to_string(path).map_err(|e| ReinaError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}
