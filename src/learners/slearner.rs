//! S-learner (Single Learner).
//!
//! Fits one outcome model per treatment over `covariates + [treatment]`,
//! then estimates CATE(x) = mu(x, 1) - mu(x, 0) from two counterfactual
//! prediction passes.
use crate::data::{Dataset, Matrix};
use crate::errors::ReinaError;
use crate::learners::{fit_context, split_arms, unknown_treatment, TreatmentEffects};
use crate::model::Estimator;
use hashbrown::HashMap;
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// S-learner heterogeneous treatment effect estimator.
///
/// When multiple treatments are given, each treatment effect is estimated
/// individually with its own copy of the estimator, and the other treatment
/// columns are left out of the covariates.
///
/// Treatment columns must only contain 0 and 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SLearner<E> {
    estimator: E,
    treatments: Vec<String>,
    covariates: Vec<String>,
    outcome: String,
    models: HashMap<String, E>,
}

impl<E: Estimator + Clone> SLearner<E> {
    /// Create an S-learner around a prototype estimator. The estimator is
    /// cloned once per fitted treatment.
    pub fn new(estimator: E) -> Self {
        SLearner {
            estimator,
            treatments: Vec::new(),
            covariates: Vec::new(),
            outcome: String::new(),
            models: HashMap::new(),
        }
    }

    /// Fit one outcome model per treatment.
    ///
    /// * `data` - Base dataset containing covariate, treatment, and outcome columns.
    /// * `treatments` - Names of the treatment columns.
    /// * `outcome` - Name of the outcome column.
    pub fn fit(&mut self, data: &Dataset, treatments: &[&str], outcome: &str) -> Result<(), ReinaError> {
        let covariates = fit_context(data, treatments, outcome)?;
        let y = data.column(outcome)?;
        let rows = data.rows();

        let mut models = HashMap::new();
        for &treatment in treatments {
            let w = data.column(treatment)?;
            split_arms(treatment, w)?;

            let mut features = data.assemble(&covariates)?;
            features.extend_from_slice(w);
            let matrix = Matrix::new(&features, rows, covariates.len() + 1);

            info!("fitting S-learner outcome model for treatment {treatment}");
            let mut model = self.estimator.clone();
            model.fit(&matrix, y)?;
            models.insert(treatment.to_string(), model);
        }

        self.models = models;
        self.treatments = treatments.iter().map(|t| t.to_string()).collect();
        self.covariates = covariates;
        self.outcome = outcome.to_string();
        Ok(())
    }

    /// Estimate the treatment effects over `data`.
    ///
    /// The effect is the difference between the predicted counterfactual
    /// outcomes with the treatment column forced to 1 and to 0; the
    /// treatment column itself does not need to be present in `data`.
    pub fn effects(&self, data: &Dataset, treatment: &str) -> Result<TreatmentEffects, ReinaError> {
        let model = self.model(treatment)?;
        let rows = data.rows();
        if rows == 0 {
            return Err(ReinaError::EmptyData("no rows to score".to_string()));
        }
        let base = data.assemble(&self.covariates)?;
        let cols = self.covariates.len() + 1;

        let mut treated = Vec::with_capacity(base.len() + rows);
        treated.extend_from_slice(&base);
        treated.resize(treated.len() + rows, 1.0);
        let mu1 = model.predict(&Matrix::new(&treated, rows, cols));

        let mut control = base;
        control.resize(control.len() + rows, 0.0);
        let mu0 = model.predict(&Matrix::new(&control, rows, cols));

        let cate = mu1.iter().zip(&mu0).map(|(m1, m0)| m1 - m0).collect();
        Ok(TreatmentEffects::from_cate(cate))
    }

    /// The fitted outcome model for a treatment.
    pub fn model(&self, treatment: &str) -> Result<&E, ReinaError> {
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

impl<E: Serialize> SLearner<E> {
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

impl<E: DeserializeOwned> SLearner<E> {
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
