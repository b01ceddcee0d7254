//! Errors
//!
//! Custom error types used throughout the `reina` crate.
use thiserror::Error;

/// Errors that can occur while loading data, fitting estimators,
/// or computing treatment effects.
#[derive(Debug, Error)]
pub enum ReinaError {
    /// Unable to read a dataset or model from a file.
    #[error("Unable to read from file: {0}")]
    UnableToRead(String),
    /// Unable to write a model to a file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// A referenced column is not present in the dataset.
    #[error("Column {0} not found in the dataset.")]
    ColumnNotFound(String),
    /// Two columns share the same name.
    #[error("Duplicate column name {0} in the dataset.")]
    DuplicateColumn(String),
    /// Columns of differing lengths were passed to a dataset constructor.
    #[error("Column {0} has {1} rows, expected {2}.")]
    RaggedColumns(String, usize, usize),
    /// A dataset with no rows or no usable feature columns.
    #[error("The dataset is empty: {0}")]
    EmptyData(String),
    /// A treatment column holding values other than 0 and 1.
    #[error("Treatment column {0} must only contain 0 and 1, found {1}.")]
    NonBinaryTreatment(String, f64),
    /// One of the treatment arms holds no observations.
    #[error("Treatment {0} has no observations with value {1}.")]
    EmptyTreatmentArm(String, u8),
    /// Effects were requested for a treatment the learner was not fit on.
    #[error("Treatment {0} was not fitted, available treatments are: {1}")]
    UnknownTreatment(String, String),
    /// Effects were requested before the learner was fit.
    #[error("The learner must be fit before effects can be estimated.")]
    NotFitted,
    /// The normal equations could not be solved.
    #[error("Unable to solve the linear system: {0}")]
    SingularSystem(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
}
