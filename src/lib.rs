// Modules
pub mod data;
pub mod errors;
pub mod learners;
pub mod metrics;
pub mod model;
pub mod utils;

// Individual classes, and functions
pub use data::{Dataset, Matrix};
pub use learners::{SLearner, TLearner, TreatmentEffects};
pub use model::{Estimator, Model};
