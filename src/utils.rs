use crate::errors::ReinaError;

/// Create a string of all available items.
pub fn items_to_strings(items: &[&str]) -> String {
    items.join(", ")
}

/// Arithmetic mean of a slice. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Validate that a float parameter lies within `[min, max]`.
pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), ReinaError> {
    if value.is_nan() || value < min || max < value {
        let expected = format!("real value within range {} and {}", min, max);
        Err(ReinaError::InvalidParameter(
            parameter.to_string(),
            expected,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Logistic function.
#[inline]
pub fn sigmoid(value: f64) -> f64 {
    1.0 / (1.0 + (-value).exp())
}
