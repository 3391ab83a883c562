//! Error types for runpredict operations.
//!
//! Every fallible operation in the crate returns [`Result`], whose error
//! variants map one-to-one onto the failure kinds a calling service needs to
//! tell apart (not enough data, schema mismatch, training failure, ...).

use std::fmt;

/// Main error type for runpredict operations.
///
/// # Examples
///
/// ```
/// use runpredict::error::RunpredictError;
///
/// let err = RunpredictError::UnknownModel {
///     name: "M5".to_string(),
/// };
/// assert!(err.to_string().contains("M5"));
/// ```
#[derive(Debug)]
pub enum RunpredictError {
    /// Too few rows or columns to compute meta-features or fit a model.
    InsufficientData {
        /// What was required
        required: String,
        /// What was found
        found: String,
    },

    /// Row arity or value type does not match the declared schema.
    SchemaMismatch {
        /// Expected shape or type
        expected: String,
        /// Actual shape or value found
        actual: String,
    },

    /// The underlying model fit failed (singular matrix, non-convergence, ...).
    Training {
        /// Model that failed
        model: String,
        /// Underlying failure
        reason: String,
    },

    /// Model invoked before training, or with a feature vector of the wrong arity.
    Prediction {
        /// Failure description
        message: String,
    },

    /// A model name that the registry does not know.
    UnknownModel {
        /// The unknown name
        name: String,
    },

    /// Degenerate statistic (zero mean, zero variance, zero actual value).
    DivisionByZero {
        /// Which quantity was undefined
        quantity: String,
    },

    /// Invalid configuration or hyperparameter value.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Malformed tabular input.
    Format {
        /// Error description
        message: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),
}

impl RunpredictError {
    /// Convenience constructor for training failures.
    pub fn training(model: impl Into<String>, reason: impl fmt::Display) -> Self {
        RunpredictError::Training {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    /// Convenience constructor for prediction failures.
    pub fn prediction(message: impl Into<String>) -> Self {
        RunpredictError::Prediction {
            message: message.into(),
        }
    }

    /// Convenience constructor for arity mismatches.
    #[must_use]
    pub fn arity_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        RunpredictError::SchemaMismatch {
            expected: format!("{context}: {expected} values"),
            actual: format!("{actual} values"),
        }
    }

    /// Convenience constructor for insufficient data.
    pub fn insufficient(required: impl Into<String>, found: impl Into<String>) -> Self {
        RunpredictError::InsufficientData {
            required: required.into(),
            found: found.into(),
        }
    }

    /// Convenience constructor for degenerate statistics.
    pub fn division_by_zero(quantity: impl Into<String>) -> Self {
        RunpredictError::DivisionByZero {
            quantity: quantity.into(),
        }
    }

    /// Returns true for [`RunpredictError::DivisionByZero`].
    #[must_use]
    pub fn is_division_by_zero(&self) -> bool {
        matches!(self, RunpredictError::DivisionByZero { .. })
    }
}

impl fmt::Display for RunpredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunpredictError::InsufficientData { required, found } => {
                write!(f, "Insufficient data: need {required}, found {found}")
            }
            RunpredictError::SchemaMismatch { expected, actual } => {
                write!(f, "Schema mismatch: expected {expected}, got {actual}")
            }
            RunpredictError::Training { model, reason } => {
                write!(f, "Training of {model} failed: {reason}")
            }
            RunpredictError::Prediction { message } => write!(f, "Prediction failed: {message}"),
            RunpredictError::UnknownModel { name } => {
                write!(f, "Unknown model: {name} is not in the registry")
            }
            RunpredictError::DivisionByZero { quantity } => {
                write!(f, "Division by zero: {quantity} is undefined")
            }
            RunpredictError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            RunpredictError::Format { message } => write!(f, "Invalid tabular input: {message}"),
            RunpredictError::Io(e) => write!(f, "I/O error: {e}"),
            RunpredictError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for RunpredictError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunpredictError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RunpredictError {
    fn from(err: std::io::Error) -> Self {
        RunpredictError::Io(err)
    }
}

impl From<serde_json::Error> for RunpredictError {
    fn from(err: serde_json::Error) -> Self {
        RunpredictError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for RunpredictError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => RunpredictError::Io(io),
                other => RunpredictError::Format {
                    message: format!("{other:?}"),
                },
            }
        } else {
            RunpredictError::Format {
                message: err.to_string(),
            }
        }
    }
}

/// Convenience type alias for Results in runpredict.
pub type Result<T> = std::result::Result<T, RunpredictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_display() {
        let err = RunpredictError::insufficient("at least 2 rows", "1 row");
        let msg = err.to_string();
        assert!(msg.contains("Insufficient data"));
        assert!(msg.contains("at least 2 rows"));
    }

    #[test]
    fn test_arity_mismatch_display() {
        let err = RunpredictError::arity_mismatch("observation", 4, 3);
        assert_eq!(
            err.to_string(),
            "Schema mismatch: expected observation: 4 values, got 3 values"
        );
    }

    #[test]
    fn test_training_display_names_model() {
        let err = RunpredictError::training("LinReg", "matrix is singular");
        assert!(err.to_string().contains("LinReg"));
        assert!(err.to_string().contains("singular"));
    }

    #[test]
    fn test_division_by_zero_predicate() {
        assert!(RunpredictError::division_by_zero("label mean").is_division_by_zero());
        assert!(!RunpredictError::prediction("untrained").is_division_by_zero());
    }

    #[test]
    fn test_io_source_is_preserved() {
        use std::error::Error;
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = RunpredictError::from(io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err = RunpredictError::from(parse.expect_err("invalid json"));
        assert!(matches!(err, RunpredictError::Serialization(_)));
    }
}
