use std::{error::Error, fmt};

use machine_learning::MlErr;

use crate::mode::Mode;

/// The adapter's result type.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Which persistence operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    Save,
    Load,
}

/// Every failure a session or the message protocol can report.
///
/// None of them is fatal: the operation that failed had no effect and the
/// session stays usable.
#[derive(Debug)]
pub enum AdapterError {
    InvalidMode(i64),
    InvalidDimension {
        what: &'static str,
        got: i64,
    },
    ModeConflict(&'static str),
    InsufficientInput {
        got: usize,
        expected_at_least: usize,
    },
    InvalidLabel(f64),
    NoTrainingData,
    TrainingFailed(MlErr),
    ModeMismatch {
        expected: Mode,
        got: Option<Mode>,
    },
    ModelNotTrained,
    DimensionMismatch {
        got: usize,
        expected: usize,
    },
    InferenceFailed(MlErr),
    InternalConsistency {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    EmptyPath,
    PersistenceFailed {
        op: PersistOp,
        path: String,
        source: MlErr,
    },
    UnknownAttribute(String),
    UnknownMethod(String),
    InvalidArgument {
        selector: String,
        reason: &'static str,
    },
    InvalidParameter {
        name: &'static str,
        hint: &'static str,
    },
    NotImplemented(&'static str),
    InvalidConfig(String),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::InvalidMode(_) => {
                write!(f, "mode must be between 0 and {}", Mode::MAX)
            }
            AdapterError::InvalidDimension { what, got } => {
                write!(f, "number of {what} must be greater than zero, got {got}")
            }
            AdapterError::ModeConflict(reason) => write!(f, "{reason}"),
            AdapterError::InsufficientInput {
                got,
                expected_at_least,
            } => write!(
                f,
                "invalid input length, expected at least {expected_at_least} values, got {got}"
            ),
            AdapterError::InvalidLabel(value) => {
                if *value == 0.0 {
                    write!(f, "class label must be non-zero")
                } else if value.fract() != 0.0 || !value.is_finite() {
                    write!(f, "class label must be an integer, got {value}")
                } else {
                    write!(f, "class label must be a positive integer, got {value}")
                }
            }
            AdapterError::NoTrainingData => {
                write!(f, "no observations added, use 'add' to add training data")
            }
            AdapterError::TrainingFailed(e) => write!(f, "training failed: {e}"),
            AdapterError::ModeMismatch { expected, got } => match got {
                Some(got) => write!(
                    f,
                    "mode mismatch, expected {expected} and the model trained for {got}"
                ),
                None => write!(
                    f,
                    "mode mismatch, expected {expected} and the model has no active mode"
                ),
            },
            AdapterError::ModelNotTrained => {
                write!(f, "model has not been trained, use 'train' to train the model")
            }
            AdapterError::DimensionMismatch { got, expected } => {
                write!(f, "invalid input length, expected {expected}, got {got}")
            }
            AdapterError::InferenceFailed(e) => write!(f, "unable to classify input: {e}"),
            AdapterError::InternalConsistency {
                what,
                got,
                expected,
            } => write!(f, "{what} size mismatch, got {got} and expected {expected}"),
            AdapterError::EmptyPath => write!(f, "path string is empty"),
            AdapterError::PersistenceFailed { op, path, .. } => match op {
                PersistOp::Save => write!(f, "unable to save training data to path: {path}"),
                PersistOp::Load => write!(f, "unable to load training data from path: {path}"),
            },
            AdapterError::UnknownAttribute(name) => write!(f, "unknown attribute '{name}'"),
            AdapterError::UnknownMethod(name) => {
                write!(f, "unknown method '{name}', send 'help' for a list of methods")
            }
            AdapterError::InvalidArgument { selector, reason } => {
                write!(f, "invalid argument for '{selector}': {reason}")
            }
            AdapterError::InvalidParameter { name, hint } => {
                write!(f, "unable to set {name}, hint: {hint}")
            }
            AdapterError::NotImplemented(name) => write!(f, "{name}: function not implemented"),
            AdapterError::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl Error for AdapterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AdapterError::TrainingFailed(e) => Some(e),
            AdapterError::InferenceFailed(e) => Some(e),
            AdapterError::PersistenceFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Maps a rejected hyper-parameter into the adapter's vocabulary.
impl From<MlErr> for AdapterError {
    fn from(value: MlErr) -> Self {
        match value {
            MlErr::InvalidParam { name, hint } => AdapterError::InvalidParameter { name, hint },
            other => AdapterError::TrainingFailed(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn label_messages_name_the_problem() {
        assert_eq!(
            AdapterError::InvalidLabel(0.0).to_string(),
            "class label must be non-zero"
        );
        assert_eq!(
            AdapterError::InvalidLabel(1.5).to_string(),
            "class label must be an integer, got 1.5"
        );
        assert_eq!(
            AdapterError::InvalidLabel(-2.0).to_string(),
            "class label must be a positive integer, got -2"
        );
    }

    #[test]
    fn persistence_failures_chain_their_cause() {
        let err = AdapterError::PersistenceFailed {
            op: PersistOp::Load,
            path: "/nowhere".to_string(),
            source: MlErr::Io(io::Error::from(io::ErrorKind::NotFound)),
        };

        assert_eq!(err.to_string(), "unable to load training data from path: /nowhere");
        assert!(err.source().is_some());
    }

    #[test]
    fn rejected_parameters_keep_their_hint() {
        let err: AdapterError = MlErr::InvalidParam {
            name: "momentum",
            hint: "should be between 0-1",
        }
        .into();

        assert_eq!(err.to_string(), "unable to set momentum, hint: should be between 0-1");
    }
}
