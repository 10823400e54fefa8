use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidParam {
        name: &'static str,
        hint: &'static str,
    },
    InvalidLabel(u32),
    EmptyDataset,
    NotInitialized,
    NotTrained,
    Diverged {
        epoch: usize,
    },
    Degenerate(&'static str),
    KindMismatch {
        expected: &'static str,
        got: &'static str,
    },
    Io(io::Error),
    Format(serde_json::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch for {what}, got {got} and expected {expected}"),
            MlErr::InvalidParam { name, hint } => {
                write!(f, "invalid value for {name}, hint: {hint}")
            }
            MlErr::InvalidLabel(label) => {
                write!(f, "class label {label} is reserved for the null class")
            }
            MlErr::EmptyDataset => write!(f, "the dataset has no samples"),
            MlErr::NotInitialized => write!(f, "the model has not been initialized"),
            MlErr::NotTrained => write!(f, "the model has not been trained"),
            MlErr::Diverged { epoch } => {
                write!(f, "training diverged at epoch {epoch}, try a smaller training rate")
            }
            MlErr::Degenerate(what) => write!(f, "degenerate statistics: {what}"),
            MlErr::KindMismatch { expected, got } => {
                write!(f, "expected a {expected} dataset, got a {got} dataset")
            }
            MlErr::Io(e) => write!(f, "io error: {e}"),
            MlErr::Format(e) => write!(f, "malformed dataset file: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            MlErr::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Format(value)
    }
}
