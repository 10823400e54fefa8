mod classification;
mod file;
mod regression;

pub use classification::{ClassificationData, ClassificationSample};
pub use regression::{RegressionData, RegressionSample};

/// A borrowed view over either of the two dataset representations.
#[derive(Debug, Clone, Copy)]
pub enum DatasetRef<'a> {
    Classification(&'a ClassificationData),
    Regression(&'a RegressionData),
}

impl DatasetRef<'_> {
    /// Returns the amount of samples in the underlying dataset.
    pub fn len(&self) -> usize {
        match self {
            DatasetRef::Classification(data) => data.len(),
            DatasetRef::Regression(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human readable name of the representation.
    pub fn kind(&self) -> &'static str {
        match self {
            DatasetRef::Classification(_) => "classification",
            DatasetRef::Regression(_) => "regression",
        }
    }
}
