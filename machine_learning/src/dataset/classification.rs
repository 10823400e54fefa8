use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// A single labelled observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSample {
    label: u32,
    features: Vec<f64>,
}

impl ClassificationSample {
    pub fn label(&self) -> u32 {
        self.label
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }
}

/// Labelled feature vectors of a fixed width.
///
/// The label `0` is reserved for the null class and is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationData {
    num_dimensions: usize,
    samples: Vec<ClassificationSample>,
}

impl ClassificationData {
    /// Creates an empty dataset expecting `num_dimensions` features per sample.
    pub fn new(num_dimensions: usize) -> Self {
        Self {
            num_dimensions,
            samples: Vec::new(),
        }
    }

    pub fn num_dimensions(&self) -> usize {
        self.num_dimensions
    }

    /// Changes the expected feature width.
    ///
    /// Samples of the previous width can't coexist with the new one, so changing
    /// the width of a non empty dataset discards its samples.
    ///
    /// # Errors
    /// `MlErr::InvalidParam` if `num_dimensions` is zero.
    pub fn set_num_dimensions(&mut self, num_dimensions: usize) -> Result<()> {
        if num_dimensions == 0 {
            return Err(MlErr::InvalidParam {
                name: "num_dimensions",
                hint: "should be greater than 0",
            });
        }

        if num_dimensions != self.num_dimensions {
            self.samples.clear();
            self.num_dimensions = num_dimensions;
        }

        Ok(())
    }

    /// Appends a sample.
    ///
    /// # Errors
    /// * `MlErr::InvalidLabel` if `label` is the null class.
    /// * `MlErr::SizeMismatch` if `features` doesn't have the dataset's width.
    pub fn add_sample(&mut self, label: u32, features: Vec<f64>) -> Result<()> {
        if label == 0 {
            return Err(MlErr::InvalidLabel(label));
        }

        if features.len() != self.num_dimensions {
            return Err(MlErr::SizeMismatch {
                what: "features",
                got: features.len(),
                expected: self.num_dimensions,
            });
        }

        self.samples.push(ClassificationSample { label, features });
        Ok(())
    }

    pub fn samples(&self) -> &[ClassificationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Removes every sample, keeping the width.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Returns the distinct class labels present, in ascending order.
    pub fn class_labels(&self) -> Vec<u32> {
        self.samples
            .iter()
            .map(|sample| sample.label)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn num_classes(&self) -> usize {
        self.class_labels().len()
    }

    /// Checks the invariants a deserialized dataset might not hold.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.num_dimensions == 0 {
            return Err(MlErr::InvalidParam {
                name: "num_dimensions",
                hint: "should be greater than 0",
            });
        }

        for sample in &self.samples {
            if sample.label == 0 {
                return Err(MlErr::InvalidLabel(0));
            }

            if sample.features.len() != self.num_dimensions {
                return Err(MlErr::SizeMismatch {
                    what: "features",
                    got: sample.features.len(),
                    expected: self.num_dimensions,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_null_label_and_wrong_width() {
        let mut data = ClassificationData::new(2);

        assert!(matches!(
            data.add_sample(0, vec![1.0, 2.0]),
            Err(MlErr::InvalidLabel(0))
        ));
        assert!(matches!(
            data.add_sample(1, vec![1.0]),
            Err(MlErr::SizeMismatch { got: 1, expected: 2, .. })
        ));
        assert!(data.is_empty());
    }

    #[test]
    fn class_labels_are_sorted_and_unique() {
        let mut data = ClassificationData::new(1);
        for label in [3, 1, 3, 2, 1] {
            data.add_sample(label, vec![label as f64]).unwrap();
        }

        assert_eq!(data.class_labels(), vec![1, 2, 3]);
        assert_eq!(data.num_classes(), 3);
        assert_eq!(data.len(), 5);
    }

    #[test]
    fn changing_width_discards_samples() {
        let mut data = ClassificationData::new(2);
        data.add_sample(1, vec![0.0, 1.0]).unwrap();

        data.set_num_dimensions(2).unwrap();
        assert_eq!(data.len(), 1);

        data.set_num_dimensions(3).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.num_dimensions(), 3);
        assert!(data.set_num_dimensions(0).is_err());
    }
}
