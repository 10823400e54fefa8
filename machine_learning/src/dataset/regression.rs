use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// A single observation paired with its target vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSample {
    input: Vec<f64>,
    target: Vec<f64>,
}

impl RegressionSample {
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }
}

/// Input/target vector pairs of fixed widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionData {
    num_input_dimensions: usize,
    num_target_dimensions: usize,
    samples: Vec<RegressionSample>,
}

impl RegressionData {
    /// Creates an empty dataset with the given input and target widths.
    pub fn new(num_input_dimensions: usize, num_target_dimensions: usize) -> Self {
        Self {
            num_input_dimensions,
            num_target_dimensions,
            samples: Vec::new(),
        }
    }

    pub fn num_input_dimensions(&self) -> usize {
        self.num_input_dimensions
    }

    pub fn num_target_dimensions(&self) -> usize {
        self.num_target_dimensions
    }

    /// Changes the expected widths, discarding every sample if any of them changes.
    ///
    /// # Errors
    /// `MlErr::InvalidParam` if either width is zero.
    pub fn set_input_and_target_dimensions(
        &mut self,
        num_input_dimensions: usize,
        num_target_dimensions: usize,
    ) -> Result<()> {
        if num_input_dimensions == 0 || num_target_dimensions == 0 {
            return Err(MlErr::InvalidParam {
                name: "input and target dimensions",
                hint: "should be greater than 0",
            });
        }

        if num_input_dimensions != self.num_input_dimensions
            || num_target_dimensions != self.num_target_dimensions
        {
            self.samples.clear();
            self.num_input_dimensions = num_input_dimensions;
            self.num_target_dimensions = num_target_dimensions;
        }

        Ok(())
    }

    /// Appends a sample.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if either vector doesn't have the dataset's width.
    pub fn add_sample(&mut self, input: Vec<f64>, target: Vec<f64>) -> Result<()> {
        if input.len() != self.num_input_dimensions {
            return Err(MlErr::SizeMismatch {
                what: "input",
                got: input.len(),
                expected: self.num_input_dimensions,
            });
        }

        if target.len() != self.num_target_dimensions {
            return Err(MlErr::SizeMismatch {
                what: "target",
                got: target.len(),
                expected: self.num_target_dimensions,
            });
        }

        self.samples.push(RegressionSample { input, target });
        Ok(())
    }

    pub fn samples(&self) -> &[RegressionSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.num_input_dimensions == 0 || self.num_target_dimensions == 0 {
            return Err(MlErr::InvalidParam {
                name: "input and target dimensions",
                hint: "should be greater than 0",
            });
        }

        for sample in &self.samples {
            if sample.input.len() != self.num_input_dimensions {
                return Err(MlErr::SizeMismatch {
                    what: "input",
                    got: sample.input.len(),
                    expected: self.num_input_dimensions,
                });
            }

            if sample.target.len() != self.num_target_dimensions {
                return Err(MlErr::SizeMismatch {
                    what: "target",
                    got: sample.target.len(),
                    expected: self.num_target_dimensions,
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
    fn add_checks_both_widths() {
        let mut data = RegressionData::new(2, 1);

        assert!(data.add_sample(vec![1.0], vec![0.0]).is_err());
        assert!(data.add_sample(vec![1.0, 2.0], vec![0.0, 1.0]).is_err());
        data.add_sample(vec![1.0, 2.0], vec![0.5]).unwrap();

        assert_eq!(data.len(), 1);
        assert_eq!(data.samples()[0].input(), &[1.0, 2.0]);
        assert_eq!(data.samples()[0].target(), &[0.5]);
    }

    #[test]
    fn resizing_targets_discards_samples() {
        let mut data = RegressionData::new(1, 1);
        data.add_sample(vec![1.0], vec![2.0]).unwrap();

        data.set_input_and_target_dimensions(1, 2).unwrap();

        assert!(data.is_empty());
        assert_eq!(data.num_target_dimensions(), 2);
        assert!(data.set_input_and_target_dimensions(0, 2).is_err());
    }
}
