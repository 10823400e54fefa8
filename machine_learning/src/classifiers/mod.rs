mod gmm;
mod min_dist;

pub use gmm::{Gmm, GmmParams};
pub use min_dist::{MinDist, MinDistParams};

use crate::{MlErr, Result};

/// Settings shared by every classifier: null rejection and input scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierParams {
    null_rejection: bool,
    null_rejection_coeff: f64,
    scaling: bool,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            null_rejection: false,
            null_rejection_coeff: 0.9,
            scaling: true,
        }
    }
}

impl ClassifierParams {
    pub fn null_rejection(&self) -> bool {
        self.null_rejection
    }

    pub fn set_null_rejection(&mut self, enabled: bool) {
        self.null_rejection = enabled;
    }

    pub fn null_rejection_coeff(&self) -> f64 {
        self.null_rejection_coeff
    }

    pub fn set_null_rejection_coeff(&mut self, coeff: f64) -> Result<()> {
        if !(coeff.is_finite() && coeff > 0.0) {
            return Err(MlErr::InvalidParam {
                name: "null_rejection_coeff",
                hint: "should be greater than 0",
            });
        }

        self.null_rejection_coeff = coeff;
        Ok(())
    }

    pub fn scaling(&self) -> bool {
        self.scaling
    }

    pub fn set_scaling(&mut self, enabled: bool) {
        self.scaling = enabled;
    }
}

/// The outcome of the last successful classification.
///
/// `label` is `0` when the prediction was null rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassPrediction {
    pub label: u32,
    pub likelihoods: Vec<f64>,
}

/// Mean and standard deviation of `values`, `(0, 0)` when empty.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Rescales non negative `values` so they add up to one, falling back to a
/// uniform distribution when they carry no mass.
pub(crate) fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();

    if sum.is_finite() && sum > 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    } else if !values.is_empty() {
        let uniform = 1.0 / values.len() as f64;
        values.iter_mut().for_each(|v| *v = uniform);
    }
}

/// Turns log scores into probabilities without overflowing.
pub(crate) fn softmax(log_scores: &[f64]) -> Vec<f64> {
    let max = log_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut probs: Vec<f64> = log_scores.iter().map(|s| (s - max).exp()).collect();
    normalize(&mut probs);
    probs
}

pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_falls_back_to_uniform() {
        let mut values = [0.0, 0.0, 0.0, 0.0];
        normalize(&mut values);
        assert_eq!(values, [0.25; 4]);

        let mut values = [1.0, 3.0];
        normalize(&mut values);
        assert_eq!(values, [0.25, 0.75]);
    }

    #[test]
    fn softmax_handles_very_negative_scores() {
        let probs = softmax(&[-1000.0, -1000.0 + 2.0_f64.ln()]);
        assert!((probs[0] - 1.0 / 3.0).abs() < 1e-9);
        assert!((probs[1] - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn rejection_coeff_must_be_positive() {
        let mut params = ClassifierParams::default();
        assert!(params.set_null_rejection_coeff(0.0).is_err());
        assert!(params.set_null_rejection_coeff(f64::NAN).is_err());
        params.set_null_rejection_coeff(2.0).unwrap();
        assert_eq!(params.null_rejection_coeff(), 2.0);
    }

    #[test]
    fn mean_std_of_constant_values() {
        assert_eq!(mean_std(&[2.0, 2.0]), (2.0, 0.0));
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
    }
}
