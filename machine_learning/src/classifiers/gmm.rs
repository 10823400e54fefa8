use std::f64::consts::PI;

use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::index};

use super::{ClassPrediction, ClassifierParams, argmax, mean_std, softmax};
use crate::{MlErr, Result, dataset::ClassificationData, scaling::MinMaxScaler};

const MAX_ITERATIONS: usize = 100;
const MIN_CHANGE: f64 = 1.0e-5;
const VARIANCE_FLOOR: f64 = 1.0e-4;

/// Hyper-parameters of the Gaussian mixture classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct GmmParams {
    num_mixture_models: usize,
    classifier: ClassifierParams,
}

impl Default for GmmParams {
    fn default() -> Self {
        Self {
            num_mixture_models: 2,
            classifier: ClassifierParams::default(),
        }
    }
}

impl GmmParams {
    pub fn num_mixture_models(&self) -> usize {
        self.num_mixture_models
    }

    pub fn set_num_mixture_models(&mut self, num_mixture_models: usize) -> Result<()> {
        if num_mixture_models == 0 {
            return Err(MlErr::InvalidParam {
                name: "num_mixture_models",
                hint: "should be greater than 0",
            });
        }

        self.num_mixture_models = num_mixture_models;
        Ok(())
    }

    pub fn classifier(&self) -> &ClassifierParams {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut ClassifierParams {
        &mut self.classifier
    }
}

/// A diagonal covariance Gaussian mixture.
#[derive(Debug, Clone)]
struct Mixture {
    weights: Vec<f64>,
    means: Vec<Vec<f64>>,
    variances: Vec<Vec<f64>>,
}

impl Mixture {
    /// Fits at most `k` components to `rows` by expectation maximization.
    fn fit<R: Rng>(rows: &[Vec<f64>], k: usize, rng: &mut R) -> Self {
        let n = rows.len();
        let k = k.clamp(1, n);
        let (_, spread) = column_stats(rows);
        let width = spread.len();

        let mut mixture = Self {
            weights: vec![1.0 / k as f64; k],
            means: index::sample(rng, n, k)
                .into_iter()
                .map(|i| rows[i].clone())
                .collect(),
            variances: vec![spread; k],
        };

        let mut resp = vec![vec![0.0; k]; n];
        let mut last = f64::NEG_INFINITY;

        for iteration in 0..MAX_ITERATIONS {
            let mut total = 0.0;
            for (row, r) in rows.iter().zip(resp.iter_mut()) {
                let logs = mixture.component_logs(row);
                let lse = log_sum_exp(&logs);
                total += lse;
                for (rj, lj) in r.iter_mut().zip(&logs) {
                    *rj = (lj - lse).exp();
                }
            }

            for j in 0..k {
                let nj: f64 = resp.iter().map(|r| r[j]).sum();
                if nj <= f64::EPSILON {
                    continue;
                }

                let mean: Vec<f64> = (0..width)
                    .map(|d| {
                        rows.iter()
                            .zip(&resp)
                            .map(|(x, r)| r[j] * x[d])
                            .sum::<f64>()
                            / nj
                    })
                    .collect();
                let variance = (0..width)
                    .map(|d| {
                        let var = rows
                            .iter()
                            .zip(&resp)
                            .map(|(x, r)| r[j] * (x[d] - mean[d]).powi(2))
                            .sum::<f64>()
                            / nj;
                        var.max(VARIANCE_FLOOR)
                    })
                    .collect();

                mixture.weights[j] = nj / n as f64;
                mixture.means[j] = mean;
                mixture.variances[j] = variance;
            }

            debug!("gmm em iteration {iteration}: log likelihood {total}");
            if (total - last).abs() < MIN_CHANGE {
                break;
            }
            last = total;
        }

        mixture
    }

    fn component_logs(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(self.means.iter().zip(&self.variances))
            .map(|(w, (mean, var))| w.ln() + log_gaussian(x, mean, var))
            .collect()
    }

    fn log_likelihood(&self, x: &[f64]) -> f64 {
        log_sum_exp(&self.component_logs(x))
    }
}

fn log_gaussian(x: &[f64], mean: &[f64], var: &[f64]) -> f64 {
    x.iter()
        .zip(mean.iter().zip(var))
        .map(|(x, (m, v))| -0.5 * ((2.0 * PI * v).ln() + (x - m).powi(2) / v))
        .sum()
}

fn log_sum_exp(logs: &[f64]) -> f64 {
    let max = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }

    max + logs.iter().map(|l| (l - max).exp()).sum::<f64>().ln()
}

/// Per column mean and floored variance.
fn column_stats(rows: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    let width = rows.first().map_or(0, Vec::len);
    let n = rows.len() as f64;

    let mean: Vec<f64> = (0..width)
        .map(|d| rows.iter().map(|x| x[d]).sum::<f64>() / n)
        .collect();
    let var = (0..width)
        .map(|d| {
            let var = rows.iter().map(|x| (x[d] - mean[d]).powi(2)).sum::<f64>() / n;
            var.max(VARIANCE_FLOOR)
        })
        .collect();

    (mean, var)
}

#[derive(Debug, Clone)]
struct ClassModel {
    label: u32,
    mixture: Mixture,
    // Mean and deviation of the training samples' log likelihoods.
    score: (f64, f64),
}

/// A classifier modelling every class as a Gaussian mixture.
#[derive(Debug, Clone)]
pub struct Gmm {
    params: GmmParams,
    rng: StdRng,
    num_inputs: usize,
    scaler: Option<MinMaxScaler>,
    models: Vec<ClassModel>,
    prediction: ClassPrediction,
}

impl Gmm {
    /// Creates an untrained classifier, seeding its generator when `seed` is given.
    pub fn new(params: GmmParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        Self {
            params,
            rng,
            num_inputs: 0,
            scaler: None,
            models: Vec::new(),
            prediction: ClassPrediction::default(),
        }
    }

    pub fn params(&self) -> &GmmParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut GmmParams {
        &mut self.params
    }

    /// Fits one mixture per class present in `data`.
    ///
    /// # Errors
    /// `MlErr::EmptyDataset` if there's nothing to learn from.
    pub fn train(&mut self, data: &ClassificationData) -> Result<()> {
        if data.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        self.clear();
        let width = data.num_dimensions();
        let scaler = self
            .params
            .classifier
            .scaling()
            .then(|| MinMaxScaler::fit(data.samples().iter().map(|s| s.features()), width));

        let mut models = Vec::new();
        for label in data.class_labels() {
            let rows: Vec<Vec<f64>> = data
                .samples()
                .iter()
                .filter(|s| s.label() == label)
                .map(|s| match &scaler {
                    Some(scaler) => scaler.scale(s.features()),
                    None => s.features().to_vec(),
                })
                .collect();

            let mixture = Mixture::fit(&rows, self.params.num_mixture_models, &mut self.rng);
            let scores: Vec<f64> = rows.iter().map(|x| mixture.log_likelihood(x)).collect();

            models.push(ClassModel {
                label,
                mixture,
                score: mean_std(&scores),
            });
        }

        debug!("gmm trained {} class model(s)", models.len());
        self.num_inputs = width;
        self.scaler = scaler;
        self.models = models;
        Ok(())
    }

    /// Classifies `x`, the result being available through `prediction`.
    ///
    /// # Errors
    /// * `MlErr::NotTrained` before a successful `train`.
    /// * `MlErr::SizeMismatch` if `x` doesn't have the trained width.
    pub fn predict(&mut self, x: &[f64]) -> Result<()> {
        if !self.is_trained() {
            return Err(MlErr::NotTrained);
        }

        if x.len() != self.num_inputs {
            return Err(MlErr::SizeMismatch {
                what: "input",
                got: x.len(),
                expected: self.num_inputs,
            });
        }

        let x = match &self.scaler {
            Some(scaler) => scaler.scale(x),
            None => x.to_vec(),
        };

        let logs: Vec<f64> = self.models.iter().map(|m| m.mixture.log_likelihood(&x)).collect();
        let best = argmax(&logs).ok_or(MlErr::Degenerate("no class models"))?;
        let model = &self.models[best];

        let coeff = self.params.classifier.null_rejection_coeff();
        let threshold = model.score.0 - coeff * model.score.1;
        let rejected = self.params.classifier.null_rejection() && logs[best] < threshold;

        self.prediction = ClassPrediction {
            label: if rejected { 0 } else { model.label },
            likelihoods: softmax(&logs),
        };
        Ok(())
    }

    pub fn prediction(&self) -> &ClassPrediction {
        &self.prediction
    }

    pub fn is_trained(&self) -> bool {
        !self.models.is_empty()
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_classes(&self) -> usize {
        self.models.len()
    }

    pub fn class_labels(&self) -> Vec<u32> {
        self.models.iter().map(|m| m.label).collect()
    }

    /// Forgets everything learnt, keeping the parameters.
    pub fn clear(&mut self) {
        self.num_inputs = 0;
        self.scaler = None;
        self.models.clear();
        self.prediction = ClassPrediction::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> ClassificationData {
        let mut data = ClassificationData::new(2);
        for i in 0..10 {
            let jitter = i as f64 * 0.01;
            data.add_sample(1, vec![0.1 + jitter, 0.2 - jitter]).unwrap();
            data.add_sample(2, vec![0.9 - jitter, 0.8 + jitter]).unwrap();
        }
        data
    }

    #[test]
    fn separates_two_blobs() {
        let mut gmm = Gmm::new(GmmParams::default(), Some(7));
        gmm.train(&two_blobs()).unwrap();

        gmm.predict(&[0.12, 0.18]).unwrap();
        assert_eq!(gmm.prediction().label, 1);

        gmm.predict(&[0.88, 0.82]).unwrap();
        assert_eq!(gmm.prediction().label, 2);

        let sum: f64 = gmm.prediction().likelihoods.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(gmm.class_labels(), vec![1, 2]);
    }

    #[test]
    fn rejects_far_away_inputs_when_enabled() {
        let mut gmm = Gmm::new(GmmParams::default(), Some(7));
        gmm.params_mut().classifier_mut().set_null_rejection(true);
        gmm.train(&two_blobs()).unwrap();

        gmm.predict(&[50.0, -50.0]).unwrap();
        assert_eq!(gmm.prediction().label, 0);
    }

    #[test]
    fn predict_checks_state_and_width() {
        let mut gmm = Gmm::new(GmmParams::default(), Some(7));
        assert!(matches!(gmm.predict(&[0.0, 0.0]), Err(MlErr::NotTrained)));

        gmm.train(&two_blobs()).unwrap();
        assert!(matches!(
            gmm.predict(&[0.0]),
            Err(MlErr::SizeMismatch { got: 1, expected: 2, .. })
        ));
    }

    #[test]
    fn single_sample_classes_still_train() {
        let mut data = ClassificationData::new(2);
        data.add_sample(1, vec![0.1, 0.2]).unwrap();
        data.add_sample(2, vec![0.9, 0.8]).unwrap();

        let mut gmm = Gmm::new(GmmParams::default(), Some(1));
        gmm.train(&data).unwrap();
        gmm.predict(&[0.15, 0.25]).unwrap();

        assert_eq!(gmm.prediction().label, 1);
        assert_eq!(gmm.num_classes(), 2);
    }

    #[test]
    fn mixture_components_keep_the_row_width() {
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|i| vec![i as f64 * 0.1, 1.0 - i as f64 * 0.1, 0.5])
            .collect();
        let mut rng = StdRng::seed_from_u64(3);

        let mixture = Mixture::fit(&rows, 3, &mut rng);

        assert_eq!(mixture.means.len(), 3);
        assert!(mixture.means.iter().all(|m| m.len() == 3));
        assert!(mixture.variances.iter().flatten().all(|v| *v >= VARIANCE_FLOOR));
        assert!(mixture.log_likelihood(&rows[0]).is_finite());
    }
}
