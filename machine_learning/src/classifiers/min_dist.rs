use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::index};

use super::{ClassPrediction, ClassifierParams, argmax, mean_std, normalize, squared_distance};
use crate::{MlErr, Result, dataset::ClassificationData, scaling::MinMaxScaler};

const MAX_ITERATIONS: usize = 100;

/// Hyper-parameters of the minimum distance classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct MinDistParams {
    num_clusters: usize,
    classifier: ClassifierParams,
}

impl Default for MinDistParams {
    fn default() -> Self {
        Self {
            num_clusters: 10,
            classifier: ClassifierParams::default(),
        }
    }
}

impl MinDistParams {
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    pub fn set_num_clusters(&mut self, num_clusters: usize) -> Result<()> {
        if num_clusters == 0 {
            return Err(MlErr::InvalidParam {
                name: "num_clusters",
                hint: "should be greater than 0",
            });
        }

        self.num_clusters = num_clusters;
        Ok(())
    }

    pub fn classifier(&self) -> &ClassifierParams {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut ClassifierParams {
        &mut self.classifier
    }
}

/// Lloyd's algorithm, seeded with `k` distinct rows.
fn k_means<R: Rng>(rows: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let n = rows.len();
    let k = k.clamp(1, n);
    let width = rows[0].len();

    let mut centres: Vec<Vec<f64>> = index::sample(rng, n, k)
        .into_iter()
        .map(|i| rows[i].clone())
        .collect();
    let mut assignments = vec![usize::MAX; n];

    for iteration in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (row, assigned) in rows.iter().zip(assignments.iter_mut()) {
            let (nearest, _) = nearest(&centres, row);
            if *assigned != nearest {
                *assigned = nearest;
                changed = true;
            }
        }

        if !changed {
            debug!("k-means converged after {iteration} iteration(s)");
            break;
        }

        for (c, centre) in centres.iter_mut().enumerate() {
            let members: Vec<&Vec<f64>> = rows
                .iter()
                .zip(&assignments)
                .filter(|&(_, &a)| a == c)
                .map(|(row, _)| row)
                .collect();

            // Empty clusters keep their previous centre.
            if members.is_empty() {
                continue;
            }

            let count = members.len() as f64;
            *centre = (0..width)
                .map(|d| members.iter().map(|row| row[d]).sum::<f64>() / count)
                .collect();
        }
    }

    centres
}

/// Index of and Euclidean distance to the centre closest to `x`.
fn nearest(centres: &[Vec<f64>], x: &[f64]) -> (usize, f64) {
    centres
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(c, x)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, d)| (i, d.sqrt()))
        .unwrap_or((0, f64::INFINITY))
}

#[derive(Debug, Clone)]
struct ClassModel {
    label: u32,
    centres: Vec<Vec<f64>>,
    // Mean and deviation of the training samples' distances to their centre.
    spread: (f64, f64),
}

/// A classifier assigning inputs to the class owning the closest cluster centre.
#[derive(Debug, Clone)]
pub struct MinDist {
    params: MinDistParams,
    rng: StdRng,
    num_inputs: usize,
    scaler: Option<MinMaxScaler>,
    models: Vec<ClassModel>,
    prediction: ClassPrediction,
}

impl MinDist {
    /// Creates an untrained classifier, seeding its generator when `seed` is given.
    pub fn new(params: MinDistParams, seed: Option<u64>) -> Self {
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

    pub fn params(&self) -> &MinDistParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut MinDistParams {
        &mut self.params
    }

    /// Clusters every class present in `data`.
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

            let centres = k_means(&rows, self.params.num_clusters, &mut self.rng);
            let distances: Vec<f64> = rows.iter().map(|x| nearest(&centres, x).1).collect();

            models.push(ClassModel {
                label,
                centres,
                spread: mean_std(&distances),
            });
        }

        debug!("min dist trained {} class model(s)", models.len());
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

        let distances: Vec<f64> = self.models.iter().map(|m| nearest(&m.centres, &x).1).collect();
        let mut likelihoods: Vec<f64> =
            distances.iter().map(|d| 1.0 / (d + f64::EPSILON)).collect();
        normalize(&mut likelihoods);

        let best = argmax(&likelihoods).ok_or(MlErr::Degenerate("no class models"))?;
        let model = &self.models[best];

        let coeff = self.params.classifier.null_rejection_coeff();
        let threshold = model.spread.0 + coeff * model.spread.1;
        let rejected = self.params.classifier.null_rejection() && distances[best] > threshold;

        self.prediction = ClassPrediction {
            label: if rejected { 0 } else { model.label },
            likelihoods,
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

    fn data() -> ClassificationData {
        let mut data = ClassificationData::new(2);
        for i in 0..5 {
            let jitter = i as f64 * 0.02;
            data.add_sample(3, vec![0.0 + jitter, 0.0]).unwrap();
            data.add_sample(7, vec![1.0 - jitter, 1.0]).unwrap();
        }
        data
    }

    #[test]
    fn closest_class_wins() {
        let mut min_dist = MinDist::new(MinDistParams::default(), Some(3));
        min_dist.train(&data()).unwrap();

        min_dist.predict(&[0.05, 0.1]).unwrap();
        let prediction = min_dist.prediction();
        assert_eq!(prediction.label, 3);
        assert!(prediction.likelihoods[0] > prediction.likelihoods[1]);

        min_dist.predict(&[0.95, 0.9]).unwrap();
        assert_eq!(min_dist.prediction().label, 7);
    }

    #[test]
    fn cluster_count_is_capped_by_samples() {
        let rows = vec![vec![0.0], vec![1.0]];
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(k_means(&rows, 10, &mut rng).len(), 2);
    }

    #[test]
    fn null_rejection_labels_outliers_zero() {
        let mut min_dist = MinDist::new(MinDistParams::default(), Some(3));
        min_dist.params_mut().set_num_clusters(1).unwrap();
        min_dist.params_mut().classifier_mut().set_null_rejection(true);
        min_dist.train(&data()).unwrap();

        min_dist.predict(&[10.0, -10.0]).unwrap();
        assert_eq!(min_dist.prediction().label, 0);
    }

    #[test]
    fn zero_clusters_is_rejected() {
        let mut params = MinDistParams::default();
        assert!(params.set_num_clusters(0).is_err());
        assert_eq!(params.num_clusters(), 10);
    }
}
