use machine_learning::{
    self as ml, MlErr,
    classifiers::{MinDist, MinDistParams},
    dataset::DatasetRef,
};

use super::{classifier_param, count, set_classifier_param, unknown};
use crate::{
    attribute::{Attribute, Value},
    error::Result,
    mode::Mode,
    model::{Inference, Model, ModelKind, Topology},
};

/// A minimum distance classifier clustering every class.
pub struct MinDistModel {
    min_dist: MinDist,
}

impl MinDistModel {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            min_dist: MinDist::new(MinDistParams::default(), seed),
        }
    }
}

impl Model for MinDistModel {
    fn kind(&self) -> ModelKind {
        ModelKind::MinDist
    }

    fn initialize(&mut self, _topology: &Topology) -> ml::Result<()> {
        self.min_dist.clear();
        Ok(())
    }

    fn fit(&mut self, dataset: DatasetRef<'_>) -> ml::Result<()> {
        match dataset {
            DatasetRef::Classification(data) => self.min_dist.train(data),
            other => Err(MlErr::KindMismatch {
                expected: "classification",
                got: other.kind(),
            }),
        }
    }

    fn infer(&mut self, input: &[f64]) -> ml::Result<Inference> {
        self.min_dist.predict(input)?;
        let prediction = self.min_dist.prediction();

        Ok(Inference::Class {
            label: prediction.label,
            likelihoods: prediction.likelihoods.clone(),
        })
    }

    fn is_trained(&self) -> bool {
        self.min_dist.is_trained()
    }

    fn active_mode(&self) -> Option<Mode> {
        self.min_dist.is_trained().then_some(Mode::Classification)
    }

    fn num_inputs(&self) -> usize {
        self.min_dist.num_inputs()
    }

    fn num_outputs(&self) -> usize {
        self.min_dist.num_classes()
    }

    fn num_classes(&self) -> usize {
        self.min_dist.num_classes()
    }

    fn clear(&mut self) {
        self.min_dist.clear();
    }

    fn set_param(&mut self, attr: Attribute, value: Value) -> Result<()> {
        let params = self.min_dist.params_mut();
        if let Some(res) = set_classifier_param(params.classifier_mut(), attr, value) {
            return res;
        }

        match attr {
            Attribute::NumClusters => Ok(params.set_num_clusters(count(value))?),
            _ => Err(unknown(attr)),
        }
    }

    fn param(&self, attr: Attribute) -> Result<Value> {
        let params = self.min_dist.params();
        if let Some(value) = classifier_param(params.classifier(), attr) {
            return Ok(value);
        }

        match attr {
            Attribute::NumClusters => Ok(Value::Int(params.num_clusters() as i64)),
            _ => Err(unknown(attr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use machine_learning::dataset::ClassificationData;

    use super::*;
    use crate::error::AdapterError;

    #[test]
    fn infers_one_likelihood_per_class() {
        let mut data = ClassificationData::new(1);
        data.add_sample(1, vec![0.0]).unwrap();
        data.add_sample(2, vec![5.0]).unwrap();
        data.add_sample(3, vec![10.0]).unwrap();

        let mut model = MinDistModel::new(Some(9));
        model.fit(DatasetRef::Classification(&data)).unwrap();
        assert_eq!(model.active_mode(), Some(Mode::Classification));

        let Inference::Class { label, likelihoods } = model.infer(&[9.0]).unwrap() else {
            panic!("a classifier must infer classes");
        };
        assert_eq!(label, 3);
        assert_eq!(likelihoods.len(), 3);
    }

    #[test]
    fn cluster_count_is_validated() {
        let mut model = MinDistModel::new(Some(0));

        assert!(matches!(
            model.set_param(Attribute::NumClusters, Value::Int(-2)),
            Err(AdapterError::InvalidParameter { name: "num_clusters", .. })
        ));
        assert_eq!(model.param(Attribute::NumClusters).unwrap(), Value::Int(10));
        assert!(matches!(
            model.param(Attribute::NumMixtureModels),
            Err(AdapterError::UnknownAttribute(_))
        ));
    }
}
