use machine_learning::{
    self as ml, MlErr,
    classifiers::{Gmm, GmmParams},
    dataset::DatasetRef,
};

use super::{classifier_param, count, set_classifier_param, unknown};
use crate::{
    attribute::{Attribute, Value},
    error::Result,
    mode::Mode,
    model::{Inference, Model, ModelKind, Topology},
};

/// A Gaussian mixture classifier, one mixture per class.
pub struct GmmModel {
    gmm: Gmm,
}

impl GmmModel {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            gmm: Gmm::new(GmmParams::default(), seed),
        }
    }
}

impl Model for GmmModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Gmm
    }

    fn initialize(&mut self, _topology: &Topology) -> ml::Result<()> {
        self.gmm.clear();
        Ok(())
    }

    fn fit(&mut self, dataset: DatasetRef<'_>) -> ml::Result<()> {
        match dataset {
            DatasetRef::Classification(data) => self.gmm.train(data),
            other => Err(MlErr::KindMismatch {
                expected: "classification",
                got: other.kind(),
            }),
        }
    }

    fn infer(&mut self, input: &[f64]) -> ml::Result<Inference> {
        self.gmm.predict(input)?;
        let prediction = self.gmm.prediction();

        Ok(Inference::Class {
            label: prediction.label,
            likelihoods: prediction.likelihoods.clone(),
        })
    }

    fn is_trained(&self) -> bool {
        self.gmm.is_trained()
    }

    fn active_mode(&self) -> Option<Mode> {
        self.gmm.is_trained().then_some(Mode::Classification)
    }

    fn num_inputs(&self) -> usize {
        self.gmm.num_inputs()
    }

    fn num_outputs(&self) -> usize {
        self.gmm.num_classes()
    }

    fn num_classes(&self) -> usize {
        self.gmm.num_classes()
    }

    fn clear(&mut self) {
        self.gmm.clear();
    }

    fn set_param(&mut self, attr: Attribute, value: Value) -> Result<()> {
        let params = self.gmm.params_mut();
        if let Some(res) = set_classifier_param(params.classifier_mut(), attr, value) {
            return res;
        }

        match attr {
            Attribute::NumMixtureModels => Ok(params.set_num_mixture_models(count(value))?),
            _ => Err(unknown(attr)),
        }
    }

    fn param(&self, attr: Attribute) -> Result<Value> {
        let params = self.gmm.params();
        if let Some(value) = classifier_param(params.classifier(), attr) {
            return Ok(value);
        }

        match attr {
            Attribute::NumMixtureModels => Ok(Value::Int(params.num_mixture_models() as i64)),
            _ => Err(unknown(attr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use machine_learning::dataset::RegressionData;

    use super::*;
    use crate::error::AdapterError;

    #[test]
    fn refuses_regression_data() {
        let mut model = GmmModel::new(Some(0));
        let data = RegressionData::new(2, 1);

        assert!(matches!(
            model.fit(DatasetRef::Regression(&data)),
            Err(MlErr::KindMismatch { .. })
        ));
        assert!(!model.supports(Mode::Regression));
        assert!(model.supports(Mode::Classification));
    }

    #[test]
    fn mixture_count_is_validated() {
        let mut model = GmmModel::new(Some(0));

        assert!(matches!(
            model.set_param(Attribute::NumMixtureModels, Value::Int(0)),
            Err(AdapterError::InvalidParameter { name: "num_mixture_models", .. })
        ));
        model.set_param(Attribute::NumMixtureModels, Value::Int(3)).unwrap();
        assert_eq!(model.param(Attribute::NumMixtureModels).unwrap(), Value::Int(3));
        assert!(model.set_param(Attribute::Gamma, Value::Float(1.0)).is_err());
    }
}
