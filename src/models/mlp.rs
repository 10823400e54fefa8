use machine_learning::{
    self as ml,
    arch::{Mlp, MlpParams, MlpTopology},
    dataset::DatasetRef,
};

use super::{classifier_param, count, set_classifier_param, unknown};
use crate::{
    attribute::{Attribute, Value},
    error::{AdapterError, Result},
    mode::Mode,
    model::{Inference, Model, ModelKind, Topology},
};

/// Early stopping threshold sessions start with, looser than the library's.
const DEFAULT_MIN_CHANGE: f64 = 1.0e-2;

/// A multilayer perceptron, usable both as a classifier and as a regressor.
pub struct MlpModel {
    mlp: Mlp,
}

impl MlpModel {
    pub fn new(seed: Option<u64>) -> Result<Self> {
        let mut params = MlpParams::default();
        params.set_min_change(DEFAULT_MIN_CHANGE)?;

        Ok(Self {
            mlp: Mlp::new(params, seed),
        })
    }
}

impl Model for MlpModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Mlp
    }

    fn initialize(&mut self, topology: &Topology) -> ml::Result<()> {
        self.mlp.init(MlpTopology {
            num_inputs: topology.num_inputs,
            num_hidden: topology.num_hidden,
            num_outputs: topology.num_outputs,
            input_act: topology.activations.input,
            hidden_act: topology.activations.hidden,
            output_act: topology.activations.output,
        })
    }

    fn fit(&mut self, dataset: DatasetRef<'_>) -> ml::Result<()> {
        match dataset {
            DatasetRef::Classification(data) => self.mlp.train_classification(data),
            DatasetRef::Regression(data) => self.mlp.train_regression(data),
        }
    }

    fn infer(&mut self, input: &[f64]) -> ml::Result<Inference> {
        self.mlp.predict(input)?;

        if self.mlp.classification_mode_active() {
            Ok(Inference::Class {
                label: self.mlp.predicted_class_label(),
                likelihoods: self.mlp.class_likelihoods().to_vec(),
            })
        } else {
            Ok(Inference::Regression(self.mlp.regression_data().to_vec()))
        }
    }

    fn is_trained(&self) -> bool {
        self.mlp.is_trained()
    }

    fn active_mode(&self) -> Option<Mode> {
        if self.mlp.classification_mode_active() {
            Some(Mode::Classification)
        } else if self.mlp.regression_mode_active() {
            Some(Mode::Regression)
        } else {
            None
        }
    }

    fn num_inputs(&self) -> usize {
        self.mlp.num_input_neurons()
    }

    fn num_outputs(&self) -> usize {
        self.mlp.num_output_neurons()
    }

    fn num_classes(&self) -> usize {
        self.mlp.num_classes()
    }

    fn clear(&mut self) {
        self.mlp.clear();
    }

    fn set_param(&mut self, attr: Attribute, value: Value) -> Result<()> {
        if let Some(res) = set_classifier_param(self.mlp.classifier_mut(), attr, value) {
            return res;
        }

        let params = self.mlp.params_mut();
        match attr {
            Attribute::MinEpochs => params.set_min_epochs(count(value))?,
            Attribute::MaxEpochs => params.set_max_epochs(count(value))?,
            Attribute::MinChange => params.set_min_change(value.as_f64())?,
            Attribute::TrainingRate => params.set_training_rate(value.as_f64())?,
            Attribute::Momentum => params.set_momentum(value.as_f64())?,
            Attribute::Gamma => params.set_gamma(value.as_f64())?,
            Attribute::RandTrainingIterations => {
                params.set_rand_training_iterations(count(value))?
            }
            Attribute::UseValidationSet => params.set_use_validation_set(value.as_bool()),
            Attribute::ValidationSetSize => params.set_validation_set_size(count(value))?,
            Attribute::RandomizeTrainingOrder => {
                params.set_randomize_training_order(value.as_bool())
            }
            Attribute::MultiThreadedTraining => {
                return Err(AdapterError::NotImplemented(attr.name()));
            }
            _ => return Err(unknown(attr)),
        }

        Ok(())
    }

    fn param(&self, attr: Attribute) -> Result<Value> {
        if let Some(value) = classifier_param(self.mlp.classifier(), attr) {
            return Ok(value);
        }

        let params = self.mlp.params();
        let value = match attr {
            Attribute::MinEpochs => Value::Int(params.min_epochs() as i64),
            Attribute::MaxEpochs => Value::Int(params.max_epochs() as i64),
            Attribute::MinChange => Value::Float(params.min_change()),
            Attribute::TrainingRate => Value::Float(params.training_rate()),
            Attribute::Momentum => Value::Float(params.momentum()),
            Attribute::Gamma => Value::Float(params.gamma()),
            Attribute::RandTrainingIterations => {
                Value::Int(params.rand_training_iterations() as i64)
            }
            Attribute::UseValidationSet => Value::Bool(params.use_validation_set()),
            Attribute::ValidationSetSize => Value::Int(params.validation_set_size() as i64),
            Attribute::RandomizeTrainingOrder => Value::Bool(params.randomize_training_order()),
            Attribute::MultiThreadedTraining => {
                return Err(AdapterError::NotImplemented(attr.name()));
            }
            _ => return Err(unknown(attr)),
        };

        Ok(value)
    }
}
