use machine_learning::{self as ml, arch::activations::ActFn, dataset::DatasetRef};
use serde::Deserialize;

use crate::{
    attribute::{Attribute, Value},
    error::Result,
    mode::Mode,
    models::{GmmModel, MinDistModel, MlpModel},
};

/// The algorithm family backing a session, chosen when the session is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    Mlp,
    Gmm,
    #[serde(alias = "mindist")]
    MinDist,
}

impl ModelKind {
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Mlp => "mlp",
            ModelKind::Gmm => "gmm",
            ModelKind::MinDist => "mindist",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mlp" => Some(ModelKind::Mlp),
            "gmm" => Some(ModelKind::Gmm),
            "mindist" | "min_dist" => Some(ModelKind::MinDist),
            _ => None,
        }
    }

    /// Whether the family can be trained in `mode`.
    pub fn supports(self, mode: Mode) -> bool {
        match self {
            ModelKind::Mlp => true,
            ModelKind::Gmm | ModelKind::MinDist => mode == Mode::Classification,
        }
    }

    /// The attributes a session of this family answers to.
    pub fn attributes(self) -> &'static [Attribute] {
        use Attribute::*;

        match self {
            ModelKind::Mlp => &[
                Mode,
                NumInputs,
                NumOutputs,
                NumHidden,
                MinEpochs,
                MaxEpochs,
                MinChange,
                TrainingRate,
                Momentum,
                Gamma,
                MultiThreadedTraining,
                NullRejection,
                NullRejectionCoeff,
                InputActivationFunction,
                HiddenActivationFunction,
                OutputActivationFunction,
                RandTrainingIterations,
                UseValidationSet,
                ValidationSetSize,
                RandomizeTrainingOrder,
                EnableScaling,
                Probs,
            ],
            ModelKind::Gmm => &[
                Mode,
                NumInputs,
                NumOutputs,
                EnableScaling,
                Probs,
                NullRejection,
                NullRejectionCoeff,
                NumMixtureModels,
            ],
            ModelKind::MinDist => &[
                Mode,
                NumInputs,
                NumOutputs,
                EnableScaling,
                Probs,
                NullRejection,
                NullRejectionCoeff,
                NumClusters,
            ],
        }
    }

    /// Builds an untrained model of this family.
    ///
    /// # Arguments
    /// * `seed` - Makes training deterministic when given.
    pub fn build(self, seed: Option<u64>) -> Result<Box<dyn Model>> {
        Ok(match self {
            ModelKind::Mlp => Box::new(MlpModel::new(seed)?),
            ModelKind::Gmm => Box::new(GmmModel::new(seed)),
            ModelKind::MinDist => Box::new(MinDistModel::new(seed)),
        })
    }
}

/// Per layer activation functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Activations {
    pub input: ActFn,
    pub hidden: ActFn,
    pub output: ActFn,
}

/// The structure a model is initialized with right before every fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub num_inputs: usize,
    pub num_hidden: usize,
    /// The target width in regression, the amount of classes in classification.
    pub num_outputs: usize,
    pub activations: Activations,
}

/// The outcome of running a trained model.
#[derive(Debug, Clone, PartialEq)]
pub enum Inference {
    /// The winning label, `0` if null rejected, and one likelihood per known class.
    Class { label: u32, likelihoods: Vec<f64> },
    Regression(Vec<f64>),
}

/// The capability a session needs from a learning algorithm.
pub trait Model {
    fn kind(&self) -> ModelKind;

    fn supports(&self, mode: Mode) -> bool {
        self.kind().supports(mode)
    }

    /// Resets the model to an untrained one with the given structure.
    fn initialize(&mut self, topology: &Topology) -> ml::Result<()>;

    /// Fits the model to every sample in `dataset`.
    fn fit(&mut self, dataset: DatasetRef<'_>) -> ml::Result<()>;

    fn infer(&mut self, input: &[f64]) -> ml::Result<Inference>;

    fn is_trained(&self) -> bool;

    /// The mode the model was last fitted for, `None` while untrained.
    fn active_mode(&self) -> Option<Mode>;

    fn num_inputs(&self) -> usize;

    fn num_outputs(&self) -> usize;

    fn num_classes(&self) -> usize;

    /// Forgets everything learnt.
    fn clear(&mut self);

    /// Applies a hyper-parameter owned by the model.
    ///
    /// # Errors
    /// * `AdapterError::InvalidParameter` if the library rejects the value.
    /// * `AdapterError::UnknownAttribute` if the model has no such parameter.
    fn set_param(&mut self, attr: Attribute, value: Value) -> Result<()>;

    fn param(&self, attr: Attribute) -> Result<Value>;
}
