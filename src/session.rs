use std::path::Path;

use log::{info, warn};
use machine_learning::{
    MlErr,
    arch::activations::ActFn,
    dataset::{ClassificationData, DatasetRef, RegressionData},
};

use crate::{
    config::SessionConfig,
    error::{AdapterError, PersistOp, Result},
    mode::{Contract, Mode, ModeController},
    model::{Activations, Inference, Model, Topology},
    store::DatasetStore,
};

/// A network layer, as addressed by the activation function attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Input,
    Hidden,
    Output,
}

/// What a successful `train` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainReport {
    /// The amount of classes learnt, `0` for regression.
    pub num_classes: usize,
}

/// The result of a successful `classify`.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// The predicted label, `0` when null rejected, and a `(label, likelihood)`
    /// estimate for every class present in the dataset.
    Class {
        label: u32,
        estimates: Vec<(u32, f64)>,
    },
    Regression(Vec<f64>),
}

/// The sample and training state machine of one adapter instance.
///
/// A session exclusively owns both dataset representations, the model and the
/// store. The active mode's `Contract` decides the shape `add` expects; each
/// mode's dataset keeps its own widths.
pub struct Session {
    controller: ModeController,
    classification: ClassificationData,
    regression: RegressionData,
    model: Box<dyn Model>,
    store: Box<dyn DatasetStore>,
    num_hidden: usize,
    activations: Activations,
    probs: bool,
}

impl Session {
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `config` - The initial mode, dimensions and topology.
    /// * `model` - The untrained model this session drives.
    /// * `store` - Where `save` and `load` go.
    ///
    /// # Errors
    /// `AdapterError::ModeConflict` if `model` can't work in the initial mode.
    pub fn new(
        config: &SessionConfig,
        model: Box<dyn Model>,
        store: Box<dyn DatasetStore>,
    ) -> Result<Self> {
        let mode = config.initial_mode();
        if !model.supports(mode) {
            return Err(AdapterError::ModeConflict("the model doesn't support the initial mode"));
        }

        let num_inputs = config.num_inputs.get();
        let num_outputs = config.num_outputs.get();
        let controller = ModeController::new(mode, num_inputs, num_outputs)?;

        info!(
            "created {} session in {mode} mode with {num_inputs} input(s)",
            model.kind().name()
        );

        Ok(Self {
            controller,
            classification: ClassificationData::new(num_inputs),
            regression: RegressionData::new(num_inputs, num_outputs),
            model,
            store,
            num_hidden: config.num_hidden.get(),
            activations: config.activations,
            probs: config.probs,
        })
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    /// Switches the active mode. Samples of both modes are kept.
    ///
    /// # Errors
    /// `AdapterError::ModeConflict` if the model can't work in `mode`.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        if !self.model.supports(mode) {
            return Err(AdapterError::ModeConflict(
                "this model only supports classification mode",
            ));
        }

        self.controller.set_mode(mode);
        Ok(())
    }

    pub fn contract(&self) -> Contract {
        self.controller.contract()
    }

    pub fn num_inputs(&self) -> usize {
        self.controller.num_inputs()
    }

    /// Sets the input width of the active mode.
    ///
    /// Changing the width of a non empty dataset discards its samples.
    pub fn set_num_inputs(&mut self, num_inputs: usize) -> Result<()> {
        self.controller.set_num_inputs(num_inputs)?;
        self.resize_active_dataset()
    }

    pub fn num_outputs(&self) -> usize {
        self.controller.num_outputs()
    }

    /// Sets the output width of the active mode. Classification only accepts one.
    pub fn set_num_outputs(&mut self, num_outputs: usize) -> Result<()> {
        self.controller.set_num_outputs(num_outputs)?;
        self.resize_active_dataset()
    }

    pub fn num_hidden(&self) -> usize {
        self.num_hidden
    }

    pub fn set_num_hidden(&mut self, num_hidden: usize) -> Result<()> {
        if num_hidden == 0 {
            return Err(AdapterError::InvalidDimension {
                what: "hidden neurons",
                got: 0,
            });
        }

        self.num_hidden = num_hidden;
        Ok(())
    }

    pub fn activation(&self, layer: Layer) -> ActFn {
        match layer {
            Layer::Input => self.activations.input,
            Layer::Hidden => self.activations.hidden,
            Layer::Output => self.activations.output,
        }
    }

    /// Sets the activation function of `layer` from its wire index.
    pub fn set_activation(&mut self, layer: Layer, index: i64) -> Result<()> {
        let act_fn = ActFn::from_index(index).ok_or(AdapterError::InvalidParameter {
            name: "activation function",
            hint: "should be between 0-2",
        })?;

        match layer {
            Layer::Input => self.activations.input = act_fn,
            Layer::Hidden => self.activations.hidden = act_fn,
            Layer::Output => self.activations.output = act_fn,
        }

        info!("activation function set to {}", act_fn.name());
        Ok(())
    }

    pub fn probs(&self) -> bool {
        self.probs
    }

    pub fn set_probs(&mut self, probs: bool) {
        self.probs = probs;
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> &mut dyn Model {
        self.model.as_mut()
    }

    pub fn classification_data(&self) -> &ClassificationData {
        &self.classification
    }

    pub fn regression_data(&self) -> &RegressionData {
        &self.regression
    }

    /// The amount of samples collected for the active mode.
    pub fn num_samples(&self) -> usize {
        self.active_dataset().len()
    }

    /// Adds a sample: the active mode's outputs first (a single class label in
    /// classification), followed by the inputs.
    ///
    /// A sample whose width disagrees with the contract reshapes the input count
    /// to fit it instead of being rejected.
    ///
    /// # Errors
    /// * `AdapterError::InsufficientInput` if there aren't at least two values, or
    ///   not a single input once the outputs are taken.
    /// * `AdapterError::InvalidLabel` if a class label isn't a positive integer.
    pub fn add(&mut self, values: &[f64]) -> Result<()> {
        if values.len() < 2 {
            return Err(AdapterError::InsufficientInput {
                got: values.len(),
                expected_at_least: 2,
            });
        }

        let Contract {
            num_inputs,
            num_outputs,
        } = self.controller.contract();

        if values.len() <= num_outputs {
            return Err(AdapterError::InsufficientInput {
                got: values.len(),
                expected_at_least: num_outputs + 1,
            });
        }

        let (target, input) = values.split_at(num_outputs);
        let label = match self.mode() {
            Mode::Classification => Some(class_label(target[0])?),
            Mode::Regression => None,
        };

        if input.len() != num_inputs {
            info!("new input vector size, adjusting num_inputs to {}", input.len());
            self.set_num_inputs(input.len())?;
        }

        let res = match label {
            Some(label) => self.classification.add_sample(label, input.to_vec()),
            None => self.regression.add_sample(input.to_vec(), target.to_vec()),
        };

        res.map_err(|_| AdapterError::InternalConsistency {
            what: "sample",
            got: values.len(),
            expected: self.controller.contract().combined(),
        })
    }

    /// Initializes the model with the current topology and fits it to every
    /// sample of the active mode.
    ///
    /// When the fitted model ends up in a different mode than the session, the
    /// model is kept trained and `ModeMismatch` is reported.
    ///
    /// # Errors
    /// * `AdapterError::NoTrainingData` if the active dataset is empty.
    /// * `AdapterError::TrainingFailed` if the library couldn't fit the model.
    /// * `AdapterError::ModeMismatch` as described above.
    pub fn train(&mut self) -> Result<TrainReport> {
        let mode = self.mode();
        let dataset = match mode {
            Mode::Classification => DatasetRef::Classification(&self.classification),
            Mode::Regression => DatasetRef::Regression(&self.regression),
        };

        if dataset.is_empty() {
            return Err(AdapterError::NoTrainingData);
        }

        let contract = self.controller.contract();
        let topology = Topology {
            num_inputs: contract.num_inputs,
            num_hidden: self.num_hidden,
            num_outputs: match mode {
                Mode::Classification => self.classification.num_classes(),
                Mode::Regression => contract.num_outputs,
            },
            activations: self.activations,
        };

        info!(
            "training {} model on {} {mode} sample(s)",
            self.model.kind().name(),
            dataset.len()
        );

        self.model
            .initialize(&topology)
            .map_err(AdapterError::TrainingFailed)?;
        self.model.fit(dataset).map_err(AdapterError::TrainingFailed)?;

        let trained_for = self.model.active_mode();
        if trained_for != Some(mode) {
            warn!("model trained for {trained_for:?} while the session is in {mode} mode");
            return Err(AdapterError::ModeMismatch {
                expected: mode,
                got: trained_for,
            });
        }

        let num_classes = self.model.num_classes();
        info!("training finished, {num_classes} class(es)");
        Ok(TrainReport { num_classes })
    }

    /// Runs the trained model on `input`.
    ///
    /// The shape of the result follows the mode the model was trained for, which
    /// only differs from the session's after a `ModeMismatch`.
    ///
    /// # Errors
    /// * `AdapterError::NoTrainingData` if the active dataset is empty.
    /// * `AdapterError::ModelNotTrained` before a successful `train`.
    /// * `AdapterError::DimensionMismatch` if `input` doesn't fit the model.
    /// * `AdapterError::InferenceFailed` if the library couldn't run the model.
    /// * `AdapterError::InternalConsistency` if the result has an unexpected size.
    pub fn classify(&mut self, input: &[f64]) -> Result<Prediction> {
        if self.active_dataset().is_empty() {
            return Err(AdapterError::NoTrainingData);
        }

        if !self.model.is_trained() {
            return Err(AdapterError::ModelNotTrained);
        }

        let expected = self.model.num_inputs();
        if input.len() != expected {
            return Err(AdapterError::DimensionMismatch {
                got: input.len(),
                expected,
            });
        }

        match self.model.infer(input).map_err(AdapterError::InferenceFailed)? {
            Inference::Class { label, likelihoods } => {
                let labels = self.classification.class_labels();
                if labels.len() != likelihoods.len() {
                    return Err(AdapterError::InternalConsistency {
                        what: "labels / likelihoods",
                        got: likelihoods.len(),
                        expected: labels.len(),
                    });
                }

                Ok(Prediction::Class {
                    label,
                    estimates: labels.into_iter().zip(likelihoods).collect(),
                })
            }
            Inference::Regression(values) => {
                let expected = self.model.num_outputs();
                if values.len() != expected {
                    return Err(AdapterError::InternalConsistency {
                        what: "output",
                        got: values.len(),
                        expected,
                    });
                }

                Ok(Prediction::Regression(values))
            }
        }
    }

    /// Discards the samples of both modes and resets the model to untrained.
    pub fn clear(&mut self) {
        self.classification.clear();
        self.regression.clear();
        self.model.clear();
        info!("cleared training data and model");
    }

    /// Persists the active mode's samples.
    ///
    /// # Errors
    /// * `AdapterError::EmptyPath` if `path` is empty.
    /// * `AdapterError::NoTrainingData` if there's nothing to save.
    /// * `AdapterError::PersistenceFailed` if the store failed.
    pub fn save(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(AdapterError::EmptyPath);
        }

        let dataset = match self.controller.mode() {
            Mode::Classification => DatasetRef::Classification(&self.classification),
            Mode::Regression => DatasetRef::Regression(&self.regression),
        };

        if dataset.is_empty() {
            return Err(AdapterError::NoTrainingData);
        }

        self.store
            .save(Path::new(path), dataset)
            .map_err(|source| AdapterError::PersistenceFailed {
                op: PersistOp::Save,
                path: path.to_string(),
                source,
            })?;

        info!("saved {} sample(s) to {path}", dataset.len());
        Ok(())
    }

    /// Replaces the active mode's samples with the ones stored at `path` and
    /// adopts their dimensions. The model is left as it is.
    ///
    /// # Errors
    /// * `AdapterError::EmptyPath` if `path` is empty.
    /// * `AdapterError::PersistenceFailed` if the store failed.
    pub fn load(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(AdapterError::EmptyPath);
        }

        let failed = |source: MlErr| AdapterError::PersistenceFailed {
            op: PersistOp::Load,
            path: path.to_string(),
            source,
        };

        match self.controller.mode() {
            Mode::Classification => {
                let data = self
                    .store
                    .load_classification(Path::new(path))
                    .map_err(failed)?;
                self.controller.set_num_inputs(data.num_dimensions())?;
                self.classification = data;
            }
            Mode::Regression => {
                let data = self.store.load_regression(Path::new(path)).map_err(failed)?;
                self.controller.set_num_inputs(data.num_input_dimensions())?;
                self.controller.set_num_outputs(data.num_target_dimensions())?;
                self.regression = data;
            }
        }

        info!("loaded {} sample(s) from {path}", self.num_samples());
        Ok(())
    }

    fn active_dataset(&self) -> DatasetRef<'_> {
        match self.controller.mode() {
            Mode::Classification => DatasetRef::Classification(&self.classification),
            Mode::Regression => DatasetRef::Regression(&self.regression),
        }
    }

    /// Brings the active dataset's widths in line with the active contract.
    fn resize_active_dataset(&mut self) -> Result<()> {
        let Contract {
            num_inputs,
            num_outputs,
        } = self.controller.contract();

        let (discarded, res) = match self.controller.mode() {
            Mode::Classification => {
                let discarded = if self.classification.num_dimensions() != num_inputs {
                    self.classification.len()
                } else {
                    0
                };
                (discarded, self.classification.set_num_dimensions(num_inputs))
            }
            Mode::Regression => {
                let unchanged = self.regression.num_input_dimensions() == num_inputs
                    && self.regression.num_target_dimensions() == num_outputs;
                let discarded = if unchanged { 0 } else { self.regression.len() };
                (
                    discarded,
                    self.regression
                        .set_input_and_target_dimensions(num_inputs, num_outputs),
                )
            }
        };

        res?;
        if discarded > 0 {
            warn!("dimensions changed, discarded {discarded} sample(s)");
        }
        Ok(())
    }
}

/// Interprets a number as a class label: a positive integer.
fn class_label(value: f64) -> Result<u32> {
    if value.fract() != 0.0 || value < 1.0 || value > f64::from(u32::MAX) {
        return Err(AdapterError::InvalidLabel(value));
    }

    Ok(value as u32)
}
