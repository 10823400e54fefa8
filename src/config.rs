use std::{fs, num::NonZeroUsize, path::Path};

use serde::Deserialize;

use crate::{
    error::{AdapterError, Result},
    mode::Mode,
    model::{Activations, ModelKind},
};

const DEFAULT_NUM_INPUTS: NonZeroUsize = NonZeroUsize::new(2).unwrap();
const DEFAULT_NUM_OUTPUTS: NonZeroUsize = NonZeroUsize::MIN;
const DEFAULT_NUM_HIDDEN: NonZeroUsize = NonZeroUsize::new(2).unwrap();

/// Construction time settings of a session.
///
/// Every field is optional in the JSON form, missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub model: ModelKind,
    /// The initial mode. Defaults to regression when the model supports it and
    /// to classification otherwise.
    pub mode: Option<Mode>,
    pub num_inputs: NonZeroUsize,
    pub num_outputs: NonZeroUsize,
    pub num_hidden: NonZeroUsize,
    pub activations: Activations,
    /// Whether classifications also report per class likelihoods.
    pub probs: bool,
    /// Seeds the model's random generator, making training reproducible.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            mode: None,
            num_inputs: DEFAULT_NUM_INPUTS,
            num_outputs: DEFAULT_NUM_OUTPUTS,
            num_hidden: DEFAULT_NUM_HIDDEN,
            activations: Activations::default(),
            probs: true,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Returns the default configuration for a `model` session.
    pub fn for_model(model: ModelKind) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    /// Parses a configuration from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AdapterError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| AdapterError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// The mode a new session starts in.
    pub fn initial_mode(&self) -> Mode {
        self.mode.unwrap_or(if self.model.supports(Mode::Regression) {
            Mode::Regression
        } else {
            Mode::Classification
        })
    }

    /// Checks the settings are consistent with each other.
    ///
    /// # Errors
    /// `AdapterError::InvalidConfig` if the model can't work in the initial mode,
    /// or if a classification session is asked for more than one output.
    pub fn validate(&self) -> Result<()> {
        let mode = self.initial_mode();

        if !self.model.supports(mode) {
            return Err(AdapterError::InvalidConfig(format!(
                "{} models don't support {mode} mode",
                self.model.name()
            )));
        }

        if mode == Mode::Classification && self.num_outputs.get() > 1 {
            return Err(AdapterError::InvalidConfig(
                "classification sessions have a single output".to_string(),
            ));
        }

        Ok(())
    }
}
