use std::fmt;

use log::info;
use serde::Deserialize;

use crate::error::{AdapterError, Result};

/// The kind of inference a session performs.
///
/// The discriminants are the values hosts use on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Regression = 0,
    Classification = 1,
}
use Mode::*;

impl Mode {
    /// The highest valid wire value.
    pub const MAX: i64 = Classification as i64;

    pub fn index(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Mode {
    type Error = AdapterError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Regression),
            1 => Ok(Classification),
            other => Err(AdapterError::InvalidMode(other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regression => write!(f, "regression"),
            Classification => write!(f, "classification"),
        }
    }
}

/// The input and output widths expected from samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contract {
    pub num_inputs: usize,
    pub num_outputs: usize,
}

impl Contract {
    /// The amount of values an `add` message must carry.
    pub fn combined(&self) -> usize {
        self.num_inputs + self.num_outputs
    }
}

/// Owns the active `Mode` and one dimensionality `Contract` per mode.
///
/// Each mode keeps its own input width, so switching back and forth never
/// resizes the other mode's samples. The classification contract always has a
/// single output, the class label.
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: Mode,
    classification_inputs: usize,
    regression: Contract,
}

impl ModeController {
    /// Creates a new `ModeController`.
    ///
    /// # Arguments
    /// * `mode` - The initially active mode.
    /// * `num_inputs` - The initial input width of both modes.
    /// * `num_outputs` - The initial regression output width.
    ///
    /// # Errors
    /// `AdapterError::InvalidDimension` if any width is zero.
    pub fn new(mode: Mode, num_inputs: usize, num_outputs: usize) -> Result<Self> {
        check_dimension("inputs", num_inputs)?;
        check_dimension("outputs", num_outputs)?;

        Ok(Self {
            mode,
            classification_inputs: num_inputs,
            regression: Contract {
                num_inputs,
                num_outputs,
            },
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches the active mode. Entering classification pins the output count to one.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            info!("switching mode from {} to {mode}", self.mode);
        }
        self.mode = mode;
    }

    /// Returns the contract of the active mode.
    pub fn contract(&self) -> Contract {
        self.contract_for(self.mode)
    }

    pub fn contract_for(&self, mode: Mode) -> Contract {
        match mode {
            Classification => Contract {
                num_inputs: self.classification_inputs,
                num_outputs: 1,
            },
            Regression => self.regression,
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.contract().num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.contract().num_outputs
    }

    /// Sets the input width of the active mode only.
    pub fn set_num_inputs(&mut self, num_inputs: usize) -> Result<()> {
        check_dimension("inputs", num_inputs)?;

        match self.mode {
            Classification => self.classification_inputs = num_inputs,
            Regression => self.regression.num_inputs = num_inputs,
        }
        Ok(())
    }

    /// Sets the output width of the active mode.
    ///
    /// # Errors
    /// * `AdapterError::InvalidDimension` if `num_outputs` is zero.
    /// * `AdapterError::ModeConflict` for more than one output in classification.
    pub fn set_num_outputs(&mut self, num_outputs: usize) -> Result<()> {
        check_dimension("outputs", num_outputs)?;

        match self.mode {
            Classification if num_outputs > 1 => Err(AdapterError::ModeConflict(
                "for classification mode, number of outputs must be 1, for multidimensional output switch mode to 0",
            )),
            Classification => Ok(()),
            Regression => {
                self.regression.num_outputs = num_outputs;
                Ok(())
            }
        }
    }
}

fn check_dimension(what: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(AdapterError::InvalidDimension {
            what,
            got: value as i64,
        });
    }
    Ok(())
}
