use std::fmt;

/// Every configurable parameter a session answers to, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
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
    NumMixtureModels,
    NumClusters,
}
use Attribute::*;

/// The type of value an attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Float,
    Bool,
}

impl Attribute {
    pub const ALL: [Attribute; 24] = [
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
        NumMixtureModels,
        NumClusters,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode => "mode",
            NumInputs => "num_inputs",
            NumOutputs => "num_outputs",
            NumHidden => "num_hidden",
            MinEpochs => "min_epochs",
            MaxEpochs => "max_epochs",
            MinChange => "min_change",
            TrainingRate => "training_rate",
            Momentum => "momentum",
            Gamma => "gamma",
            MultiThreadedTraining => "multi_threaded_training",
            NullRejection => "null_rejection",
            NullRejectionCoeff => "null_rejection_coeff",
            InputActivationFunction => "input_activation_function",
            HiddenActivationFunction => "hidden_activation_function",
            OutputActivationFunction => "output_activation_function",
            RandTrainingIterations => "rand_training_iterations",
            UseValidationSet => "use_validation_set",
            ValidationSetSize => "validation_set_size",
            RandomizeTrainingOrder => "randomize_training_order",
            EnableScaling => "enable_scaling",
            Probs => "probs",
            NumMixtureModels => "num_mixture_models",
            NumClusters => "num_clusters",
        }
    }

    /// Looks an attribute up by its wire name. `scaling` is accepted for `enable_scaling`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "scaling" {
            return Some(EnableScaling);
        }

        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    pub fn kind(self) -> ValueKind {
        match self {
            MinChange | TrainingRate | Momentum | Gamma | NullRejectionCoeff => ValueKind::Float,
            MultiThreadedTraining | NullRejection | UseValidationSet | RandomizeTrainingOrder
            | EnableScaling | Probs => ValueKind::Bool,
            _ => ValueKind::Int,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// Interprets a number sent by a host as a value of `kind`: integers are
    /// truncated and booleans are true for anything but zero.
    pub fn from_number(kind: ValueKind, number: f64) -> Self {
        match kind {
            ValueKind::Int => Value::Int(number.trunc() as i64),
            ValueKind::Float => Value::Float(number),
            ValueKind::Bool => Value::Bool(number != 0.0),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v,
            Value::Bool(v) => f64::from(u8::from(v)),
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Value::Int(v) => v,
            Value::Float(v) => v.trunc() as i64,
            Value::Bool(v) => i64::from(v),
        }
    }

    pub fn as_bool(self) -> bool {
        match self {
            Value::Int(v) => v != 0,
            Value::Float(v) => v != 0.0,
            Value::Bool(v) => v,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{}", u8::from(*v)),
        }
    }
}
