use serde::{Deserialize, Serialize};

/// Neuron activation functions, indexed the way hosts refer to them on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFn {
    #[default]
    Linear,
    Sigmoid,
    BipolarSigmoid,
}
use ActFn::*;

impl ActFn {
    /// The amount of activation functions available.
    pub const COUNT: i64 = 3;

    /// Maps a wire index (`0..COUNT`) to its activation function.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Linear),
            1 => Some(Sigmoid),
            2 => Some(BipolarSigmoid),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            Linear => 0,
            Sigmoid => 1,
            BipolarSigmoid => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Linear => "LINEAR",
            Sigmoid => "SIGMOID",
            BipolarSigmoid => "BIPOLAR_SIGMOID",
        }
    }

    /// The `(low, high)` values used to encode an inactive and an active output.
    pub fn range(self) -> (f64, f64) {
        match self {
            Linear | Sigmoid => (0.0, 1.0),
            BipolarSigmoid => (-1.0, 1.0),
        }
    }

    /// Evaluates the function, `gamma` being the steepness of the sigmoids.
    pub fn f(self, z: f64, gamma: f64) -> f64 {
        match self {
            Linear => z,
            Sigmoid => 1.0 / (1.0 + (-gamma * z).exp()),
            BipolarSigmoid => -1.0 + 2.0 / (1.0 + (-gamma * z).exp()),
        }
    }

    /// Evaluates the derivative given the function's output `a`.
    pub fn df(self, a: f64, gamma: f64) -> f64 {
        match self {
            Linear => 1.0,
            Sigmoid => gamma * a * (1.0 - a),
            BipolarSigmoid => gamma * 0.5 * (1.0 + a) * (1.0 - a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_round_trip() {
        for i in 0..ActFn::COUNT {
            assert_eq!(ActFn::from_index(i).map(ActFn::index), Some(i));
        }
        assert_eq!(ActFn::from_index(3), None);
        assert_eq!(ActFn::from_index(-1), None);
    }

    #[test]
    fn sigmoids_are_centered() {
        assert_eq!(Sigmoid.f(0.0, 2.0), 0.5);
        assert_eq!(BipolarSigmoid.f(0.0, 2.0), 0.0);
        assert!((Sigmoid.df(0.5, 2.0) - 0.5).abs() < 1e-12);
    }
}
