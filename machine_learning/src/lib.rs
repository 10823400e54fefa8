pub mod arch;
pub mod classifiers;
pub mod dataset;
pub mod error;
pub mod optimization;
pub mod scaling;

pub use error::{MlErr, Result};
