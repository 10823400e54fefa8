pub mod attribute;
pub mod config;
pub mod error;
pub mod help;
pub mod mode;
pub mod model;
pub mod models;
pub mod protocol;
pub mod session;
pub mod store;

pub use config::SessionConfig;
pub use error::{AdapterError, Result};
pub use mode::{Contract, Mode, ModeController};
pub use model::{Inference, Model, ModelKind, Topology};
pub use session::{Prediction, Session, TrainReport};
pub use store::{DatasetStore, FileStore};
