#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

use machine_learning::{
    self as ml, MlErr,
    dataset::{ClassificationData, DatasetRef, RegressionData},
};
use ml_adapter::{
    AdapterError, DatasetStore, Inference, Mode, Model, ModelKind, Session, SessionConfig,
    Topology,
    attribute::{Attribute, Value},
};

/// What a `ScriptedModel` was asked to do.
#[derive(Debug, Default)]
pub struct Calls {
    pub topologies: Vec<Topology>,
    pub fits: usize,
    pub inputs: Vec<Vec<f64>>,
}

/// A model whose training outcome and inference are decided by the test.
pub struct ScriptedModel {
    calls: Rc<RefCell<Calls>>,
    trains_for: Option<Mode>,
    fail_fit: bool,
    inference: Inference,
    topology: Option<Topology>,
    trained: bool,
    num_classes: usize,
}

impl ScriptedModel {
    pub fn new(trains_for: Option<Mode>, inference: Inference) -> (Self, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let model = Self {
            calls: Rc::clone(&calls),
            trains_for,
            fail_fit: false,
            inference,
            topology: None,
            trained: false,
            num_classes: 0,
        };

        (model, calls)
    }

    pub fn failing() -> Self {
        let (mut model, _) = Self::new(None, Inference::Regression(Vec::new()));
        model.fail_fit = true;
        model
    }
}

impl Model for ScriptedModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Mlp
    }

    fn initialize(&mut self, topology: &Topology) -> ml::Result<()> {
        self.calls.borrow_mut().topologies.push(*topology);
        self.topology = Some(*topology);
        self.trained = false;
        Ok(())
    }

    fn fit(&mut self, dataset: DatasetRef<'_>) -> ml::Result<()> {
        if self.fail_fit {
            return Err(MlErr::Diverged { epoch: 0 });
        }

        self.calls.borrow_mut().fits += 1;
        self.num_classes = match dataset {
            DatasetRef::Classification(data) => data.num_classes(),
            DatasetRef::Regression(_) => 0,
        };
        self.trained = true;
        Ok(())
    }

    fn infer(&mut self, input: &[f64]) -> ml::Result<Inference> {
        self.calls.borrow_mut().inputs.push(input.to_vec());
        Ok(self.inference.clone())
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn active_mode(&self) -> Option<Mode> {
        if self.trained { self.trains_for } else { None }
    }

    fn num_inputs(&self) -> usize {
        self.topology.map_or(0, |t| t.num_inputs)
    }

    fn num_outputs(&self) -> usize {
        self.topology.map_or(0, |t| t.num_outputs)
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn clear(&mut self) {
        self.topology = None;
        self.trained = false;
    }

    fn set_param(&mut self, attr: Attribute, _value: Value) -> ml_adapter::Result<()> {
        Err(AdapterError::UnknownAttribute(attr.name().to_string()))
    }

    fn param(&self, attr: Attribute) -> ml_adapter::Result<Value> {
        Err(AdapterError::UnknownAttribute(attr.name().to_string()))
    }
}

#[derive(Debug, Clone)]
enum Stored {
    Classification(ClassificationData),
    Regression(RegressionData),
}

/// Keeps "files" in memory, shared between the clones of a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: Rc<RefCell<HashMap<PathBuf, Stored>>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    fn get(&self, path: &Path) -> ml::Result<Stored> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| MlErr::Io(io::Error::from(io::ErrorKind::NotFound)))
    }
}

impl DatasetStore for MemoryStore {
    fn save(&mut self, path: &Path, dataset: DatasetRef<'_>) -> ml::Result<()> {
        let stored = match dataset {
            DatasetRef::Classification(data) => Stored::Classification(data.clone()),
            DatasetRef::Regression(data) => Stored::Regression(data.clone()),
        };

        self.files.borrow_mut().insert(path.to_path_buf(), stored);
        Ok(())
    }

    fn load_classification(&mut self, path: &Path) -> ml::Result<ClassificationData> {
        match self.get(path)? {
            Stored::Classification(data) => Ok(data),
            Stored::Regression(_) => Err(MlErr::KindMismatch {
                expected: "classification",
                got: "regression",
            }),
        }
    }

    fn load_regression(&mut self, path: &Path) -> ml::Result<RegressionData> {
        match self.get(path)? {
            Stored::Regression(data) => Ok(data),
            Stored::Classification(_) => Err(MlErr::KindMismatch {
                expected: "regression",
                got: "classification",
            }),
        }
    }
}

/// A default configuration with a fixed seed.
pub fn seeded_config(model: ModelKind) -> SessionConfig {
    SessionConfig {
        seed: Some(11),
        ..SessionConfig::for_model(model)
    }
}

/// A session backed by a real model of family `kind` and a memory store.
pub fn real_session(kind: ModelKind, store: MemoryStore) -> Session {
    let config = seeded_config(kind);
    let model = kind.build(config.seed).unwrap();
    Session::new(&config, model, Box::new(store)).unwrap()
}

/// A session backed by `model` and a memory store.
pub fn scripted_session(model: ScriptedModel) -> Session {
    Session::new(
        &SessionConfig::default(),
        Box::new(model),
        Box::new(MemoryStore::default()),
    )
    .unwrap()
}
