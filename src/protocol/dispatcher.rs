use log::debug;

use super::{Atom, Message, Output};
use crate::{
    attribute::{Attribute, Value},
    error::{AdapterError, Result},
    help,
    mode::Mode,
    session::{Layer, Prediction, Session},
};

/// Maps host messages onto a `Session` and its results onto `Output`s.
///
/// Besides the methods, every attribute `<name>` of the session's model family
/// can be set with `<name> <value>` and queried with `get<name>`.
pub struct Dispatcher {
    session: Session,
}

impl Dispatcher {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Handles a single message.
    ///
    /// # Returns
    /// The outputs to emit, in emission order.
    pub fn dispatch(&mut self, msg: &Message) -> Result<Vec<Output>> {
        debug!("dispatching '{}' with {} argument(s)", msg.selector, msg.args.len());

        match msg.selector.as_str() {
            "add" => {
                let values = numbers(msg)?;
                self.session.add(&values)?;
                Ok(Vec::new())
            }
            "train" => {
                let report = self.session.train()?;
                Ok(vec![Output::tagged(
                    "train",
                    vec![Atom::Float(report.num_classes as f64)],
                )])
            }
            "classify" | "map" => {
                let values = numbers(msg)?;
                let prediction = self.session.classify(&values)?;
                Ok(self.prediction_outputs(prediction))
            }
            "clear" => {
                self.session.clear();
                Ok(vec![Output::tagged("cleared", vec![Atom::Float(1.0)])])
            }
            "save" => {
                self.session.save(&path(msg))?;
                Ok(Vec::new())
            }
            "load" => {
                self.session.load(&path(msg))?;
                Ok(Vec::new())
            }
            "help" | "usage" => Ok(help::usage(self.session.model().kind())
                .into_iter()
                .map(Output::Post)
                .collect()),
            selector => self.dispatch_attribute(selector, &msg.args),
        }
    }

    fn dispatch_attribute(&mut self, selector: &str, args: &[Atom]) -> Result<Vec<Output>> {
        if let Some(name) = selector.strip_prefix("get") {
            let attr = self.attribute(name)?;
            let value = self.get(attr)?;
            return Ok(vec![Output::tagged(attr.name(), vec![Atom::Float(value.as_f64())])]);
        }

        let Some(attr) = Attribute::from_name(selector) else {
            return Err(AdapterError::UnknownMethod(selector.to_string()));
        };
        let attr = self.attribute(attr.name())?;

        let number = match args {
            [Atom::Float(number)] => *number,
            [] => {
                return Err(AdapterError::InvalidArgument {
                    selector: selector.to_string(),
                    reason: "expected a value",
                });
            }
            _ => {
                return Err(AdapterError::InvalidArgument {
                    selector: selector.to_string(),
                    reason: "expected a single number",
                });
            }
        };

        self.set(attr, Value::from_number(attr.kind(), number))?;
        Ok(Vec::new())
    }

    /// Resolves `name` to an attribute the session's model family answers to.
    fn attribute(&self, name: &str) -> Result<Attribute> {
        Attribute::from_name(name)
            .filter(|attr| self.session.model().kind().attributes().contains(attr))
            .ok_or_else(|| AdapterError::UnknownAttribute(name.to_string()))
    }

    fn set(&mut self, attr: Attribute, value: Value) -> Result<()> {
        let session = &mut self.session;

        match attr {
            Attribute::Mode => session.set_mode(Mode::try_from(value.as_i64())?),
            Attribute::NumInputs => session.set_num_inputs(dimension("inputs", value)?),
            Attribute::NumOutputs => session.set_num_outputs(dimension("outputs", value)?),
            Attribute::NumHidden => session.set_num_hidden(dimension("hidden neurons", value)?),
            Attribute::InputActivationFunction => {
                session.set_activation(Layer::Input, value.as_i64())
            }
            Attribute::HiddenActivationFunction => {
                session.set_activation(Layer::Hidden, value.as_i64())
            }
            Attribute::OutputActivationFunction => {
                session.set_activation(Layer::Output, value.as_i64())
            }
            Attribute::Probs => {
                session.set_probs(value.as_bool());
                Ok(())
            }
            _ => session.model_mut().set_param(attr, value),
        }
    }

    fn get(&self, attr: Attribute) -> Result<Value> {
        let session = &self.session;

        let value = match attr {
            Attribute::Mode => Value::Int(session.mode().index()),
            Attribute::NumInputs => Value::Int(session.num_inputs() as i64),
            Attribute::NumOutputs => Value::Int(session.num_outputs() as i64),
            Attribute::NumHidden => Value::Int(session.num_hidden() as i64),
            Attribute::InputActivationFunction => {
                Value::Int(session.activation(Layer::Input).index())
            }
            Attribute::HiddenActivationFunction => {
                Value::Int(session.activation(Layer::Hidden).index())
            }
            Attribute::OutputActivationFunction => {
                Value::Int(session.activation(Layer::Output).index())
            }
            Attribute::Probs => Value::Bool(session.probs()),
            _ => return session.model().param(attr),
        };

        Ok(value)
    }

    fn prediction_outputs(&self, prediction: Prediction) -> Vec<Output> {
        match prediction {
            Prediction::Class { label, estimates } => {
                let mut outputs = Vec::with_capacity(2);
                if self.session.probs() {
                    let atoms = estimates
                        .into_iter()
                        .flat_map(|(label, likelihood)| {
                            [Atom::Float(label as f64), Atom::Float(likelihood)]
                        })
                        .collect();
                    outputs.push(Output::tagged("estimates", atoms));
                }
                outputs.push(Output::Label(label));
                outputs
            }
            Prediction::Regression(values) => vec![Output::Vector(values)],
        }
    }
}

/// The arguments as finite numbers.
fn numbers(msg: &Message) -> Result<Vec<f64>> {
    msg.args
        .iter()
        .map(|atom| {
            let invalid = |reason| AdapterError::InvalidArgument {
                selector: msg.selector.clone(),
                reason,
            };

            match atom.as_f64() {
                Some(value) if value.is_finite() => Ok(value),
                Some(_) => Err(invalid("expected only finite numbers")),
                None => Err(invalid("expected only numbers")),
            }
        })
        .collect()
}

/// The first argument as a path, empty when missing.
fn path(msg: &Message) -> String {
    msg.args.first().map(Atom::to_string).unwrap_or_default()
}

fn dimension(what: &'static str, value: Value) -> Result<usize> {
    let got = value.as_i64();
    usize::try_from(got).map_err(|_| AdapterError::InvalidDimension { what, got })
}
