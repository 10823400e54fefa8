use log::{debug, info};
use ndarray::{Array1, ArrayView1};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use rand_distr::{Distribution, Uniform};

use super::{
    activations::ActFn,
    layers::Dense,
    loss::{LossFn, Mse},
};
use crate::{
    MlErr, Result,
    classifiers::{ClassPrediction, ClassifierParams, argmax, mean_std, normalize},
    dataset::{ClassificationData, RegressionData},
    optimization::GradientDescentWithMomentum,
    scaling::MinMaxScaler,
};

/// The layer sizes and activation functions of a three layer perceptron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MlpTopology {
    pub num_inputs: usize,
    pub num_hidden: usize,
    pub num_outputs: usize,
    pub input_act: ActFn,
    pub hidden_act: ActFn,
    pub output_act: ActFn,
}

/// Training hyper-parameters of an `Mlp`.
#[derive(Debug, Clone, PartialEq)]
pub struct MlpParams {
    min_epochs: usize,
    max_epochs: usize,
    min_change: f64,
    training_rate: f64,
    momentum: f64,
    gamma: f64,
    rand_training_iterations: usize,
    use_validation_set: bool,
    validation_set_size: usize,
    randomize_training_order: bool,
}

impl Default for MlpParams {
    fn default() -> Self {
        Self {
            min_epochs: 10,
            max_epochs: 100,
            min_change: 1.0e-5,
            training_rate: 0.1,
            momentum: 0.5,
            gamma: 2.0,
            rand_training_iterations: 10,
            use_validation_set: true,
            validation_set_size: 20,
            randomize_training_order: false,
        }
    }
}

fn invalid(name: &'static str, hint: &'static str) -> MlErr {
    MlErr::InvalidParam { name, hint }
}

impl MlpParams {
    pub fn min_epochs(&self) -> usize {
        self.min_epochs
    }

    pub fn set_min_epochs(&mut self, min_epochs: usize) -> Result<()> {
        if min_epochs == 0 {
            return Err(invalid("min_epochs", "should be greater than 0"));
        }
        self.min_epochs = min_epochs;
        Ok(())
    }

    pub fn max_epochs(&self) -> usize {
        self.max_epochs
    }

    pub fn set_max_epochs(&mut self, max_epochs: usize) -> Result<()> {
        if max_epochs == 0 {
            return Err(invalid("max_epochs", "should be greater than 0"));
        }
        self.max_epochs = max_epochs;
        Ok(())
    }

    pub fn min_change(&self) -> f64 {
        self.min_change
    }

    pub fn set_min_change(&mut self, min_change: f64) -> Result<()> {
        if !(min_change.is_finite() && min_change >= 0.0) {
            return Err(invalid("min_change", "should be greater than 0"));
        }
        self.min_change = min_change;
        Ok(())
    }

    pub fn training_rate(&self) -> f64 {
        self.training_rate
    }

    pub fn set_training_rate(&mut self, training_rate: f64) -> Result<()> {
        if !(training_rate > 0.0 && training_rate <= 1.0) {
            return Err(invalid("training_rate", "should be between 0-1"));
        }
        self.training_rate = training_rate;
        Ok(())
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn set_momentum(&mut self, momentum: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&momentum) {
            return Err(invalid("momentum", "should be between 0-1"));
        }
        self.momentum = momentum;
        Ok(())
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(invalid("gamma", "should be greater than 0"));
        }
        self.gamma = gamma;
        Ok(())
    }

    pub fn rand_training_iterations(&self) -> usize {
        self.rand_training_iterations
    }

    pub fn set_rand_training_iterations(&mut self, iterations: usize) -> Result<()> {
        if iterations == 0 {
            return Err(invalid("rand_training_iterations", "should be greater than 0"));
        }
        self.rand_training_iterations = iterations;
        Ok(())
    }

    pub fn use_validation_set(&self) -> bool {
        self.use_validation_set
    }

    pub fn set_use_validation_set(&mut self, enabled: bool) {
        self.use_validation_set = enabled;
    }

    pub fn validation_set_size(&self) -> usize {
        self.validation_set_size
    }

    /// Sets the percentage of samples held out for validation.
    pub fn set_validation_set_size(&mut self, percent: usize) -> Result<()> {
        if percent == 0 || percent >= 100 {
            return Err(invalid("validation_set_size", "should be between 0-100"));
        }
        self.validation_set_size = percent;
        Ok(())
    }

    pub fn randomize_training_order(&self) -> bool {
        self.randomize_training_order
    }

    pub fn set_randomize_training_order(&mut self, enabled: bool) {
        self.randomize_training_order = enabled;
    }
}

/// Input activation, hidden layer and output layer.
#[derive(Debug, Clone)]
struct Network {
    input_act: ActFn,
    hidden: Dense,
    output: Dense,
    gamma: f64,
}

impl Network {
    fn new<R: Rng>(topology: &MlpTopology, params: &MlpParams, rng: &mut R) -> Result<Self> {
        let weights = Uniform::new(-0.5, 0.5).map_err(|_| MlErr::Degenerate("weight range"))?;

        let mut layer = |dim: (usize, usize), act_fn: ActFn| {
            let size = Dense::size_of(dim);
            let init: Vec<f64> = (0..size).map(|_| weights.sample(&mut *rng)).collect();
            let optimizer =
                GradientDescentWithMomentum::new(size, params.training_rate, params.momentum);
            Dense::new(dim, act_fn, init, optimizer)
        };

        let hidden = layer((topology.num_inputs, topology.num_hidden), topology.hidden_act);
        let output = layer((topology.num_hidden, topology.num_outputs), topology.output_act);

        Ok(Self {
            input_act: topology.input_act,
            hidden,
            output,
            gamma: params.gamma,
        })
    }

    fn activate_input(&self, x: &[f64]) -> Array1<f64> {
        x.iter().map(|&v| self.input_act.f(v, self.gamma)).collect()
    }

    fn predict(&self, x: &[f64]) -> Array1<f64> {
        let x = self.activate_input(x);
        let h = self.hidden.predict(x.view(), self.gamma);
        self.output.predict(h.view(), self.gamma)
    }

    /// Runs one step of backpropagation on a single sample, returning its loss.
    fn backprop<L: LossFn>(&mut self, loss_fn: &L, x: &[f64], y: ArrayView1<f64>) -> f64 {
        let x = self.activate_input(x);
        let h = self.hidden.forward(x.view(), self.gamma).to_owned();
        let y_pred = self.output.forward(h.view(), self.gamma).to_owned();

        let loss = loss_fn.loss(y_pred.view(), y);
        let d = loss_fn.loss_prime(y_pred.view(), y);
        let d = self.output.backward(d, self.gamma);
        self.hidden.backward(d, self.gamma);
        loss
    }
}

/// An already scaled training example.
struct Example {
    x: Vec<f64>,
    y: Array1<f64>,
}

/// Trains `rand_training_iterations` freshly initialized networks on `examples`
/// and keeps the one with the lowest error.
fn fit<L: LossFn, R: Rng>(
    topology: &MlpTopology,
    params: &MlpParams,
    loss_fn: &L,
    examples: &[Example],
    rng: &mut R,
) -> Result<Network> {
    let n = examples.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let held_out = if params.use_validation_set {
        n * params.validation_set_size / 100
    } else {
        0
    };
    let held_out = if held_out >= n { 0 } else { held_out };
    let (validation, training) = order.split_at(held_out);
    let mut training = training.to_vec();

    let mut best: Option<(f64, Network)> = None;
    for iteration in 0..params.rand_training_iterations {
        let mut network = Network::new(topology, params, rng)?;
        let error = run_epochs(
            &mut network,
            params,
            loss_fn,
            examples,
            &mut training,
            validation,
            rng,
        )?;

        debug!("mlp random iteration {iteration}: error {error}");
        if best.as_ref().is_none_or(|(best, _)| error < *best) {
            best = Some((error, network));
        }
    }

    best.map(|(_, network)| network)
        .ok_or(MlErr::Degenerate("no training iterations"))
}

fn run_epochs<L: LossFn, R: Rng>(
    network: &mut Network,
    params: &MlpParams,
    loss_fn: &L,
    examples: &[Example],
    training: &mut [usize],
    validation: &[usize],
    rng: &mut R,
) -> Result<f64> {
    let mut last = f64::INFINITY;

    for epoch in 0..params.max_epochs {
        if params.randomize_training_order {
            training.shuffle(rng);
        }

        let mut total = 0.0;
        for &i in training.iter() {
            let example = &examples[i];
            total += network.backprop(loss_fn, &example.x, example.y.view());
        }

        let error = if validation.is_empty() {
            total / training.len() as f64
        } else {
            validation
                .iter()
                .map(|&i| {
                    let example = &examples[i];
                    loss_fn.loss(network.predict(&example.x).view(), example.y.view())
                })
                .sum::<f64>()
                / validation.len() as f64
        };

        if !error.is_finite() {
            return Err(MlErr::Diverged { epoch });
        }

        let delta = (last - error).abs();
        last = error;
        debug!("mlp epoch {epoch}: error {error}");

        if epoch + 1 >= params.min_epochs && delta <= params.min_change {
            break;
        }
    }

    Ok(last)
}

/// What the network was last trained to do.
#[derive(Debug, Clone)]
enum Trained {
    Classification {
        labels: Vec<u32>,
        // Per class mean and deviation of the winning likelihood on its own samples.
        scores: Vec<(f64, f64)>,
    },
    Regression {
        target_scaler: Option<MinMaxScaler>,
    },
}

/// A three layer perceptron able to act either as a classifier or as a regressor.
#[derive(Debug, Clone)]
pub struct Mlp {
    params: MlpParams,
    classifier: ClassifierParams,
    rng: StdRng,
    topology: Option<MlpTopology>,
    network: Option<Network>,
    input_scaler: Option<MinMaxScaler>,
    trained: Option<Trained>,
    prediction: ClassPrediction,
    regression_data: Vec<f64>,
}

impl Mlp {
    /// Creates an uninitialized perceptron, seeding its generator when `seed` is given.
    pub fn new(params: MlpParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        Self {
            params,
            classifier: ClassifierParams::default(),
            rng,
            topology: None,
            network: None,
            input_scaler: None,
            trained: None,
            prediction: ClassPrediction::default(),
            regression_data: Vec::new(),
        }
    }

    pub fn params(&self) -> &MlpParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut MlpParams {
        &mut self.params
    }

    pub fn classifier(&self) -> &ClassifierParams {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut ClassifierParams {
        &mut self.classifier
    }

    /// Sets the topology, discarding any trained network.
    ///
    /// # Errors
    /// `MlErr::InvalidParam` if any layer would be empty.
    pub fn init(&mut self, topology: MlpTopology) -> Result<()> {
        if topology.num_inputs == 0 || topology.num_hidden == 0 || topology.num_outputs == 0 {
            return Err(invalid("topology", "every layer needs at least one neuron"));
        }

        self.clear();
        self.topology = Some(topology);
        Ok(())
    }

    /// Trains the network as a classifier with one output neuron per class.
    ///
    /// # Errors
    /// * `MlErr::NotInitialized` before `init`.
    /// * `MlErr::EmptyDataset` if `data` has no samples.
    /// * `MlErr::SizeMismatch` if `data` doesn't fit the topology.
    /// * `MlErr::Diverged` if the error stopped being finite.
    pub fn train_classification(&mut self, data: &ClassificationData) -> Result<()> {
        let topology = self.topology.ok_or(MlErr::NotInitialized)?;
        if data.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let labels = data.class_labels();
        check_size("input", data.num_dimensions(), topology.num_inputs)?;
        check_size("output", labels.len(), topology.num_outputs)?;

        self.reset_training();
        let input_scaler = self.fit_input_scaler(
            data.samples().iter().map(|s| s.features()),
            topology.num_inputs,
        );
        let (low, high) = topology.output_act.range();

        let examples: Vec<Example> = data
            .samples()
            .iter()
            .map(|s| {
                let y = labels
                    .iter()
                    .map(|&l| if l == s.label() { high } else { low })
                    .collect();
                Example {
                    x: scale(&input_scaler, s.features()),
                    y,
                }
            })
            .collect();

        info!(
            "training mlp classifier on {} samples and {} classes",
            examples.len(),
            labels.len()
        );
        let network = fit(&topology, &self.params, &Mse, &examples, &mut self.rng)?;

        let mut winners: Vec<Vec<f64>> = vec![Vec::new(); labels.len()];
        for (example, sample) in examples.iter().zip(data.samples()) {
            let likelihoods = to_likelihoods(network.predict(&example.x));
            if let Some(class) = labels.iter().position(|&l| l == sample.label()) {
                winners[class].push(likelihoods[class]);
            }
        }

        self.network = Some(network);
        self.input_scaler = input_scaler;
        self.trained = Some(Trained::Classification {
            labels,
            scores: winners.iter().map(|w| mean_std(w)).collect(),
        });
        Ok(())
    }

    /// Trains the network as a regressor.
    ///
    /// # Errors
    /// Same as `train_classification`.
    pub fn train_regression(&mut self, data: &RegressionData) -> Result<()> {
        let topology = self.topology.ok_or(MlErr::NotInitialized)?;
        if data.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        check_size("input", data.num_input_dimensions(), topology.num_inputs)?;
        check_size("output", data.num_target_dimensions(), topology.num_outputs)?;

        self.reset_training();
        let input_scaler =
            self.fit_input_scaler(data.samples().iter().map(|s| s.input()), topology.num_inputs);
        let target_scaler = self.classifier.scaling().then(|| {
            MinMaxScaler::fit(data.samples().iter().map(|s| s.target()), topology.num_outputs)
        });

        let examples: Vec<Example> = data
            .samples()
            .iter()
            .map(|s| Example {
                x: scale(&input_scaler, s.input()),
                y: scale(&target_scaler, s.target()).into(),
            })
            .collect();

        info!("training mlp regressor on {} samples", examples.len());
        let network = fit(&topology, &self.params, &Mse, &examples, &mut self.rng)?;

        self.network = Some(network);
        self.input_scaler = input_scaler;
        self.trained = Some(Trained::Regression { target_scaler });
        Ok(())
    }

    /// Runs the trained network on `x`. Results are available through
    /// `predicted_class_label`, `class_likelihoods` or `regression_data`
    /// depending on the active mode.
    ///
    /// # Errors
    /// * `MlErr::NotTrained` before a successful train.
    /// * `MlErr::SizeMismatch` if `x` doesn't have one value per input neuron.
    pub fn predict(&mut self, x: &[f64]) -> Result<()> {
        let (Some(network), Some(trained)) = (&self.network, &self.trained) else {
            return Err(MlErr::NotTrained);
        };

        check_size("input", x.len(), self.num_input_neurons())?;
        let y = network.predict(&scale(&self.input_scaler, x));

        match trained {
            Trained::Classification { labels, scores } => {
                let likelihoods = to_likelihoods(y);
                let best = argmax(&likelihoods).ok_or(MlErr::Degenerate("no output neurons"))?;

                let (mean, std) = scores[best];
                let threshold = mean - self.classifier.null_rejection_coeff() * std;
                let rejected = self.classifier.null_rejection() && likelihoods[best] < threshold;

                self.prediction = ClassPrediction {
                    label: if rejected { 0 } else { labels[best] },
                    likelihoods,
                };
            }
            Trained::Regression { target_scaler } => {
                let y = y.to_vec();
                self.regression_data = match target_scaler {
                    Some(scaler) => scaler.unscale(&y),
                    None => y,
                };
            }
        }

        Ok(())
    }

    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    pub fn classification_mode_active(&self) -> bool {
        matches!(self.trained, Some(Trained::Classification { .. }))
    }

    pub fn regression_mode_active(&self) -> bool {
        matches!(self.trained, Some(Trained::Regression { .. }))
    }

    pub fn topology(&self) -> Option<&MlpTopology> {
        self.topology.as_ref()
    }

    pub fn num_input_neurons(&self) -> usize {
        self.topology.map_or(0, |t| t.num_inputs)
    }

    pub fn num_output_neurons(&self) -> usize {
        self.topology.map_or(0, |t| t.num_outputs)
    }

    /// The amount of classes learnt, `0` unless trained as a classifier.
    pub fn num_classes(&self) -> usize {
        match &self.trained {
            Some(Trained::Classification { labels, .. }) => labels.len(),
            _ => 0,
        }
    }

    pub fn class_labels(&self) -> &[u32] {
        match &self.trained {
            Some(Trained::Classification { labels, .. }) => labels,
            _ => &[],
        }
    }

    pub fn predicted_class_label(&self) -> u32 {
        self.prediction.label
    }

    pub fn class_likelihoods(&self) -> &[f64] {
        &self.prediction.likelihoods
    }

    pub fn regression_data(&self) -> &[f64] {
        &self.regression_data
    }

    /// Forgets the topology and everything learnt, keeping the parameters.
    pub fn clear(&mut self) {
        self.topology = None;
        self.reset_training();
    }

    fn reset_training(&mut self) {
        self.network = None;
        self.input_scaler = None;
        self.trained = None;
        self.prediction = ClassPrediction::default();
        self.regression_data.clear();
    }

    fn fit_input_scaler<'a, I>(&self, rows: I, width: usize) -> Option<MinMaxScaler>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        self.classifier
            .scaling()
            .then(|| MinMaxScaler::fit(rows, width))
    }
}

fn check_size(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch { what, got, expected });
    }
    Ok(())
}

fn scale(scaler: &Option<MinMaxScaler>, x: &[f64]) -> Vec<f64> {
    match scaler {
        Some(scaler) => scaler.scale(x),
        None => x.to_vec(),
    }
}

/// Turns raw output activations into a distribution over classes.
fn to_likelihoods(y: Array1<f64>) -> Vec<f64> {
    let mut likelihoods: Vec<f64> = y.iter().map(|v| v.max(0.0)).collect();
    normalize(&mut likelihoods);
    likelihoods
}
