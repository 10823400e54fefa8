use crate::{config::SessionConfig, mode::Mode, model::ModelKind};

const SEPARATOR: &str = "--------------------------------------------------------------------------------";

/// The usage statement posted by `help`, one line per entry.
pub fn usage(kind: ModelKind) -> Vec<String> {
    match kind {
        ModelKind::Mlp => mlp_usage(),
        ModelKind::Gmm => classifier_usage(
            "num_mixture_models:\tinteger (n > 0) sets the number of mixture models used for class (default 2)",
        ),
        ModelKind::MinDist => classifier_usage(
            "num_clusters:\tinteger (n > 0) sets how many clusters each model will try to find during the training phase (default 10)",
        ),
    }
}

fn mlp_usage() -> Vec<String> {
    let defaults = SessionConfig::default();
    let activation = |layer: &str| {
        format!(
            "{layer}_activation_function:\tinteger determining the activation function for the {layer} layer, 0:LINEAR, 1:SIGMOID, 2:BIPOLAR_SIGMOID (default LINEAR)"
        )
    };

    let mut lines = vec![
        SEPARATOR.to_string(),
        "Attributes:".to_string(),
        SEPARATOR.to_string(),
        format!(
            "mode:\tinteger setting mode of the MLP, {} for regression and {} for classification (default {})",
            Mode::Regression.index(),
            Mode::Classification.index(),
            defaults.initial_mode().index()
        ),
        format!(
            "num_inputs:\tinteger setting number of neurons in the input layer of the MLP (default {})",
            defaults.num_inputs
        ),
        format!(
            "num_outputs:\tinteger setting number of neurons in the output layer of the MLP (default {})",
            defaults.num_outputs
        ),
        format!(
            "num_hidden:\tinteger setting number of neurons in the hidden layer of the MLP (default {})",
            defaults.num_hidden
        ),
    ];
    lines.extend(owned(&[
        "min_epochs:\tinteger setting the minimum number of training iterations (default 10)",
        "max_epochs:\tinteger setting the maximum number of training iterations (default 100)",
        "min_change:\tfloating point value setting the minimum change that must be achieved between two training epochs for the training to continue (default 1.0e-5)",
        "training_rate:\tfloating point value used to update the weights at each step of the stochastic gradient descent (default 0.1)",
        "momentum:\tfloating point value setting the momentum of the MLP (default 0.5)",
        "gamma:\tfloating point value setting the gamma of the MLP (default 2.0)",
        "null_rejection:\tinteger (0 or 1) toggling NULL rejection off or on, when 'on' classification results below the NULL-rejection threshold will be discarded (default 1)",
        "null_rejection_coeff:\tfloating point value setting a multiplier for the NULL-rejection threshold (default 0.9)",
    ]));
    lines.extend(["input", "hidden", "output"].map(activation));
    lines.extend(owned(&[
        "rand_training_iterations:\tinteger setting the number of random training iterations (default 10)",
        "use_validation_set:\tinteger (0 or 1) determining whether or not to use a validation training set (default 1)",
        "validation_set_size:\tinteger integer determining the size of the validation set (default 20)",
        "randomize_training_order:\tinteger (0 or 1) determining whether or not to randomize the training order (default 0)",
        "enable_scaling:\tinteger (0 or 1) determining whether or not values are automatically scaled (default 1)",
        SEPARATOR,
        "Methods:",
        SEPARATOR,
        "add:\tlist comprising a class id followed by n features; <class> <feature 1> <feature 2> etc when in classification mode or N output values followed by M input values when in regression mode, where N is determined by the num_outputs attribute",
        "save:\tsave training examples, first argument gives path to save location",
        "load:\tload training examples, first argument gives path to the load location",
        "train:\ttrain the MLP based on vectors added with 'add'",
        "clear:\tclear the stored training data and model",
        "classify:\tgive the class of the input feature vector provided as a list in classification mode or the regression outputs in regression mode",
        "help:\tpost this usage statement to the console",
        SEPARATOR,
    ]));

    lines
}

fn owned<'a>(text: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
    text.iter().map(|line| line.to_string())
}

fn classifier_usage(model_attribute: &str) -> Vec<String> {
    [
        SEPARATOR,
        "Attributes:",
        SEPARATOR,
        "scaling:\tinteger (0 or 1) sets whether values are automatically scaled (default 1)",
        "probs:\tinteger (0 or 1) determing whether probabilities are sent from the right outlet",
        "null_rejection:\tinteger (0 or 1) toggling NULL rejection off or on, when 'on' classification results below the NULL-rejection threshold will be discarded (default 1)",
        "null_rejection_coeff:\tfloating point value setting a multiplier for the NULL-rejection threshold (default 0.9)",
        model_attribute,
        SEPARATOR,
        "Methods:",
        SEPARATOR,
        "add:\tlist comprising a class id followed by n features; <class> <feature 1> <feature 2> etc",
        "save:\tsave training examples, first argument gives path to save location",
        "load:\tload training examples, first argument gives path to the load location",
        "train:\ttrain the MLP based on vectors added with 'add'",
        "clear:\tclear the stored training data and data_typel",
        "map:\tgive the regression value for the input feature vector",
        "help:\tpost this usage statement to the console",
        SEPARATOR,
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
