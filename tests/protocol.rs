mod common;

use std::{env, fs, process};

use ml_adapter::{
    AdapterError, FileStore, ModelKind, Session,
    protocol::{Atom, Dispatcher, Message, Output},
};

use common::{MemoryStore, real_session, seeded_config};

fn dispatcher(kind: ModelKind) -> Dispatcher {
    Dispatcher::new(real_session(kind, MemoryStore::default()))
}

fn send(dispatcher: &mut Dispatcher, line: &str) -> ml_adapter::Result<Vec<Output>> {
    let msg = Message::parse(line).unwrap();
    dispatcher.dispatch(&msg)
}

fn tagged(tag: &str, values: &[f64]) -> Output {
    Output::tagged(tag, values.iter().copied().map(Atom::Float).collect())
}

fn add_two_classes(dispatcher: &mut Dispatcher) {
    for i in 0..6 {
        let jitter = i as f64 * 0.01;
        send(dispatcher, &format!("add 1 {} 0.2", 0.1 + jitter)).unwrap();
        send(dispatcher, &format!("add 2 {} 0.8", 0.9 - jitter)).unwrap();
    }
}

#[test]
fn classification_messages_end_to_end() {
    let mut mlp = dispatcher(ModelKind::Mlp);

    send(&mut mlp, "mode 1").unwrap();
    assert_eq!(send(&mut mlp, "getmode").unwrap(), vec![tagged("mode", &[1.0])]);

    add_two_classes(&mut mlp);
    assert_eq!(send(&mut mlp, "train").unwrap(), vec![tagged("train", &[2.0])]);

    let outputs = send(&mut mlp, "classify 0.12 0.2").unwrap();
    assert_eq!(outputs.len(), 2);
    let Output::Tagged { tag, atoms } = &outputs[0] else {
        panic!("estimates come first");
    };
    assert_eq!(tag, "estimates");
    assert_eq!(atoms.len(), 4);
    assert_eq!(atoms[0], Atom::Float(1.0));
    assert_eq!(atoms[2], Atom::Float(2.0));
    assert!(matches!(outputs[1], Output::Label(1 | 2)));
    assert_eq!(outputs[1].outlet(), Some(0));

    send(&mut mlp, "probs 0").unwrap();
    assert_eq!(send(&mut mlp, "getprobs").unwrap(), vec![tagged("probs", &[0.0])]);
    let outputs = send(&mut mlp, "map 0.12 0.2").unwrap();
    assert_eq!(outputs.len(), 1);
    assert!(matches!(outputs[0], Output::Label(_)));
}

#[test]
fn regression_messages_end_to_end() {
    let mut mlp = dispatcher(ModelKind::Mlp);

    assert!(send(&mut mlp, "add 0").is_err());
    for i in 0..8 {
        let x = i as f64 / 8.0;
        send(&mut mlp, &format!("add {} {x} {}", x * 0.5, 1.0 - x)).unwrap();
    }

    assert_eq!(send(&mut mlp, "train").unwrap(), vec![tagged("train", &[0.0])]);

    let outputs = send(&mut mlp, "map 0.5 0.5").unwrap();
    let [Output::Vector(values)] = outputs.as_slice() else {
        panic!("regression yields a single vector");
    };
    assert_eq!(values.len(), 1);
}

#[test]
fn clear_reports_and_forgets() {
    let mut mlp = dispatcher(ModelKind::Mlp);
    send(&mut mlp, "add 0 1 2").unwrap();

    assert_eq!(send(&mut mlp, "clear").unwrap(), vec![tagged("cleared", &[1.0])]);
    assert!(matches!(
        send(&mut mlp, "train"),
        Err(AdapterError::NoTrainingData)
    ));
}

#[test]
fn unknown_selectors_are_rejected() {
    let mut gmm = dispatcher(ModelKind::Gmm);

    assert!(matches!(
        send(&mut gmm, "jump 3"),
        Err(AdapterError::UnknownMethod(name)) if name == "jump"
    ));
    assert!(matches!(
        send(&mut gmm, "getjump"),
        Err(AdapterError::UnknownAttribute(name)) if name == "jump"
    ));
    // A real attribute of another model family.
    assert!(matches!(
        send(&mut gmm, "momentum 0.1"),
        Err(AdapterError::UnknownAttribute(name)) if name == "momentum"
    ));
}

#[test]
fn attribute_values_are_validated() {
    let mut mlp = dispatcher(ModelKind::Mlp);

    assert!(matches!(
        send(&mut mlp, "mode 2"),
        Err(AdapterError::InvalidMode(2))
    ));
    assert!(matches!(
        send(&mut mlp, "num_inputs -1"),
        Err(AdapterError::InvalidDimension { got: -1, .. })
    ));
    assert!(matches!(
        send(&mut mlp, "num_inputs"),
        Err(AdapterError::InvalidArgument { .. })
    ));
    assert!(matches!(
        send(&mut mlp, "num_inputs two"),
        Err(AdapterError::InvalidArgument { .. })
    ));
    assert!(matches!(
        send(&mut mlp, "momentum 1.5"),
        Err(AdapterError::InvalidParameter { name: "momentum", .. })
    ));
    assert!(matches!(
        send(&mut mlp, "multi_threaded_training 1"),
        Err(AdapterError::NotImplemented(_))
    ));

    send(&mut mlp, "mode 1").unwrap();
    assert!(matches!(
        send(&mut mlp, "num_outputs 2"),
        Err(AdapterError::ModeConflict(_))
    ));
    assert_eq!(send(&mut mlp, "getnum_outputs").unwrap(), vec![tagged("num_outputs", &[1.0])]);
}

#[test]
fn dimensions_round_trip() {
    let mut mlp = dispatcher(ModelKind::Mlp);

    send(&mut mlp, "num_inputs 5").unwrap();
    send(&mut mlp, "num_outputs 3").unwrap();
    send(&mut mlp, "num_hidden 7").unwrap();

    assert_eq!(send(&mut mlp, "getnum_inputs").unwrap(), vec![tagged("num_inputs", &[5.0])]);
    assert_eq!(send(&mut mlp, "getnum_outputs").unwrap(), vec![tagged("num_outputs", &[3.0])]);
    assert_eq!(send(&mut mlp, "getnum_hidden").unwrap(), vec![tagged("num_hidden", &[7.0])]);
    assert_eq!(mlp.session().contract().combined(), 8);
}

#[test]
fn activation_functions_are_addressed_by_index() {
    let mut mlp = dispatcher(ModelKind::Mlp);

    send(&mut mlp, "hidden_activation_function 2").unwrap();
    assert_eq!(
        send(&mut mlp, "gethidden_activation_function").unwrap(),
        vec![tagged("hidden_activation_function", &[2.0])]
    );
    assert_eq!(
        send(&mut mlp, "getinput_activation_function").unwrap(),
        vec![tagged("input_activation_function", &[0.0])]
    );
    assert!(matches!(
        send(&mut mlp, "output_activation_function 3"),
        Err(AdapterError::InvalidParameter { .. })
    ));
}

#[test]
fn model_parameters_round_trip() {
    let mut mlp = dispatcher(ModelKind::Mlp);
    send(&mut mlp, "training_rate 0.25").unwrap();
    send(&mut mlp, "max_epochs 42").unwrap();
    send(&mut mlp, "scaling 0").unwrap();

    assert_eq!(send(&mut mlp, "gettraining_rate").unwrap(), vec![tagged("training_rate", &[0.25])]);
    assert_eq!(send(&mut mlp, "getmax_epochs").unwrap(), vec![tagged("max_epochs", &[42.0])]);
    assert_eq!(
        send(&mut mlp, "getenable_scaling").unwrap(),
        vec![tagged("enable_scaling", &[0.0])]
    );

    let mut min_dist = dispatcher(ModelKind::MinDist);
    assert_eq!(
        send(&mut min_dist, "getnum_clusters").unwrap(),
        vec![tagged("num_clusters", &[10.0])]
    );
    send(&mut min_dist, "num_clusters 3").unwrap();
    assert_eq!(
        send(&mut min_dist, "getnum_clusters").unwrap(),
        vec![tagged("num_clusters", &[3.0])]
    );
}

#[test]
fn non_numeric_samples_are_rejected() {
    let mut mlp = dispatcher(ModelKind::Mlp);

    assert!(matches!(
        send(&mut mlp, "add 1 foo"),
        Err(AdapterError::InvalidArgument { selector, .. }) if selector == "add"
    ));
    assert_eq!(mlp.session().num_samples(), 0);
}

#[test]
fn non_finite_numbers_are_rejected() {
    let mut gmm = dispatcher(ModelKind::Gmm);

    for line in ["add 1 nan 0.2", "add 1 inf 0.2", "add -inf 0.1 0.2"] {
        assert!(matches!(
            send(&mut gmm, line),
            Err(AdapterError::InvalidArgument { selector, .. }) if selector == "add"
        ));
    }
    assert_eq!(gmm.session().num_samples(), 0);

    add_two_classes(&mut gmm);
    send(&mut gmm, "train").unwrap();
    assert!(matches!(
        send(&mut gmm, "classify NaN 0.2"),
        Err(AdapterError::InvalidArgument { selector, .. }) if selector == "classify"
    ));
}

#[test]
fn help_posts_the_usage() {
    let families = [
        (ModelKind::Mlp, "momentum:"),
        (ModelKind::Gmm, "num_mixture_models:"),
        (ModelKind::MinDist, "num_clusters:"),
    ];

    for (kind, attribute) in families {
        let mut d = dispatcher(kind);
        let outputs = send(&mut d, "help").unwrap();

        assert!(!outputs.is_empty());
        assert!(outputs.iter().all(|o| matches!(o, Output::Post(_)) && o.outlet().is_none()));
        assert!(outputs.iter().any(|o| o.to_string().starts_with(attribute)));
    }
}

#[test]
fn save_needs_a_path() {
    let mut mlp = dispatcher(ModelKind::Mlp);
    send(&mut mlp, "add 0 1 2").unwrap();

    assert!(matches!(send(&mut mlp, "save"), Err(AdapterError::EmptyPath)));
    assert!(matches!(send(&mut mlp, "load"), Err(AdapterError::EmptyPath)));
}

#[test]
fn save_and_load_through_files() {
    let dir = env::temp_dir().join(format!("ml-adapter-protocol-{}", process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("classes.json");

    let config = seeded_config(ModelKind::MinDist);
    let new_session = || {
        let model = ModelKind::MinDist.build(config.seed).unwrap();
        Dispatcher::new(Session::new(&config, model, Box::new(FileStore)).unwrap())
    };

    let mut writer = new_session();
    add_two_classes(&mut writer);
    send(&mut writer, &format!("save {}", path.display())).unwrap();

    let mut reader = new_session();
    send(&mut reader, &format!("load {}", path.display())).unwrap();
    assert_eq!(
        reader.session().classification_data(),
        writer.session().classification_data()
    );

    assert_eq!(send(&mut reader, "train").unwrap(), vec![tagged("train", &[2.0])]);
    let outputs = send(&mut reader, "classify 0.9 0.8").unwrap();
    assert_eq!(outputs.last(), Some(&Output::Label(2)));

    assert!(matches!(
        send(&mut reader, &format!("load {}", dir.join("missing.json").display())),
        Err(AdapterError::PersistenceFailed { .. })
    ));

    fs::remove_dir_all(&dir).unwrap();
}
