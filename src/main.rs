use std::{
    env,
    io::{self, BufRead, Write},
    process,
};

use anyhow::Context;
use log::{error, info};

use ml_adapter::{
    FileStore, ModelKind, Session, SessionConfig,
    protocol::{Dispatcher, Message},
};

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <mlp|gmm|mindist> [--config <path>] [--seed <n>]");
    process::exit(1);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage(&args[0]);
    }

    let Some(kind) = ModelKind::from_name(&args[1]) else {
        eprintln!(
            "Unknown model: {}. You must use 'mlp', 'gmm' or 'mindist'.",
            args[1]
        );
        process::exit(1);
    };

    let mut config_path = None;
    let mut seed = None;
    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        match (arg.as_str(), rest.next()) {
            ("--config", Some(path)) => config_path = Some(path.clone()),
            ("--seed", Some(value)) => {
                seed = Some(value.parse::<u64>().context("--seed expects an integer")?)
            }
            _ => usage(&args[0]),
        }
    }

    let mut config = match config_path {
        Some(path) => SessionConfig::from_file(&path)
            .with_context(|| format!("failed to load the configuration at {path}"))?,
        None => SessionConfig::for_model(kind),
    };
    config.model = kind;
    if seed.is_some() {
        config.seed = seed;
    }
    config.validate()?;

    let model = kind.build(config.seed)?;
    let session = Session::new(&config, model, Box::new(FileStore))?;
    let mut dispatcher = Dispatcher::new(session);
    info!("ml.{} ready, reading messages from stdin", kind.name());

    let mut stdout = io::stdout().lock();
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let Some(msg) = Message::parse(&line) else {
            continue;
        };

        match dispatcher.dispatch(&msg) {
            Ok(outputs) => {
                for output in outputs {
                    match output.outlet() {
                        Some(outlet) => writeln!(stdout, "{outlet}: {output}")?,
                        None => writeln!(stdout, "{output}")?,
                    }
                }
            }
            Err(e) => {
                error!("{}: {e}", msg.selector);
                eprintln!("error: {e}");
            }
        }

        stdout.flush()?;
    }

    Ok(())
}
