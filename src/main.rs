mod app;
mod cli;
mod components;
mod config;
mod error;
mod imaging;
mod message;
mod model;
mod navigator;
mod views;

use std::process::ExitCode;

fn main() -> ExitCode {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    let args = match cli::parse(pico_args::Arguments::from_env()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n\n{}", cli::USAGE);
            return ExitCode::FAILURE;
        }
    };
    if args.help {
        print!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    let loaded = match &args.config {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    };
    let config = loaded.unwrap_or_else(|err| {
        log::error!("Ignoring settings: {err}");
        config::Config::default()
    });

    let source = args.source.or_else(|| config.source.clone());
    match app::run(config, source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
