//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use chargewise_cli::CliError;
use log::error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
    match chargewise_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            error!("chargewise: {err}");
            std::process::exit(1);
        }
    }
}
