mod cli;
mod error;
mod fetch;
mod generate;
mod pipeline;
mod sample_doc;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::error::Error;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(clap_error) => {
            eprintln!("{clap_error}");
            std::process::exit(1);
        }
    };

    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    match &cli.command {
        Some(Command::SampleDoc(args)) => sample_doc::run(args),
        Some(Command::Fetch(args)) => fetch::run(args),
        None => generate::run(&cli),
    }
}
