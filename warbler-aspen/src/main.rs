use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

// argument parser and configuation
pub mod cli;
pub mod manifest;
pub mod status;

// command implementations
pub mod build;
pub mod dump;
pub mod new;

use crate::{cli::Aspen, status::Status};

pub const MANIFEST: &str = "warbler.toml";
pub const SOURCE: &str = "src";
pub const TARGET: &str = "target";
pub const ENTRYPOINT: &str = "main.toml";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let subcommand = Aspen::from_args();

    let result = match subcommand {
        Aspen::New(package) => new::new(package.path),
        Aspen::Build(package) => build::build(package.path),
        Aspen::Check(package) => build::check(package.path),
        Aspen::Dump(args) => dump::dump(&args.bank),
    };

    if let Err(r) = result {
        Status::fatal().log(&r);
        std::process::exit(1);
    }
}
