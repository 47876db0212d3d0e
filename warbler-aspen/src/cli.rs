use std::{env::current_dir, ffi::OsStr, path::PathBuf};

use structopt::StructOpt;

pub fn package_dir(path: &OsStr) -> PathBuf {
    if path == "." {
        current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        PathBuf::from(path)
    }
}

#[derive(StructOpt, Debug)]
pub struct Package {
    #[structopt(default_value = ".", parse(from_os_str = package_dir))]
    pub path: PathBuf,
}

#[derive(StructOpt, Debug)]
pub struct Dump {
    /// A bank written by `aspen build`
    #[structopt(parse(from_os_str))]
    pub bank: PathBuf,
}

#[derive(StructOpt, Debug)]
#[structopt(name = "Aspen", bin_name = "aspen", about)]
pub enum Aspen {
    /// Creates a new Warbler package
    New(Package),
    /// Compiles every entry file of the package into a bank
    Build(Package),
    /// Compiles the package without writing the bank
    Check(Package),
    /// Prints the instructions of a compiled bank
    Dump(Dump),
}
