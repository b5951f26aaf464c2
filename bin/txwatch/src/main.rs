//! txwatch command line.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cli;
mod commands;
mod runner;

fn main() {
    if let Err(err) = cli::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
