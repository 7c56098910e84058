//! `inkboard` command-line entry point.

use clap::Parser;
use inkboard_app::{Cli, run};

fn main() {
    env_logger::init();
    log::info!("Starting inkboard");

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
