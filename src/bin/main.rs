use std::process;

use clap::Parser;

#[macro_use]
extern crate log;

use splicegraph_rs::cli::Cli;

fn main() {
    let cli = Cli::parse();
    logger::Logger::init(cli.log_verbosity());

    match splicegraph_rs::run(&cli) {
        Ok(()) => (),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
