use clap::Parser;
use relame::cli::{Cli, run_cli};
use relame::output::Output;
use std::process;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run_cli(cli) {
        Output::fatal(&e.to_string());
        process::exit(1);
    }
}
