use clap::Parser;
use finscreen::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
